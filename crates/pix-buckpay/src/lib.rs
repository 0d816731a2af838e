//! # pix-buckpay
//!
//! BuckPay gateway client for pix-checkout.
//!
//! `BuckpayGateway` implements `pix_core::PixGateway` over two endpoints:
//!
//! | Method | Path | Use |
//! |--------|------|-----|
//! | POST | `/v1/transactions` | Create a PIX charge |
//! | GET | `/v1/transactions/external_id/{id}` | Look up a charge |
//!
//! Every call carries `Authorization: Bearer <BUCKPAY_API_KEY>`,
//! `Content-Type: application/json` and the `User-Agent: Buckpay API` client
//! identifier.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pix_buckpay::{BuckpayConfig, BuckpayGateway};
//! use pix_core::{ChargeRequest, PixGateway};
//!
//! let gateway = BuckpayGateway::new(BuckpayConfig::from_env()?)?;
//! let charge = gateway.create_charge(&request.to_body()).await?;
//!
//! match gateway.charge_status(&request.external_id).await {
//!     Ok(result) if result.is_settled() => println!("paid"),
//!     Err(e) if e.is_not_found() => println!("not visible upstream yet"),
//!     _ => {}
//! }
//! ```

pub mod client;
pub mod config;

// Re-exports
pub use client::BuckpayGateway;
pub use config::{BuckpayConfig, CLIENT_USER_AGENT, DEFAULT_API_BASE_URL};

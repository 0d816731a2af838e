//! # pix-core
//!
//! Core types and traits for the pix-checkout payment flow.
//!
//! This crate provides:
//! - `PixGateway` trait for the upstream payment provider
//! - `ChargeRequest`, `ChargeResult` and `ChargeStatus` for the charge lifecycle
//! - `CheckoutPlan` and `PlanCatalog` for the per-page amount/buyer presets
//! - `GatewayError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use pix_core::{ChargeRequest, PlanCatalog, PixGateway};
//!
//! let catalog = PlanCatalog::builtin();
//! let plan = catalog.get("plano2").unwrap();
//!
//! // Build a charge for the plan with a fresh external id
//! let request = ChargeRequest::for_plan(plan, pix_core::new_external_id());
//!
//! // Create the charge through a gateway
//! let charge = gateway.create_charge(&request.to_body()).await?;
//!
//! // Show charge.pix to the buyer, then poll gateway.charge_status(&request.external_id)
//! ```

pub mod charge;
pub mod error;
pub mod gateway;
pub mod plan;

// Re-exports for convenience
pub use charge::{
    new_external_id, Buyer, ChargeRequest, ChargeResult, ChargeStatus, PaymentMethod,
    PixPayment, QrImage,
};
pub use error::{GatewayError, GatewayResult};
pub use gateway::{BoxedGateway, PixGateway};
pub use plan::{format_brl, CheckoutPlan, PlanCatalog};

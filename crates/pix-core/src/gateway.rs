//! # PIX Gateway Trait
//!
//! Seam between the proxies and the upstream payment provider.
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │            PixGateway (trait)            │
//! │  ├── create_charge()                     │
//! │  ├── charge_status()                     │
//! │  └── provider_name()                     │
//! └──────────────────────────────────────────┘
//!                     ▲
//!             ┌───────┴────────┐
//!             │ BuckpayGateway │
//!             └────────────────┘
//! ```
//!
//! Implementations make a single attempt per call. Retrying is the caller's
//! business, and the only retry in this system is the session's fixed-interval
//! re-poll.

use crate::charge::ChargeResult;
use crate::error::GatewayResult;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Authenticated access to the upstream payment provider.
#[async_trait]
pub trait PixGateway: Send + Sync {
    /// Create a PIX charge.
    ///
    /// `payload` is forwarded as-is; fields the gateway knows about but
    /// `ChargeRequest` does not (buyer phone, product data) survive.
    ///
    /// # Errors
    /// `Auth` on HTTP 403, `Upstream` on any other non-2xx, `Transport` on
    /// network failure.
    async fn create_charge(&self, payload: &Value) -> GatewayResult<ChargeResult>;

    /// Look up a charge by the caller's external id.
    ///
    /// Same taxonomy as `create_charge`, plus `NotFound` on HTTP 404, which
    /// callers must read as "not created upstream yet".
    async fn charge_status(&self, external_id: &str) -> GatewayResult<ChargeResult>;

    /// Provider name (for logging)
    fn provider_name(&self) -> &'static str;
}

/// Type alias for a shared gateway (dynamic dispatch)
pub type BoxedGateway = Arc<dyn PixGateway>;

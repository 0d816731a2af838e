//! # pix-session
//!
//! Client-side payment session for pix-checkout.
//!
//! A `SessionController` creates a charge through the create-charge proxy,
//! exposes the PIX code and QR image, polls the status proxy every five
//! seconds and stops once the payment is confirmed.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pix_session::{HttpCheckoutApi, SessionConfig, SessionController, SessionState};
//! use std::sync::Arc;
//!
//! let api = Arc::new(HttpCheckoutApi::new("http://127.0.0.1:8080")?);
//! let mut session = SessionController::new(api, SessionConfig::new(plan));
//! let mut updates = session.subscribe();
//!
//! session.start().await;
//!
//! while updates.changed().await.is_ok() {
//!     if let SessionState::Paid { .. } = updates.borrow_and_update().state {
//!         break;
//!     }
//! }
//! session.stop();
//! ```

pub mod api;
pub mod controller;
pub mod error;

pub use api::{CheckoutApi, HttpCheckoutApi};
pub use controller::{
    PollState, SessionConfig, SessionController, SessionState, SessionView,
    DEFAULT_COPIED_RESET, DEFAULT_POLL_INTERVAL, MIN_POLL_INTERVAL,
};
pub use error::{SessionError, SessionResult};

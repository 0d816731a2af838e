//! # pix-api
//!
//! HTTP proxy layer for pix-checkout.
//!
//! The browser never sees the gateway credential: it talks to these two
//! proxies, which attach `BUCKPAY_API_KEY` and forward to BuckPay.
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | POST | `/api/create-pix` | Create-charge proxy |
//! | GET | `/api/check-payment?external_id=` | Status proxy |
//! | GET | `/api/plans` | List checkout plans |
//! | GET | `/api/plans/{id}` | Get checkout plan |

pub mod handlers;
pub mod routes;
pub mod state;

pub use handlers::ErrorEnvelope;
pub use routes::create_router;
pub use state::{AppConfig, AppState};

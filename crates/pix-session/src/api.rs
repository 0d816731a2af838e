//! # Checkout API Client
//!
//! The session controller reaches the gateway only through the two proxies.
//! `CheckoutApi` is the seam; `HttpCheckoutApi` is the reqwest implementation.

use crate::error::{SessionError, SessionResult};
use async_trait::async_trait;
use pix_core::{ChargeRequest, ChargeResult};
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument};

/// Calls the session makes against the proxies
#[async_trait]
pub trait CheckoutApi: Send + Sync {
    /// `POST /api/create-pix`
    async fn create_pix(&self, request: &ChargeRequest) -> SessionResult<ChargeResult>;

    /// `GET /api/check-payment?external_id=<id>`
    async fn check_payment(&self, external_id: &str) -> SessionResult<ChargeResult>;
}

/// Proxy error envelope
#[derive(Debug, Deserialize)]
struct Envelope {
    error: Option<String>,
    #[serde(default)]
    details: Option<Value>,
}

/// HTTP client for the pix-api proxies
pub struct HttpCheckoutApi {
    base_url: String,
    client: Client,
}

impl HttpCheckoutApi {
    pub fn new(base_url: impl Into<String>) -> SessionResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| SessionError::Transport(e.to_string()))?;

        let base_url: String = base_url.into();
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn read(response: Response) -> SessionResult<ChargeResult> {
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| SessionError::Transport(e.to_string()))?;

        if status.is_success() {
            let body: Value =
                serde_json::from_str(&text).map_err(|e| SessionError::Decode(e.to_string()))?;
            return Ok(ChargeResult::from_body(body));
        }

        let envelope = serde_json::from_str::<Envelope>(&text).ok();
        let details = envelope.as_ref().and_then(|e| e.details.clone());
        let message = envelope
            .and_then(|e| e.error)
            .unwrap_or_else(|| format!("Unexpected response from payment service (HTTP {})", status.as_u16()));

        Err(SessionError::Rejected {
            status: status.as_u16(),
            message,
            details,
        })
    }
}

#[async_trait]
impl CheckoutApi for HttpCheckoutApi {
    #[instrument(skip(self, request), fields(external_id = %request.external_id))]
    async fn create_pix(&self, request: &ChargeRequest) -> SessionResult<ChargeResult> {
        let response = self
            .client
            .post(format!("{}/api/create-pix", self.base_url))
            .json(request)
            .send()
            .await
            .map_err(|e| SessionError::Transport(e.to_string()))?;

        Self::read(response).await
    }

    #[instrument(skip(self))]
    async fn check_payment(&self, external_id: &str) -> SessionResult<ChargeResult> {
        let response = self
            .client
            .get(format!("{}/api/check-payment", self.base_url))
            .query(&[("external_id", external_id)])
            .send()
            .await
            .map_err(|e| SessionError::Transport(e.to_string()))?;

        debug!("check-payment answered {}", response.status());
        Self::read(response).await
    }
}

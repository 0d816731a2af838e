//! # BuckPay Transactions
//!
//! `PixGateway` implementation over the BuckPay transactions API.

use crate::config::{BuckpayConfig, CLIENT_USER_AGENT};
use async_trait::async_trait;
use pix_core::{ChargeResult, GatewayError, GatewayResult, PixGateway};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

/// BuckPay gateway client
///
/// One attempt per call, no retries.
pub struct BuckpayGateway {
    config: BuckpayConfig,
    client: Client,
}

impl BuckpayGateway {
    /// Create a new BuckPay gateway client
    pub fn new(config: BuckpayConfig) -> GatewayResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .user_agent(CLIENT_USER_AGENT)
            .build()
            .map_err(|e| GatewayError::Configuration(format!("HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn lookup_url(&self, external_id: &str) -> GatewayResult<Url> {
        let mut url = Url::parse(&self.config.transactions_url())
            .map_err(|e| GatewayError::Configuration(format!("invalid API base URL: {}", e)))?;

        url.path_segments_mut()
            .map_err(|_| GatewayError::Configuration("API base URL cannot be a base".to_string()))?
            .push("external_id")
            .push(external_id);

        Ok(url)
    }

    /// Headers shared by both calls
    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header(AUTHORIZATION, self.config.auth_header())
            .header(CONTENT_TYPE, "application/json")
    }

    /// Send the request and read the body as JSON
    async fn execute(&self, request: RequestBuilder) -> GatewayResult<(StatusCode, Value)> {
        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        Ok((status, parse_body(status, &text)?))
    }
}

/// Parse a gateway body; non-JSON error bodies are kept as a JSON string
fn parse_body(status: StatusCode, text: &str) -> GatewayResult<Value> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }

    match serde_json::from_str::<Value>(text) {
        Ok(value) => Ok(value),
        Err(_) if !status.is_success() => Ok(Value::String(text.to_string())),
        Err(e) => Err(GatewayError::Serialization(format!(
            "Failed to parse gateway response: {}",
            e
        ))),
    }
}

/// Map a non-2xx answer onto the error taxonomy
fn classify(status: StatusCode, details: Value, lookup: Option<&str>) -> GatewayError {
    match (status, lookup) {
        (StatusCode::FORBIDDEN, _) => GatewayError::Auth { details },
        (StatusCode::NOT_FOUND, Some(external_id)) => GatewayError::NotFound {
            external_id: external_id.to_string(),
            details,
        },
        _ => GatewayError::Upstream {
            status: status.as_u16(),
            details,
        },
    }
}

#[async_trait]
impl PixGateway for BuckpayGateway {
    #[instrument(skip(self, payload), fields(external_id = %payload["external_id"], amount = %payload["amount"]))]
    async fn create_charge(&self, payload: &Value) -> GatewayResult<ChargeResult> {
        debug!("Creating BuckPay transaction");

        // Serialized by hand so `authorized` owns the Content-Type header
        let bytes = serde_json::to_vec(payload)
            .map_err(|e| GatewayError::Serialization(format!("Failed to encode charge: {}", e)))?;

        let (status, body) = self
            .execute(self.client.post(self.config.transactions_url()).body(bytes))
            .await?;

        if !status.is_success() {
            error!("BuckPay API error: status={}, body={}", status, body);
            return Err(classify(status, body, None));
        }

        let charge = ChargeResult::from_body(body);
        info!(
            "Created BuckPay transaction: status={}, has_pix={}",
            charge.status,
            charge.pix.is_some()
        );

        Ok(charge)
    }

    #[instrument(skip(self))]
    async fn charge_status(&self, external_id: &str) -> GatewayResult<ChargeResult> {
        let url = self.lookup_url(external_id)?;
        let (status, body) = self.execute(self.client.get(url)).await?;

        if !status.is_success() {
            if status == StatusCode::NOT_FOUND {
                debug!("Transaction not visible upstream yet");
            } else {
                warn!("BuckPay status lookup failed: status={}, body={}", status, body);
            }
            return Err(classify(status, body, Some(external_id)));
        }

        let charge = ChargeResult::from_body(body);
        debug!("Transaction status: {}", charge.status);

        Ok(charge)
    }

    fn provider_name(&self) -> &'static str {
        "buckpay"
    }
}

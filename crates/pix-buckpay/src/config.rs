//! # BuckPay Configuration
//!
//! Configuration management for the BuckPay integration.
//! The API key is loaded from the environment.

use pix_core::GatewayError;
use std::env;

/// Production API host
pub const DEFAULT_API_BASE_URL: &str = "https://api.realtechdev.com.br";

/// Client identifier the gateway expects on every call
pub const CLIENT_USER_AGENT: &str = "Buckpay API";

/// BuckPay API configuration
#[derive(Clone)]
pub struct BuckpayConfig {
    /// Bearer API key
    pub api_key: String,

    /// API base URL (for testing/mocking)
    pub api_base_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl BuckpayConfig {
    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `BUCKPAY_API_KEY`
    ///
    /// Optional:
    /// - `BUCKPAY_API_BASE_URL`
    pub fn from_env() -> Result<Self, GatewayError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, GatewayError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("BUCKPAY_API_KEY")
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or_else(|| GatewayError::Configuration("BUCKPAY_API_KEY not set".to_string()))?;

        let api_base_url = lookup("BUCKPAY_API_BASE_URL")
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());

        Ok(Self {
            api_key,
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            timeout_secs: 30,
        })
    }

    /// Create config with an explicit key (for testing)
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout_secs: 30,
        }
    }

    /// Get authorization header value
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.api_key)
    }

    /// Builder: set custom API base URL (for testing)
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        let url: String = url.into();
        self.api_base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn transactions_url(&self) -> String {
        format!("{}/v1/transactions", self.api_base_url)
    }
}

// Keep the key out of logs
impl std::fmt::Debug for BuckpayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuckpayConfig")
            .field("api_key", &"***")
            .field("api_base_url", &self.api_base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_auth_header() {
        let config = BuckpayConfig::new("bp_live_123");
        assert_eq!(config.auth_header(), "Bearer bp_live_123");
    }

    #[test]
    fn test_missing_key() {
        let result = BuckpayConfig::from_lookup(lookup_from(&[]));
        assert!(matches!(result, Err(GatewayError::Configuration(_))));

        let blank = BuckpayConfig::from_lookup(lookup_from(&[("BUCKPAY_API_KEY", "  ")]));
        assert!(blank.is_err());
    }

    #[test]
    fn test_base_url_override() {
        let config = BuckpayConfig::from_lookup(lookup_from(&[
            ("BUCKPAY_API_KEY", "k"),
            ("BUCKPAY_API_BASE_URL", "http://localhost:9999/"),
        ]))
        .unwrap();

        assert_eq!(config.transactions_url(), "http://localhost:9999/v1/transactions");
    }

    #[test]
    fn test_debug_hides_key() {
        let config = BuckpayConfig::new("secret-key");
        assert!(!format!("{:?}", config).contains("secret-key"));
    }
}

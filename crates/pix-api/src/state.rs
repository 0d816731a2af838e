//! # Application State
//!
//! Shared state for the Axum application.
//! Holds the gateway (when a credential is configured) and the plan catalog.

use pix_buckpay::{BuckpayConfig, BuckpayGateway};
use pix_core::{BoxedGateway, GatewayError, GatewayResult, PlanCatalog};
use std::sync::Arc;
use tracing::{info, warn};

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Environment (development, staging, production)
    pub environment: String,
    /// Plan catalog location
    pub plans_path: String,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            plans_path: std::env::var("PLANS_PATH")
                .unwrap_or_else(|_| "config/plans.toml".to_string()),
        }
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<std::net::SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid socket address {}:{}: {}", self.host, self.port, e))
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            environment: "development".to_string(),
            plans_path: "config/plans.toml".to_string(),
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Upstream gateway; `None` when BUCKPAY_API_KEY is missing
    gateway: Option<BoxedGateway>,
    /// Checkout plans
    pub plans: PlanCatalog,
    /// Application config
    pub config: AppConfig,
}

impl AppState {
    /// Build state from the environment.
    ///
    /// A missing credential does not stop the server: the proxies answer
    /// every request with a configuration error until it is set.
    pub fn new() -> anyhow::Result<Self> {
        let config = AppConfig::from_env();

        let plans = PlanCatalog::load_or_builtin(&config.plans_path)
            .map_err(|e| anyhow::anyhow!("Failed to load plans: {}", e))?;
        info!("Loaded {} checkout plans", plans.len());

        let gateway = gateway_from_config(BuckpayConfig::from_env())?;

        Ok(Self {
            gateway,
            plans,
            config,
        })
    }

    /// Build state from parts (tests, embedding)
    pub fn from_parts(gateway: Option<BoxedGateway>, plans: PlanCatalog, config: AppConfig) -> Self {
        Self {
            gateway,
            plans,
            config,
        }
    }

    /// The configured gateway, or a configuration error
    pub fn gateway(&self) -> GatewayResult<&BoxedGateway> {
        self.gateway
            .as_ref()
            .ok_or_else(|| GatewayError::Configuration("BUCKPAY_API_KEY not set".to_string()))
    }

    pub fn has_gateway(&self) -> bool {
        self.gateway.is_some()
    }
}

/// Build the gateway from its loaded config.
///
/// Loading the config fails only when the key is absent, which leaves the
/// proxies without a gateway. A client that cannot be built is fatal.
fn gateway_from_config(
    config: GatewayResult<BuckpayConfig>,
) -> anyhow::Result<Option<BoxedGateway>> {
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            warn!("{}; proxy endpoints will answer 500", e);
            return Ok(None);
        }
    };

    let gateway = BuckpayGateway::new(config)
        .map_err(|e| anyhow::anyhow!("Failed to initialize BuckPay: {}", e))?;
    Ok(Some(Arc::new(gateway) as BoxedGateway))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_socket_addr() {
        let config = AppConfig {
            host: "0.0.0.0".to_string(),
            port: 3000,
            ..AppConfig::default()
        };

        let addr = config.socket_addr().unwrap();
        assert_eq!(addr.to_string(), "0.0.0.0:3000");
    }

    #[test]
    fn test_bad_socket_addr() {
        let config = AppConfig {
            host: "not a host".to_string(),
            ..AppConfig::default()
        };
        assert!(config.socket_addr().is_err());
    }

    #[test]
    fn test_missing_gateway_is_configuration_error() {
        let state = AppState::from_parts(None, PlanCatalog::builtin(), AppConfig::default());

        assert!(!state.has_gateway());
        assert_eq!(state.gateway().err().map(|e| e.status_code()), Some(500));
    }

    #[test]
    fn test_missing_key_leaves_proxies_without_gateway() {
        let config = BuckpayConfig::from_lookup(|_: &str| None);
        assert!(gateway_from_config(config).unwrap().is_none());

        let config = BuckpayConfig::from_lookup(|key: &str| {
            (key == "BUCKPAY_API_KEY").then(|| "test-key".to_string())
        });
        let gateway = gateway_from_config(config).unwrap().unwrap();
        assert_eq!(gateway.provider_name(), "buckpay");
    }
}

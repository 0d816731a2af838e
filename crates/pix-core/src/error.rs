//! # Gateway Error Types
//!
//! Typed error handling for the PIX charge flow.
//! Every gateway and proxy operation returns `Result<T, GatewayError>`.

use serde_json::Value;
use thiserror::Error;

/// Core error type for all gateway operations
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Missing or invalid credential / settings
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Missing or malformed caller input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Upstream rejected the credential (HTTP 403)
    #[error("Authentication rejected by gateway")]
    Auth { details: Value },

    /// Any other non-2xx answer from the gateway
    #[error("Gateway returned HTTP {status}")]
    Upstream { status: u16, details: Value },

    /// Charge lookup hit a record the gateway does not know (yet)
    #[error("Transaction not found: {external_id}")]
    NotFound { external_id: String, details: Value },

    /// Network/HTTP failure talking to the gateway
    #[error("Transport error: {0}")]
    Transport(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl GatewayError {
    /// HTTP status the proxies answer with for this error
    pub fn status_code(&self) -> u16 {
        match self {
            GatewayError::Configuration(_) => 500,
            GatewayError::Validation(_) => 400,
            GatewayError::Auth { .. } => 403,
            GatewayError::Upstream { status, .. } => *status,
            GatewayError::NotFound { .. } => 404,
            GatewayError::Transport(_) => 500,
            GatewayError::Serialization(_) => 500,
        }
    }

    /// Message placed in the `error` field of the response envelope
    pub fn user_message(&self) -> String {
        match self {
            GatewayError::Configuration(_) => "BUCKPAY_API_KEY is not configured".to_string(),
            GatewayError::Validation(msg) => msg.clone(),
            GatewayError::Auth { .. } => {
                "Authentication error with the payment API. Check the key or environment."
                    .to_string()
            }
            GatewayError::Upstream { .. } => "Unexpected error, please try again.".to_string(),
            GatewayError::NotFound { .. } => "Transaction not found yet".to_string(),
            GatewayError::Transport(_) | GatewayError::Serialization(_) => {
                "Error processing request".to_string()
            }
        }
    }

    /// Upstream body attached to the error, if any
    pub fn details(&self) -> Option<&Value> {
        match self {
            GatewayError::Auth { details }
            | GatewayError::Upstream { details, .. }
            | GatewayError::NotFound { details, .. } => Some(details),
            _ => None,
        }
    }

    /// True for the "not created upstream yet" case, which callers treat as pending
    pub fn is_not_found(&self) -> bool {
        matches!(self, GatewayError::NotFound { .. })
    }
}

/// Result type alias for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_codes() {
        assert_eq!(GatewayError::Configuration("x".into()).status_code(), 500);
        assert_eq!(GatewayError::Validation("x".into()).status_code(), 400);
        assert_eq!(GatewayError::Auth { details: json!({}) }.status_code(), 403);
        assert_eq!(
            GatewayError::Upstream {
                status: 422,
                details: json!({})
            }
            .status_code(),
            422
        );
        assert_eq!(GatewayError::Transport("reset".into()).status_code(), 500);
    }

    #[test]
    fn test_details_only_for_upstream_answers() {
        let err = GatewayError::Upstream {
            status: 502,
            details: json!({"message": "bad gateway"}),
        };
        assert_eq!(err.details(), Some(&json!({"message": "bad gateway"})));
        assert!(GatewayError::Transport("timeout".into()).details().is_none());
    }

    #[test]
    fn test_not_found_is_transient() {
        let err = GatewayError::NotFound {
            external_id: "pix-1".into(),
            details: Value::Null,
        };
        assert!(err.is_not_found());
        assert_eq!(err.status_code(), 404);
        assert!(!GatewayError::Auth { details: Value::Null }.is_not_found());
    }

    #[test]
    fn test_auth_message_mentions_authentication() {
        let msg = GatewayError::Auth { details: Value::Null }.user_message();
        assert!(msg.contains("Authentication"));
    }
}

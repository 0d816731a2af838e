//! Session error types

use serde_json::Value;
use thiserror::Error;

/// Result type alias for proxy calls made by the session
pub type SessionResult<T> = Result<T, SessionError>;

/// Failures talking to the checkout proxies
#[derive(Debug, Error)]
pub enum SessionError {
    /// Proxy answered non-2xx with an error envelope
    #[error("HTTP {status}: {message}")]
    Rejected {
        status: u16,
        message: String,
        details: Option<Value>,
    },

    /// Proxy unreachable
    #[error("Transport error: {0}")]
    Transport(String),

    /// 2xx answer that is not JSON
    #[error("Invalid response: {0}")]
    Decode(String),
}

impl SessionError {
    /// HTTP status, when the proxy answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            SessionError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// A 404 from the status proxy means "not created upstream yet"
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Message shown to the buyer
    pub fn user_message(&self) -> String {
        match self {
            SessionError::Rejected { message, .. } => message.clone(),
            SessionError::Transport(_) => "Error generating PIX payment".to_string(),
            SessionError::Decode(_) => "Error creating PIX transaction".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found() {
        let err = SessionError::Rejected {
            status: 404,
            message: "Transaction not found yet".into(),
            details: None,
        };
        assert!(err.is_not_found());
        assert!(!SessionError::Transport("refused".into()).is_not_found());
    }

    #[test]
    fn test_user_message() {
        let err = SessionError::Rejected {
            status: 403,
            message: "Authentication error with the payment API.".into(),
            details: None,
        };
        assert_eq!(err.user_message(), "Authentication error with the payment API.");
        assert_eq!(
            SessionError::Transport("refused".into()).user_message(),
            "Error generating PIX payment"
        );
    }
}

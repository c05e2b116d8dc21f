//! Chat client errors

use crate::protocol::CloseCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Non-2xx REST response
    #[error("API error {status} {code}: {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("Protocol error: {0}")]
    Protocol(String),

    /// The gateway closed the connection
    #[error("Connection closed{}", .0.map(|c| format!(": {c}")).unwrap_or_default())]
    Closed(Option<CloseCode>),

    #[error("Not connected")]
    NotConnected,
}

impl ClientError {
    /// Whether reconnecting may help
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(_) | Self::WebSocket(_) | Self::NotConnected => true,
            Self::Closed(code) => code.map_or(true, CloseCode::should_reconnect),
            Self::Api { status, .. } => *status >= 500,
            Self::Json(_) | Self::Protocol(_) => false,
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable() {
        assert!(ClientError::Closed(None).is_retryable());
        assert!(ClientError::Closed(Some(CloseCode::SessionTimeout)).is_retryable());
        assert!(!ClientError::Closed(Some(CloseCode::AuthenticationFailed)).is_retryable());

        let not_found = ClientError::Api {
            status: 404,
            code: "GUEST_TOKEN_NOT_FOUND".to_string(),
            message: "Guest token not found".to_string(),
        };
        assert!(!not_found.is_retryable());
    }

    #[test]
    fn test_closed_display() {
        let err = ClientError::Closed(Some(CloseCode::ThreadForbidden));
        assert!(err.to_string().contains("4010"));
        assert_eq!(ClientError::Closed(None).to_string(), "Connection closed");
    }
}

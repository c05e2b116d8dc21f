//! Handler error types

use crate::protocol::CloseCode;
use stay_cache::SubscriberError;
use stay_service::ServiceError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Already authenticated")]
    AlreadyAuthenticated,

    #[error("Thread not accessible: {0}")]
    ThreadForbidden(Uuid),

    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    #[error("Subscriber error: {0}")]
    Subscriber(#[from] SubscriberError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl HandlerError {
    /// Close code to end the connection with
    pub fn to_close_code(&self) -> CloseCode {
        match self {
            Self::InvalidPayload(_) => CloseCode::DecodeError,
            Self::AuthenticationFailed(_) => CloseCode::AuthenticationFailed,
            Self::NotAuthenticated => CloseCode::NotAuthenticated,
            Self::AlreadyAuthenticated => CloseCode::AlreadyAuthenticated,
            Self::ThreadForbidden(_) => CloseCode::ThreadForbidden,
            Self::Service(_) | Self::Subscriber(_) | Self::Internal(_) => CloseCode::UnknownError,
        }
    }

    /// Caller-side service failures become `mapped`; server failures stay
    /// service errors
    pub(crate) fn from_service(err: ServiceError, mapped: impl FnOnce(String) -> Self) -> Self {
        if (400..500).contains(&err.status_code()) {
            mapped(err.to_string())
        } else {
            Self::Service(err)
        }
    }
}

pub type HandlerResult<T> = Result<T, HandlerError>;

#[cfg(test)]
mod tests {
    use super::*;
    use stay_common::AppError;

    #[test]
    fn test_client_service_errors_are_mapped() {
        let err = HandlerError::from_service(
            ServiceError::App(AppError::TokenExpired),
            HandlerError::AuthenticationFailed,
        );
        assert_eq!(err.to_close_code(), CloseCode::AuthenticationFailed);

        let thread = Uuid::new_v4();
        let err = HandlerError::from_service(
            ServiceError::not_found("MessageThread", thread.to_string()),
            |_| HandlerError::ThreadForbidden(thread),
        );
        assert_eq!(err.to_close_code(), CloseCode::ThreadForbidden);
    }

    #[test]
    fn test_server_service_errors_are_kept() {
        let err = HandlerError::from_service(
            ServiceError::internal("connection reset"),
            HandlerError::AuthenticationFailed,
        );
        assert!(matches!(err, HandlerError::Service(_)));
        assert_eq!(err.to_close_code(), CloseCode::UnknownError);
    }
}

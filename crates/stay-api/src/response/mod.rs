//! Response types and error handling for API endpoints
//!
//! Every error leaves the API as `{"error": {"code", "message", "details"}}`.
//! Server errors are logged in full and answered with a generic message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use stay_common::{domain_status, AppError};
use stay_core::DomainError;
use stay_service::ServiceError;
use thiserror::Error;
use tracing::error;
use validator::ValidationErrors;

/// Message returned for every 5xx response
const INTERNAL_MESSAGE: &str = "Internal server error";

/// API error type for consistent error responses
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    App(#[from] AppError),

    #[error("{0}")]
    Service(#[from] ServiceError),

    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Invalid path parameter: {0}")]
    InvalidPath(String),

    #[error("Invalid query parameter: {0}")]
    InvalidQuery(String),

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("Missing authorization header")]
    MissingAuth,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Invalid webhook secret")]
    InvalidWebhookSecret,

    #[error("Internal server error")]
    Internal(#[source] anyhow::Error),
}

impl ApiError {
    /// Get HTTP status code for this error
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        let code = match self {
            Self::App(e) => e.status_code(),
            Self::Service(e) => e.status_code(),
            Self::Domain(e) => domain_status(e),
            Self::Validation(_) | Self::InvalidPath(_) | Self::InvalidQuery(_) | Self::InvalidBody(_) => 400,
            Self::MissingAuth | Self::InvalidToken | Self::InvalidWebhookSecret => 401,
            Self::Internal(_) => 500,
        };
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Get error code for API responses
    #[must_use]
    pub fn error_code(&self) -> &str {
        match self {
            Self::App(e) => e.error_code(),
            Self::Service(e) => e.error_code(),
            Self::Domain(e) => e.code(),
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::InvalidPath(_) => "INVALID_PATH_PARAMETER",
            Self::InvalidQuery(_) => "INVALID_QUERY_PARAMETER",
            Self::InvalidBody(_) => "INVALID_BODY",
            Self::MissingAuth => "MISSING_AUTHORIZATION",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::InvalidWebhookSecret => "INVALID_WEBHOOK_SECRET",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Message safe to return to the caller
    #[must_use]
    pub fn public_message(&self) -> String {
        if self.status_code().is_server_error() {
            INTERNAL_MESSAGE.to_string()
        } else {
            self.to_string()
        }
    }

    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        Self::Internal(err.into())
    }

    pub fn invalid_path(msg: impl Into<String>) -> Self {
        Self::InvalidPath(msg.into())
    }

    pub fn invalid_query(msg: impl Into<String>) -> Self {
        Self::InvalidQuery(msg.into())
    }

    pub fn invalid_body(msg: impl Into<String>) -> Self {
        Self::InvalidBody(msg.into())
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Error detail for API responses
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            error!(error = ?self, "Server error occurred");
        }

        let details = if let Self::Validation(errors) = &self {
            serde_json::to_value(errors).ok()
        } else {
            None
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code: self.error_code().to_string(),
                message: self.public_message(),
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;

/// Created response (201) with JSON body
pub struct Created<T>(pub T);

impl<T: IntoResponse> IntoResponse for Created<T> {
    fn into_response(self) -> Response {
        let mut response = self.0.into_response();
        *response.status_mut() = StatusCode::CREATED;
        response
    }
}

/// No content response (204)
pub struct NoContent;

impl IntoResponse for NoContent {
    fn into_response(self) -> Response {
        StatusCode::NO_CONTENT.into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use uuid::Uuid;

    async fn body_json(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_api_error_status_codes() {
        assert_eq!(ApiError::MissingAuth.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::invalid_path("reservation_id").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(DomainError::CheckInAlreadyCompleted).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError::from(ServiceError::not_found("Reservation", Uuid::nil().to_string()))
                .status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(AppError::TokenExpired).status_code(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[tokio::test]
    async fn test_client_error_keeps_message() {
        let (status, body) = body_json(ApiError::from(DomainError::PassportRequired)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], DomainError::PassportRequired.code());
        assert_eq!(body["error"]["message"], DomainError::PassportRequired.to_string());
        assert!(body["error"].get("details").is_none());
    }

    #[tokio::test]
    async fn test_server_error_is_redacted() {
        let err = ApiError::from(ServiceError::internal("pool timed out after 10s"));
        let (status, body) = body_json(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], "INTERNAL_ERROR");
        assert_eq!(body["error"]["message"], INTERNAL_MESSAGE);
    }

    #[tokio::test]
    async fn test_created_sets_status() {
        let response = Created(Json(serde_json::json!({ "id": 1 }))).into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(NoContent.into_response().status(), StatusCode::NO_CONTENT);
    }
}

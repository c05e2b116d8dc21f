//! Application-wide error type
//!
//! Carries failures that are not domain rule violations: authentication,
//! infrastructure and startup problems. Each variant knows its HTTP status
//! and stable error code.

use stay_core::DomainError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    /// Authenticated, but the role does not allow the operation
    #[error("Insufficient permissions")]
    InsufficientPermissions,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal server error")]
    Internal(#[source] anyhow::Error),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl AppError {
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::InvalidToken | Self::TokenExpired => 401,
            Self::InsufficientPermissions => 403,
            Self::NotFound(_) => 404,
            Self::Conflict(_) => 409,
            Self::Database(_) | Self::Cache(_) | Self::Config(_) | Self::Internal(_) => 500,
            Self::Domain(e) => domain_status(e),
        }
    }

    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidToken => "INVALID_TOKEN",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::InsufficientPermissions => "INSUFFICIENT_PERMISSIONS",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Conflict(_) => "CONFLICT",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Cache(_) => "CACHE_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Domain(e) => e.code(),
        }
    }
}

/// HTTP status for a domain error.
///
/// Business rule violations (a second check-in, cancelling a checked-out
/// stay) answer 422 so clients can tell them apart from malformed input.
#[must_use]
pub fn domain_status(e: &DomainError) -> u16 {
    if e.is_not_found() {
        404
    } else if e.is_authorization() {
        403
    } else if e.is_validation() {
        400
    } else if e.is_conflict() {
        409
    } else if e.is_business_rule() {
        422
    } else {
        500
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::InvalidToken.status_code(), 401);
        assert_eq!(AppError::TokenExpired.status_code(), 401);
        assert_eq!(AppError::InsufficientPermissions.status_code(), 403);
        assert_eq!(AppError::NotFound("property".to_string()).status_code(), 404);
        assert_eq!(AppError::Cache("pool exhausted".to_string()).status_code(), 500);
    }

    #[test]
    fn test_domain_status_codes() {
        let id = Uuid::new_v4();
        assert_eq!(AppError::from(DomainError::ReservationNotFound(id)).status_code(), 404);
        assert_eq!(AppError::from(DomainError::PassportRequired).status_code(), 400);
        assert_eq!(AppError::from(DomainError::NotPropertyOwner).status_code(), 403);
        assert_eq!(AppError::from(DomainError::DuplicateBooking(42)).status_code(), 409);
        assert_eq!(AppError::from(DomainError::CheckInAlreadyCompleted).status_code(), 422);
    }

    #[test]
    fn test_domain_error_keeps_its_code() {
        let err = AppError::from(DomainError::PassportRequired);
        assert_eq!(err.error_code(), DomainError::PassportRequired.code());
        assert_eq!(err.to_string(), DomainError::PassportRequired.to_string());
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(AppError::InvalidToken.error_code(), "INVALID_TOKEN");
        assert_eq!(AppError::Config("JWT_SECRET".to_string()).error_code(), "CONFIG_ERROR");
    }
}

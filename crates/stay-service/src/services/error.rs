//! Errors returned by the service layer
//!
//! Domain rule violations and application errors pass through untouched so
//! the API maps them with their own status and code.

use stay_common::{domain_status, AppError};
use stay_core::DomainError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    App(#[from] AppError),

    #[error("{resource} not found: {id}")]
    NotFound { resource: &'static str, id: String },

    /// The caller's role lacks the named permission
    #[error("Missing required permission: {permission}")]
    PermissionDenied { permission: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    pub fn not_found(resource: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource,
            id: id.into(),
        }
    }

    pub fn permission_denied(permission: impl Into<String>) -> Self {
        Self::PermissionDenied {
            permission: permission.into(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Domain(e) => domain_status(e),
            Self::App(e) => e.status_code(),
            Self::NotFound { .. } => 404,
            Self::PermissionDenied { .. } => 403,
            Self::Validation(_) => 400,
            Self::Conflict(_) => 409,
            Self::Internal(_) => 500,
        }
    }

    #[must_use]
    pub fn error_code(&self) -> &str {
        match self {
            Self::Domain(e) => e.code(),
            Self::App(e) => e.error_code(),
            Self::NotFound { .. } => "NOT_FOUND",
            Self::PermissionDenied { .. } => "MISSING_PERMISSIONS",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Conflict(_) => "CONFLICT",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Validation(err.to_string())
    }
}

/// Collapse into the shared application error, used by the binaries' setup
/// code where only an `AppError` can be returned.
impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Domain(e) => Self::Domain(e),
            ServiceError::App(e) => e,
            ServiceError::NotFound { resource, id } => Self::NotFound(format!("{resource} {id}")),
            ServiceError::PermissionDenied { .. } => Self::InsufficientPermissions,
            ServiceError::Validation(msg) => Self::Validation(msg),
            ServiceError::Conflict(msg) => Self::Conflict(msg),
            ServiceError::Internal(msg) => Self::Internal(anyhow::anyhow!(msg)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_missing_reservation() {
        let err = ServiceError::not_found("Reservation", "123");
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.error_code(), "NOT_FOUND");
        assert_eq!(err.to_string(), "Reservation not found: 123");
    }

    #[test]
    fn test_cleaner_without_property_access() {
        let err = ServiceError::permission_denied("MANAGE_PROPERTIES");
        assert_eq!(err.status_code(), 403);
        assert_eq!(err.error_code(), "MISSING_PERMISSIONS");
    }

    #[test]
    fn test_domain_errors_keep_their_status() {
        let err = ServiceError::from(DomainError::RoomTypeNotFound(Uuid::nil()));
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.error_code(), "UNKNOWN_ROOM_TYPE");

        assert_eq!(ServiceError::from(DomainError::CheckInAlreadyCompleted).status_code(), 422);
        assert_eq!(
            ServiceError::from(DomainError::DatabaseError("boom".to_string())).status_code(),
            500
        );
    }

    #[test]
    fn test_duplicate_import_is_conflict() {
        let err = ServiceError::conflict("Booking already imported");
        assert_eq!(err.status_code(), 409);
        assert_eq!(err.error_code(), "CONFLICT");
    }

    #[test]
    fn test_collapses_into_app_error() {
        let app_err: AppError = ServiceError::not_found("Property", "456").into();
        assert_eq!(app_err.status_code(), 404);

        let app_err: AppError = ServiceError::from(DomainError::PassportRequired).into();
        assert_eq!(app_err.error_code(), "PASSPORT_REQUIRED");
    }
}

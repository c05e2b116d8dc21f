//! Domain errors - error types for the domain layer

use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("Property not found: {0}")]
    PropertyNotFound(Uuid),

    #[error("Room type not found: {0}")]
    RoomTypeNotFound(Uuid),

    #[error("Room unit not found: {0}")]
    RoomUnitNotFound(Uuid),

    #[error("Reservation not found: {0}")]
    ReservationNotFound(Uuid),

    #[error("No reservation for this guest link")]
    GuestTokenNotFound,

    #[error("Cleaning task not found: {0}")]
    CleaningTaskNotFound(Uuid),

    #[error("User not found: {0}")]
    UserNotFound(Uuid),

    #[error("Message rule not found: {0}")]
    MessageRuleNotFound(Uuid),

    #[error("Message template not found: {0}")]
    MessageTemplateNotFound(Uuid),

    #[error("Scheduled message not found: {0}")]
    ScheduledMessageNotFound(Uuid),

    #[error("Message thread not found: {0}")]
    ThreadNotFound(Uuid),

    #[error("Message not found: {0}")]
    MessageNotFound(Uuid),

    #[error("Guest service not found: {0}")]
    GuestServiceNotFound(Uuid),

    #[error("Reservation service not found: {0}")]
    ReservationServiceNotFound(Uuid),

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Check-out ({check_out}) must be after check-in ({check_in})")]
    InvalidStayDates {
        check_in: NaiveDate,
        check_out: NaiveDate,
    },

    #[error("Passport number is required for foreign guests")]
    PassportRequired,

    #[error("Content too long: max {max} characters")]
    ContentTooLong { max: usize },

    #[error("Invalid message rule: {0}")]
    InvalidRule(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid guest token")]
    InvalidGuestToken,

    #[error("Too many guests: room type allows {max}")]
    TooManyGuests { max: i32 },

    // =========================================================================
    // Authorization Errors
    // =========================================================================
    #[error("Missing capability: {0}")]
    MissingCapability(String),

    #[error("Not the owner of this property")]
    NotPropertyOwner,

    #[error("Task is not assigned to this cleaner")]
    NotAssignedCleaner,

    // =========================================================================
    // Conflict Errors
    // =========================================================================
    #[error("Booking {0} already imported")]
    DuplicateBooking(i64),

    #[error("Room unit number already in use: {0}")]
    RoomUnitNumberTaken(String),

    #[error("Email already in use")]
    EmailAlreadyExists,

    // =========================================================================
    // Business Rule Violations
    // =========================================================================
    #[error("Invalid status transition: {from} -> {to}")]
    InvalidStatusTransition { from: String, to: String },

    #[error("Online check-in already completed")]
    CheckInAlreadyCompleted,

    #[error("Reservation is not active: {0}")]
    ReservationNotActive(String),

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Cache error: {0}")]
    CacheError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Result alias for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            // Not Found
            Self::PropertyNotFound(_) => "UNKNOWN_PROPERTY",
            Self::RoomTypeNotFound(_) => "UNKNOWN_ROOM_TYPE",
            Self::RoomUnitNotFound(_) => "UNKNOWN_ROOM_UNIT",
            Self::ReservationNotFound(_) | Self::GuestTokenNotFound => "UNKNOWN_RESERVATION",
            Self::CleaningTaskNotFound(_) => "UNKNOWN_CLEANING_TASK",
            Self::UserNotFound(_) => "UNKNOWN_USER",
            Self::MessageRuleNotFound(_) => "UNKNOWN_MESSAGE_RULE",
            Self::MessageTemplateNotFound(_) => "UNKNOWN_MESSAGE_TEMPLATE",
            Self::ScheduledMessageNotFound(_) => "UNKNOWN_SCHEDULED_MESSAGE",
            Self::ThreadNotFound(_) => "UNKNOWN_THREAD",
            Self::MessageNotFound(_) => "UNKNOWN_MESSAGE",
            Self::GuestServiceNotFound(_) => "UNKNOWN_GUEST_SERVICE",
            Self::ReservationServiceNotFound(_) => "UNKNOWN_RESERVATION_SERVICE",

            // Validation
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::InvalidStayDates { .. } => "INVALID_STAY_DATES",
            Self::PassportRequired => "PASSPORT_REQUIRED",
            Self::ContentTooLong { .. } => "CONTENT_TOO_LONG",
            Self::InvalidRule(_) => "INVALID_RULE",
            Self::InvalidTimezone(_) => "INVALID_TIMEZONE",
            Self::InvalidGuestToken => "INVALID_GUEST_TOKEN",
            Self::TooManyGuests { .. } => "TOO_MANY_GUESTS",

            // Authorization
            Self::MissingCapability(_) => "MISSING_CAPABILITY",
            Self::NotPropertyOwner => "NOT_PROPERTY_OWNER",
            Self::NotAssignedCleaner => "NOT_ASSIGNED_CLEANER",

            // Conflict
            Self::DuplicateBooking(_) => "DUPLICATE_BOOKING",
            Self::RoomUnitNumberTaken(_) => "ROOM_UNIT_NUMBER_TAKEN",
            Self::EmailAlreadyExists => "EMAIL_ALREADY_EXISTS",

            // Business Rules
            Self::InvalidStatusTransition { .. } => "INVALID_STATUS_TRANSITION",
            Self::CheckInAlreadyCompleted => "CHECK_IN_ALREADY_COMPLETED",
            Self::ReservationNotActive(_) => "RESERVATION_NOT_ACTIVE",

            // Infrastructure
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::CacheError(_) => "CACHE_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::PropertyNotFound(_)
                | Self::RoomTypeNotFound(_)
                | Self::RoomUnitNotFound(_)
                | Self::ReservationNotFound(_)
                | Self::GuestTokenNotFound
                | Self::CleaningTaskNotFound(_)
                | Self::UserNotFound(_)
                | Self::MessageRuleNotFound(_)
                | Self::MessageTemplateNotFound(_)
                | Self::ScheduledMessageNotFound(_)
                | Self::ThreadNotFound(_)
                | Self::MessageNotFound(_)
                | Self::GuestServiceNotFound(_)
                | Self::ReservationServiceNotFound(_)
        )
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::ValidationError(_)
                | Self::InvalidStayDates { .. }
                | Self::PassportRequired
                | Self::ContentTooLong { .. }
                | Self::InvalidRule(_)
                | Self::InvalidTimezone(_)
                | Self::InvalidGuestToken
                | Self::TooManyGuests { .. }
        )
    }

    /// Check if this is an authorization error
    pub fn is_authorization(&self) -> bool {
        matches!(
            self,
            Self::MissingCapability(_) | Self::NotPropertyOwner | Self::NotAssignedCleaner
        )
    }

    /// Check if this is a conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::DuplicateBooking(_) | Self::RoomUnitNumberTaken(_) | Self::EmailAlreadyExists
        )
    }

    /// Business-rule violations the caller can act on (HTTP 422)
    pub fn is_business_rule(&self) -> bool {
        matches!(
            self,
            Self::InvalidStatusTransition { .. }
                | Self::CheckInAlreadyCompleted
                | Self::ReservationNotActive(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = DomainError::PropertyNotFound(Uuid::nil());
        assert_eq!(err.code(), "UNKNOWN_PROPERTY");

        let err = DomainError::GuestTokenNotFound;
        assert_eq!(err.code(), "UNKNOWN_RESERVATION");

        let err = DomainError::MissingCapability("MANAGE_USERS".to_string());
        assert_eq!(err.code(), "MISSING_CAPABILITY");
    }

    #[test]
    fn test_categories() {
        assert!(DomainError::ReservationNotFound(Uuid::nil()).is_not_found());
        assert!(DomainError::PassportRequired.is_validation());
        assert!(DomainError::NotAssignedCleaner.is_authorization());
        assert!(DomainError::DuplicateBooking(42).is_conflict());
        assert!(DomainError::CheckInAlreadyCompleted.is_business_rule());
        assert!(!DomainError::DatabaseError("x".to_string()).is_not_found());
    }

    #[test]
    fn test_error_display() {
        let err = DomainError::InvalidStayDates {
            check_in: NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
            check_out: NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
        };
        assert_eq!(
            err.to_string(),
            "Check-out (2024-03-05) must be after check-in (2024-03-05)"
        );

        let err = DomainError::ContentTooLong { max: 4000 };
        assert_eq!(err.to_string(), "Content too long: max 4000 characters");
    }
}

//! Error handling utilities for repositories

use sqlx::Error as SqlxError;
use stay_core::error::DomainError;
use uuid::Uuid;

/// Postgres SQLSTATE for a missing table or view
const UNDEFINED_TABLE: &str = "42P01";

/// Convert SQLx error to DomainError
pub fn map_db_error(e: SqlxError) -> DomainError {
    DomainError::DatabaseError(e.to_string())
}

/// Check for unique violation and return appropriate error or fallback
pub fn map_unique_violation<F>(e: SqlxError, on_unique: F) -> DomainError
where
    F: FnOnce() -> DomainError,
{
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return on_unique();
        }
    }
    DomainError::DatabaseError(e.to_string())
}

/// True when the statement referenced a relation that does not exist
pub fn is_undefined_table(e: &SqlxError) -> bool {
    e.as_database_error()
        .and_then(|db_err| db_err.code())
        .is_some_and(|code| code == UNDEFINED_TABLE)
}

pub fn property_not_found(id: Uuid) -> DomainError {
    DomainError::PropertyNotFound(id)
}

pub fn room_type_not_found(id: Uuid) -> DomainError {
    DomainError::RoomTypeNotFound(id)
}

pub fn room_unit_not_found(id: Uuid) -> DomainError {
    DomainError::RoomUnitNotFound(id)
}

pub fn reservation_not_found(id: Uuid) -> DomainError {
    DomainError::ReservationNotFound(id)
}

pub fn cleaning_task_not_found(id: Uuid) -> DomainError {
    DomainError::CleaningTaskNotFound(id)
}

pub fn user_not_found(id: Uuid) -> DomainError {
    DomainError::UserNotFound(id)
}

pub fn message_rule_not_found(id: Uuid) -> DomainError {
    DomainError::MessageRuleNotFound(id)
}

pub fn message_template_not_found(id: Uuid) -> DomainError {
    DomainError::MessageTemplateNotFound(id)
}

pub fn scheduled_message_not_found(id: Uuid) -> DomainError {
    DomainError::ScheduledMessageNotFound(id)
}

pub fn thread_not_found(id: Uuid) -> DomainError {
    DomainError::ThreadNotFound(id)
}

pub fn guest_service_not_found(id: Uuid) -> DomainError {
    DomainError::GuestServiceNotFound(id)
}

pub fn reservation_service_not_found(id: Uuid) -> DomainError {
    DomainError::ReservationServiceNotFound(id)
}

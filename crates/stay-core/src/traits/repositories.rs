//! Repository traits (ports) - define the interface for data access
//!
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::entities::{
    CleaningTask, CleaningTaskStatus, GuestService, Message, MessageDelivery, MessageRule,
    MessageTemplate, MessageThread, Property, Reservation, ReservationDetails, ReservationService,
    ReservationStatus, RoomType, RoomUnit, ScheduledMessage, SenderRole, UserProfile, UserRole,
};
use crate::error::DomainError;

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

/// Offset pagination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: i64,
    pub offset: i64,
}

impl PageRequest {
    pub const DEFAULT_LIMIT: i64 = 50;
    pub const MAX_LIMIT: i64 = 200;

    /// Clamp limit to `1..=MAX_LIMIT` and offset to non-negative
    pub fn new(limit: i64, offset: i64) -> Self {
        Self {
            limit: limit.clamp(1, Self::MAX_LIMIT),
            offset: offset.max(0),
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(Self::DEFAULT_LIMIT, 0)
    }
}

// ============================================================================
// Property Repository
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct PropertyFilter {
    /// Restrict to properties owned by this user
    pub owner_id: Option<Uuid>,
    pub include_inactive: bool,
}

#[async_trait]
pub trait PropertyRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Property>>;

    /// Find by the channel manager's property id
    async fn find_by_beds24_id(&self, beds24_property_id: i64) -> RepoResult<Option<Property>>;

    async fn list(&self, filter: &PropertyFilter, page: PageRequest) -> RepoResult<Vec<Property>>;

    async fn create(&self, property: &Property) -> RepoResult<()>;

    async fn update(&self, property: &Property) -> RepoResult<()>;

    /// Soft delete (`is_active = false`)
    async fn deactivate(&self, id: Uuid) -> RepoResult<()>;
}

// ============================================================================
// Room Type / Room Unit Repositories
// ============================================================================

#[async_trait]
pub trait RoomTypeRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<RoomType>>;

    /// Find by the channel manager's room id
    async fn find_by_beds24_id(&self, beds24_room_id: i64) -> RepoResult<Option<RoomType>>;

    async fn list_by_property(
        &self,
        property_id: Uuid,
        include_inactive: bool,
    ) -> RepoResult<Vec<RoomType>>;

    async fn create(&self, room_type: &RoomType) -> RepoResult<()>;

    async fn update(&self, room_type: &RoomType) -> RepoResult<()>;

    /// Soft delete (`is_active = false`)
    async fn deactivate(&self, id: Uuid) -> RepoResult<()>;
}

#[async_trait]
pub trait RoomUnitRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<RoomUnit>>;

    async fn list_by_room_type(&self, room_type_id: Uuid) -> RepoResult<Vec<RoomUnit>>;

    /// Fails with `RoomUnitNumberTaken` when the number exists in the room type
    async fn create(&self, unit: &RoomUnit) -> RepoResult<()>;

    async fn update(&self, unit: &RoomUnit) -> RepoResult<()>;

    /// Hard delete
    async fn delete(&self, id: Uuid) -> RepoResult<()>;
}

// ============================================================================
// Reservation Repository
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct ReservationFilter {
    pub property_id: Option<Uuid>,
    /// Restrict to properties owned by this user
    pub owner_id: Option<Uuid>,
    pub status: Option<ReservationStatus>,
    pub arrival_from: Option<NaiveDate>,
    pub arrival_to: Option<NaiveDate>,
    /// Matches booking name, email or Beds24 id
    pub search: Option<String>,
}

/// Outcome of an idempotent upsert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upserted<T> {
    pub value: T,
    /// `true` when a new row was inserted
    pub created: bool,
}

#[async_trait]
pub trait ReservationRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Reservation>>;

    async fn find_by_guest_token(&self, token: &str) -> RepoResult<Option<Reservation>>;

    async fn find_by_beds24_id(&self, booking_id: i64) -> RepoResult<Option<Reservation>>;

    /// List with property/room names joined in
    async fn list(
        &self,
        filter: &ReservationFilter,
        page: PageRequest,
    ) -> RepoResult<Vec<ReservationDetails>>;

    async fn count(&self, filter: &ReservationFilter) -> RepoResult<i64>;

    async fn create(&self, reservation: &Reservation) -> RepoResult<()>;

    async fn update(&self, reservation: &Reservation) -> RepoResult<()>;

    /// Store the guest register, `checked_in_at` and status of a completed
    /// check-in without touching the booking fields. Only applies while the
    /// stored row is not checked in and not terminal; returns the updated
    /// row, or `None` when that no longer holds.
    async fn record_check_in(&self, reservation: &Reservation) -> RepoResult<Option<Reservation>>;

    /// Insert or update keyed on `beds24_booking_id`. Guest-submitted
    /// check-in data and the portal token are never overwritten.
    async fn upsert_by_beds24_id(&self, reservation: &Reservation)
        -> RepoResult<Upserted<Reservation>>;
}

// ============================================================================
// Cleaning Task Repository
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct CleaningTaskFilter {
    pub property_id: Option<Uuid>,
    pub owner_id: Option<Uuid>,
    pub cleaner_id: Option<Uuid>,
    pub status: Option<CleaningTaskStatus>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

#[async_trait]
pub trait CleaningTaskRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<CleaningTask>>;

    async fn find_by_reservation(&self, reservation_id: Uuid) -> RepoResult<Vec<CleaningTask>>;

    async fn list(
        &self,
        filter: &CleaningTaskFilter,
        page: PageRequest,
    ) -> RepoResult<Vec<CleaningTask>>;

    async fn create(&self, task: &CleaningTask) -> RepoResult<()>;

    async fn update(&self, task: &CleaningTask) -> RepoResult<()>;

    /// Hard delete
    async fn delete(&self, id: Uuid) -> RepoResult<()>;
}

// ============================================================================
// User Repository
// ============================================================================

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<UserProfile>>;

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<UserProfile>>;

    async fn list(
        &self,
        role: Option<UserRole>,
        include_inactive: bool,
        page: PageRequest,
    ) -> RepoResult<Vec<UserProfile>>;

    async fn create(&self, user: &UserProfile) -> RepoResult<()>;

    async fn update(&self, user: &UserProfile) -> RepoResult<()>;

    /// Soft delete (`is_active = false`)
    async fn deactivate(&self, id: Uuid) -> RepoResult<()>;
}

// ============================================================================
// Automation Repositories
// ============================================================================

#[async_trait]
pub trait MessageRuleRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<MessageRule>>;

    async fn list_by_property(&self, property_id: Uuid, active_only: bool)
        -> RepoResult<Vec<MessageRule>>;

    async fn create(&self, rule: &MessageRule) -> RepoResult<()>;

    async fn update(&self, rule: &MessageRule) -> RepoResult<()>;

    async fn delete(&self, id: Uuid) -> RepoResult<()>;
}

#[async_trait]
pub trait MessageTemplateRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<MessageTemplate>>;

    /// Templates of a property plus the shared ones; all when `None`
    async fn list(&self, property_id: Option<Uuid>) -> RepoResult<Vec<MessageTemplate>>;

    async fn create(&self, template: &MessageTemplate) -> RepoResult<()>;

    async fn update(&self, template: &MessageTemplate) -> RepoResult<()>;

    async fn delete(&self, id: Uuid) -> RepoResult<()>;
}

#[async_trait]
pub trait ScheduledMessageRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<ScheduledMessage>>;

    async fn list_by_reservation(&self, reservation_id: Uuid) -> RepoResult<Vec<ScheduledMessage>>;

    async fn insert_many(&self, messages: &[ScheduledMessage]) -> RepoResult<()>;

    /// Cancel every pending row of a reservation; returns the number cancelled
    async fn cancel_pending_for_reservation(&self, reservation_id: Uuid) -> RepoResult<u64>;

    /// Cancel every pending row created from a rule
    async fn cancel_pending_for_rule(&self, rule_id: Uuid) -> RepoResult<u64>;

    /// Cancel one pending row
    async fn cancel(&self, id: Uuid) -> RepoResult<()>;

    /// Lease up to `limit` due rows for `lease_secs`; concurrent workers never
    /// receive the same row while its lease is live
    async fn claim_due(
        &self,
        now: DateTime<Utc>,
        limit: i64,
        lease_secs: i64,
    ) -> RepoResult<Vec<ScheduledMessage>>;

    async fn mark_sent(&self, id: Uuid, message_id: Uuid, sent_at: DateTime<Utc>)
        -> RepoResult<()>;

    async fn mark_skipped(&self, id: Uuid, reason: &str) -> RepoResult<()>;

    /// Record a failed attempt; `give_up` leaves the row as `failed`,
    /// otherwise it stays pending for the next pass
    async fn mark_failed(&self, id: Uuid, error: &str, give_up: bool) -> RepoResult<()>;
}

// ============================================================================
// Chat Repositories
// ============================================================================

/// Keyset pagination for thread history
#[derive(Debug, Clone, Default)]
pub struct MessageQuery {
    pub before: Option<DateTime<Utc>>,
    pub limit: i64,
}

#[async_trait]
pub trait MessageThreadRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<MessageThread>>;

    async fn find_by_reservation(&self, reservation_id: Uuid) -> RepoResult<Option<MessageThread>>;

    /// Idempotent: one thread per reservation
    async fn get_or_create(&self, reservation_id: Uuid, property_id: Uuid)
        -> RepoResult<MessageThread>;

    /// Threads of a property, most recent activity first
    async fn list_by_property(&self, property_id: Uuid, page: PageRequest)
        -> RepoResult<Vec<MessageThread>>;

    async fn touch(&self, id: Uuid, at: DateTime<Utc>) -> RepoResult<()>;
}

#[async_trait]
pub trait MessageRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Message>>;

    /// Oldest first
    async fn list_by_thread(&self, thread_id: Uuid, query: MessageQuery)
        -> RepoResult<Vec<Message>>;

    async fn create(&self, message: &Message) -> RepoResult<()>;

    /// Mark unread messages not written by `reader` as read; returns updated rows
    async fn mark_read(
        &self,
        thread_id: Uuid,
        reader: SenderRole,
        at: DateTime<Utc>,
    ) -> RepoResult<Vec<Message>>;
}

#[async_trait]
pub trait MessageDeliveryRepository: Send + Sync {
    async fn create(&self, delivery: &MessageDelivery) -> RepoResult<()>;

    async fn list_by_message(&self, message_id: Uuid) -> RepoResult<Vec<MessageDelivery>>;
}

// ============================================================================
// Guest Service Repositories
// ============================================================================

#[async_trait]
pub trait GuestServiceRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<GuestService>>;

    async fn list_by_property(&self, property_id: Uuid, active_only: bool)
        -> RepoResult<Vec<GuestService>>;

    async fn create(&self, service: &GuestService) -> RepoResult<()>;

    async fn update(&self, service: &GuestService) -> RepoResult<()>;

    /// Soft delete (`is_active = false`)
    async fn deactivate(&self, id: Uuid) -> RepoResult<()>;
}

#[async_trait]
pub trait ReservationServiceRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<ReservationService>>;

    async fn list_by_reservation(&self, reservation_id: Uuid)
        -> RepoResult<Vec<ReservationService>>;

    /// Insert unless the reservation already has this catalog service;
    /// returns whether a row was inserted
    async fn attach(&self, item: &ReservationService) -> RepoResult<bool>;

    async fn update(&self, item: &ReservationService) -> RepoResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_request_clamps() {
        assert_eq!(PageRequest::new(0, -5), PageRequest { limit: 1, offset: 0 });
        assert_eq!(PageRequest::new(1000, 10).limit, PageRequest::MAX_LIMIT);
        assert_eq!(PageRequest::default().limit, PageRequest::DEFAULT_LIMIT);
    }
}

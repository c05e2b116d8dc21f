//! # stay-core
//!
//! Domain layer: entities, message-automation timing, the room access
//! gate, guest chat reconciliation, and repository traits.
//! This crate has zero dependencies on infrastructure (database, web framework, etc.).

pub mod access;
pub mod automation;
pub mod chat;
pub mod entities;
pub mod error;
pub mod events;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use access::{AccessGate, AccessState, LockReason};
pub use automation::{compute_run_at, plan, ReservationTimeline, SchedulePlan};
pub use entities::{
    BackfillPolicy, CleaningTask, CleaningTaskStatus, DeliveryChannel, DeliveryStatus,
    GuestRegistration, GuestService, Message, MessageDelivery, MessageRule, MessageTemplate,
    MessageThread, Property, Reservation, ReservationDetails, ReservationService,
    ReservationStatus, RoomType, RoomUnit, RuleType, ScheduledMessage, ScheduledMessageStatus,
    SenderRole, ServicePaymentStatus, TemplateContext, UserProfile, UserRole, WifiCredentials,
};
pub use error::{DomainError, DomainResult};
pub use events::{MessageEvent, MessageRecord};
pub use traits::{
    CleaningTaskFilter, CleaningTaskRepository, GuestServiceRepository, MessageDeliveryRepository,
    MessageQuery, MessageRepository, MessageRuleRepository, MessageTemplateRepository,
    MessageThreadRepository, PageRequest, PropertyFilter, PropertyRepository, RepoResult,
    ReservationFilter, ReservationRepository, ReservationServiceRepository, RoomTypeRepository,
    RoomUnitRepository, ScheduledMessageRepository, Upserted, UserRepository,
};
pub use value_objects::{Capabilities, GuestToken};

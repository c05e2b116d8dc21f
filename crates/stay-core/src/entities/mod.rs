//! Domain entities - core business objects

mod cleaning_task;
mod guest_service;
mod message;
mod message_rule;
mod property;
mod reservation;
mod room;
mod scheduled_message;
mod user;

pub use cleaning_task::{CleaningTask, CleaningTaskStatus};
pub use guest_service::{GuestService, ReservationService, ServicePaymentStatus};
pub use message::{
    DeliveryChannel, DeliveryStatus, Message, MessageDelivery, MessageThread, SenderRole,
    MAX_MESSAGE_LENGTH,
};
pub use message_rule::{
    BackfillPolicy, MessageRule, MessageTemplate, RuleType, TemplateContext, MAX_RULE_DAYS,
    MAX_RULE_DELAY_MINUTES, MAX_RULE_HOURS,
};
pub use property::{default_check_in_time, default_departure_time, Property};
pub use reservation::{GuestRegistration, Reservation, ReservationDetails, ReservationStatus};
pub use room::{RoomType, RoomUnit, WifiCredentials};
pub use scheduled_message::{ScheduledMessage, ScheduledMessageStatus};
pub use user::{UserProfile, UserRole};

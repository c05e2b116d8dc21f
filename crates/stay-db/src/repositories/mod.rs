//! Repository implementations
//!
//! PostgreSQL implementations of the repository traits defined in stay-core.
//! Each repository handles database operations for a specific domain entity.

mod cleaning_task;
mod error;
mod guest_service;
mod message;
mod message_delivery;
mod message_rule;
mod message_template;
mod message_thread;
mod property;
mod reservation;
mod reservation_service;
mod room_type;
mod room_unit;
mod scheduled_message;
mod user;

pub use cleaning_task::PgCleaningTaskRepository;
pub use error::{is_undefined_table, map_db_error, map_unique_violation};
pub use guest_service::PgGuestServiceRepository;
pub use message::PgMessageRepository;
pub use message_delivery::PgMessageDeliveryRepository;
pub use message_rule::PgMessageRuleRepository;
pub use message_template::PgMessageTemplateRepository;
pub use message_thread::PgMessageThreadRepository;
pub use property::PgPropertyRepository;
pub use reservation::PgReservationRepository;
pub use reservation_service::PgReservationServiceRepository;
pub use room_type::PgRoomTypeRepository;
pub use room_unit::PgRoomUnitRepository;
pub use scheduled_message::PgScheduledMessageRepository;
pub use user::PgUserRepository;

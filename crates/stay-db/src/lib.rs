//! # stay-db
//!
//! Database layer implementing repository traits with PostgreSQL via SQLx.
//!
//! ## Overview
//!
//! This crate provides PostgreSQL implementations for all repository traits
//! defined in `stay-core`. It handles:
//!
//! - Connection pool management
//! - Database models with SQLx `FromRow` derives
//! - Model → entity mappers
//! - Repository implementations
//!
//! The schema itself is managed outside this workspace; queries target the
//! tables `properties`, `room_types`, `room_units`, `reservations` (plus the
//! optional `reservation_details` view), `cleaning_tasks`, `user_profiles`,
//! `message_rules`, `message_templates`, `scheduled_messages`,
//! `message_threads`, `messages`, `message_deliveries`, `guest_services` and
//! `reservation_services`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stay_db::pool::{create_pool, DatabaseConfig};
//! use stay_db::repositories::PgPropertyRepository;
//! use stay_core::traits::PropertyRepository;
//!
//! async fn example(settings: &stay_common::DatabaseSettings) -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = create_pool(&DatabaseConfig::from(settings)).await?;
//!     let property_repo = PgPropertyRepository::new(pool);
//!
//!     // Use the repository...
//!     Ok(())
//! }
//! ```

pub mod mappers;
pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use pool::{create_pool, ping, DatabaseConfig, PgPool};
pub use repositories::{
    PgCleaningTaskRepository, PgGuestServiceRepository, PgMessageDeliveryRepository,
    PgMessageRepository, PgMessageRuleRepository, PgMessageTemplateRepository,
    PgMessageThreadRepository, PgPropertyRepository, PgReservationRepository,
    PgReservationServiceRepository, PgRoomTypeRepository, PgRoomUnitRepository,
    PgScheduledMessageRepository, PgUserRepository,
};

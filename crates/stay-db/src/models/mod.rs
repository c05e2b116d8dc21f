//! Database models - SQLx-compatible structs for PostgreSQL tables

mod automation;
mod cleaning_task;
mod guest_service;
mod messaging;
mod property;
mod reservation;
mod room;
mod user;

pub use automation::{MessageRuleModel, MessageTemplateModel, ScheduledMessageModel};
pub use cleaning_task::CleaningTaskModel;
pub use guest_service::{GuestServiceModel, ReservationServiceModel};
pub use messaging::{MessageDeliveryModel, MessageModel, MessageThreadModel};
pub use property::PropertyModel;
pub use reservation::{ReservationDetailsModel, ReservationModel, ReservationUpsertModel};
pub use room::{RoomTypeModel, RoomUnitModel};
pub use user::UserProfileModel;

//! Business logic services
//!
//! This module contains all service layer implementations that handle
//! business logic, validation, and orchestration of domain operations.

pub mod automation;
pub mod beds24;
pub mod cleaning_task;
pub mod context;
pub mod error;
pub mod guest_portal;
pub mod guest_service;
pub mod messaging;
pub mod permission;
pub mod property;
pub mod reservation;
pub mod room;
pub mod user;

// Re-export all services for convenience
pub use automation::AutomationService;
pub use beds24::Beds24Service;
pub use cleaning_task::CleaningTaskService;
pub use context::{ServiceContext, ServiceContextBuilder};
pub use error::{ServiceError, ServiceResult};
pub use guest_portal::{GuestPortalService, GuestStay};
pub use guest_service::GuestServiceCatalogService;
pub use messaging::MessagingService;
pub use permission::{Actor, PermissionService};
pub use property::PropertyService;
pub use reservation::ReservationService;
pub use room::{RoomTypeService, RoomUnitService};
pub use user::UserService;

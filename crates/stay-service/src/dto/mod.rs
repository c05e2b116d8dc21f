//! Data transfer objects for API requests and responses
//!
//! This module provides:
//! - Request DTOs with validation for API inputs
//! - Response DTOs for serializing API outputs
//! - Mappers for converting domain entities to DTOs

pub mod mappers;
pub mod requests;
pub mod responses;

pub use requests::{
    parse_clock_time, AssignCleanerRequest, AttachServiceRequest, Beds24Booking,
    Beds24WebhookPayload, CheckInRequest, CleaningTaskListQuery, CreateCleaningTaskRequest,
    CreateGuestServiceRequest, CreateMessageRuleRequest, CreateMessageTemplateRequest,
    CreatePropertyRequest, CreateReservationRequest, CreateRoomTypeRequest, CreateRoomUnitRequest,
    CreateUserRequest, ExemptServiceRequest, MarkPaidRequest, MessageListQuery,
    PostMessageRequest, PropertyListQuery, ReservationListQuery, TemplateListQuery,
    UpdateCleaningStatusRequest, UpdateCleaningTaskRequest, UpdateGuestServiceRequest,
    UpdateMessageRuleRequest, UpdateMessageTemplateRequest, UpdatePropertyRequest,
    UpdateReservationRequest, UpdateReservationStatusRequest, UpdateRoomTypeRequest,
    UpdateRoomUnitRequest, UpdateUserRequest, UserListQuery,
};

pub use responses::{
    AccessResponse, ApiResponse, Beds24WebhookResponse, CleaningTaskResponse,
    GuestPortalResponse, GuestPropertyView, GuestRegistrationResponse, GuestReservationView,
    GuestServiceResponse, HealthChecks, HealthResponse, MarkReadResponse,
    MessageDeliveryResponse, MessageResponse, MessageRuleResponse, MessageTemplateResponse,
    PaginatedResponse, PaginationMeta, PlanSummaryResponse, PropertyResponse,
    ReadinessResponse, ReservationResponse, ReservationServiceResponse, RoomTypeResponse,
    RoomUnitResponse, ScheduledMessageResponse, ThreadResponse, UserResponse,
};

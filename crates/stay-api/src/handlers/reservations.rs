//! Reservation handlers

use axum::{extract::State, Json};
use stay_service::dto::{
    CreateReservationRequest, PaginatedResponse, ReservationListQuery, ReservationResponse,
    UpdateReservationRequest, UpdateReservationStatusRequest,
};
use stay_service::services::ReservationService;
use uuid::Uuid;

use crate::extractors::{AdminUser, IdPath, JsonBody, Pagination, QueryParams, ValidatedJson};
use crate::response::{ApiResult, Created, NoContent};
use crate::state::AppState;

/// List reservations with filters
///
/// GET /api/admin/reservations?propertyId=&status=&arrivalFrom=&arrivalTo=&search=
pub async fn list_reservations(
    State(state): State<AppState>,
    admin: AdminUser,
    QueryParams(query): QueryParams<ReservationListQuery>,
    pagination: Pagination,
) -> ApiResult<Json<PaginatedResponse<ReservationResponse>>> {
    let service = ReservationService::new(state.service_context());
    let page = service.list(admin.actor(), query, pagination.page()).await?;
    Ok(Json(page))
}

/// GET /api/admin/reservations/{id}
pub async fn get_reservation(
    State(state): State<AppState>,
    admin: AdminUser,
    IdPath(reservation_id): IdPath<Uuid>,
) -> ApiResult<Json<ReservationResponse>> {
    let service = ReservationService::new(state.service_context());
    Ok(Json(service.get(admin.actor(), reservation_id).await?))
}

/// Create a direct booking; mandatory services are attached and messages
/// planned
///
/// POST /api/admin/reservations
pub async fn create_reservation(
    State(state): State<AppState>,
    admin: AdminUser,
    ValidatedJson(request): ValidatedJson<CreateReservationRequest>,
) -> ApiResult<Created<Json<ReservationResponse>>> {
    let service = ReservationService::new(state.service_context());
    let reservation = service.create(admin.actor(), request).await?;
    Ok(Created(Json(reservation)))
}

/// PATCH /api/admin/reservations/{id}
pub async fn update_reservation(
    State(state): State<AppState>,
    admin: AdminUser,
    IdPath(reservation_id): IdPath<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateReservationRequest>,
) -> ApiResult<Json<ReservationResponse>> {
    let service = ReservationService::new(state.service_context());
    Ok(Json(service.update(admin.actor(), reservation_id, request).await?))
}

/// Move a reservation through its lifecycle
///
/// PUT /api/admin/reservations/{id}/status
pub async fn update_reservation_status(
    State(state): State<AppState>,
    admin: AdminUser,
    IdPath(reservation_id): IdPath<Uuid>,
    JsonBody(request): JsonBody<UpdateReservationStatusRequest>,
) -> ApiResult<Json<ReservationResponse>> {
    let service = ReservationService::new(state.service_context());
    let reservation = service
        .update_status(admin.actor(), reservation_id, request)
        .await?;
    Ok(Json(reservation))
}

/// POST /api/admin/reservations/{id}/cancel
pub async fn cancel_reservation(
    State(state): State<AppState>,
    admin: AdminUser,
    IdPath(reservation_id): IdPath<Uuid>,
) -> ApiResult<Json<ReservationResponse>> {
    let service = ReservationService::new(state.service_context());
    Ok(Json(service.cancel(admin.actor(), reservation_id).await?))
}

/// Reservations are never removed; this cancels
///
/// DELETE /api/admin/reservations/{id}
pub async fn delete_reservation(
    State(state): State<AppState>,
    admin: AdminUser,
    IdPath(reservation_id): IdPath<Uuid>,
) -> ApiResult<NoContent> {
    ReservationService::new(state.service_context())
        .delete(admin.actor(), reservation_id)
        .await?;
    Ok(NoContent)
}

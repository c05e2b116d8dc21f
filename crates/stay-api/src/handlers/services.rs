//! Guest service catalog and per-reservation service handlers

use axum::{extract::State, Json};
use serde::Deserialize;
use stay_service::dto::{
    AttachServiceRequest, CreateGuestServiceRequest, ExemptServiceRequest, GuestServiceResponse,
    MarkPaidRequest, ReservationServiceResponse, UpdateGuestServiceRequest,
};
use stay_service::services::GuestServiceCatalogService;
use uuid::Uuid;

use crate::extractors::{AdminUser, IdPath, JsonBody, QueryParams, ValidatedJson};
use crate::response::{ApiResult, Created, NoContent};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogQuery {
    #[serde(default)]
    pub include_inactive: bool,
}

// ============================================================================
// Catalog
// ============================================================================

/// GET /api/admin/properties/{id}/services
pub async fn list_services(
    State(state): State<AppState>,
    admin: AdminUser,
    IdPath(property_id): IdPath<Uuid>,
    QueryParams(query): QueryParams<CatalogQuery>,
) -> ApiResult<Json<Vec<GuestServiceResponse>>> {
    let service = GuestServiceCatalogService::new(state.service_context());
    let items = service
        .list(admin.actor(), property_id, query.include_inactive)
        .await?;
    Ok(Json(items))
}

/// POST /api/admin/properties/{id}/services
pub async fn create_service(
    State(state): State<AppState>,
    admin: AdminUser,
    IdPath(property_id): IdPath<Uuid>,
    ValidatedJson(request): ValidatedJson<CreateGuestServiceRequest>,
) -> ApiResult<Created<Json<GuestServiceResponse>>> {
    let service = GuestServiceCatalogService::new(state.service_context());
    let item = service.create(admin.actor(), property_id, request).await?;
    Ok(Created(Json(item)))
}

/// GET /api/admin/services/{id}
pub async fn get_service(
    State(state): State<AppState>,
    admin: AdminUser,
    IdPath(service_id): IdPath<Uuid>,
) -> ApiResult<Json<GuestServiceResponse>> {
    let service = GuestServiceCatalogService::new(state.service_context());
    Ok(Json(service.get(admin.actor(), service_id).await?))
}

/// PATCH /api/admin/services/{id}
pub async fn update_service(
    State(state): State<AppState>,
    admin: AdminUser,
    IdPath(service_id): IdPath<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateGuestServiceRequest>,
) -> ApiResult<Json<GuestServiceResponse>> {
    let service = GuestServiceCatalogService::new(state.service_context());
    Ok(Json(service.update(admin.actor(), service_id, request).await?))
}

/// Deactivate a catalog entry; attached items keep their price snapshot
///
/// DELETE /api/admin/services/{id}
pub async fn delete_service(
    State(state): State<AppState>,
    admin: AdminUser,
    IdPath(service_id): IdPath<Uuid>,
) -> ApiResult<NoContent> {
    GuestServiceCatalogService::new(state.service_context())
        .delete(admin.actor(), service_id)
        .await?;
    Ok(NoContent)
}

// ============================================================================
// Reservation services
// ============================================================================

/// GET /api/admin/reservations/{id}/services
pub async fn list_reservation_services(
    State(state): State<AppState>,
    admin: AdminUser,
    IdPath(reservation_id): IdPath<Uuid>,
) -> ApiResult<Json<Vec<ReservationServiceResponse>>> {
    let service = GuestServiceCatalogService::new(state.service_context());
    Ok(Json(service.list_for_reservation(admin.actor(), reservation_id).await?))
}

/// POST /api/admin/reservations/{id}/services
pub async fn attach_service(
    State(state): State<AppState>,
    admin: AdminUser,
    IdPath(reservation_id): IdPath<Uuid>,
    JsonBody(request): JsonBody<AttachServiceRequest>,
) -> ApiResult<Created<Json<ReservationServiceResponse>>> {
    let service = GuestServiceCatalogService::new(state.service_context());
    let item = service.attach(admin.actor(), reservation_id, request).await?;
    Ok(Created(Json(item)))
}

/// POST /api/admin/reservation-services/{id}/paid
pub async fn mark_paid(
    State(state): State<AppState>,
    admin: AdminUser,
    IdPath(item_id): IdPath<Uuid>,
    ValidatedJson(request): ValidatedJson<MarkPaidRequest>,
) -> ApiResult<Json<ReservationServiceResponse>> {
    let service = GuestServiceCatalogService::new(state.service_context());
    Ok(Json(service.mark_paid(admin.actor(), item_id, request).await?))
}

/// POST /api/admin/reservation-services/{id}/exempt
pub async fn exempt(
    State(state): State<AppState>,
    admin: AdminUser,
    IdPath(item_id): IdPath<Uuid>,
    ValidatedJson(request): ValidatedJson<ExemptServiceRequest>,
) -> ApiResult<Json<ReservationServiceResponse>> {
    let service = GuestServiceCatalogService::new(state.service_context());
    Ok(Json(service.exempt(admin.actor(), item_id, request).await?))
}

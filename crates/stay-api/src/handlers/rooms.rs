//! Room type and room unit handlers

use axum::{extract::State, Json};
use serde::Deserialize;
use stay_service::dto::{
    CreateRoomTypeRequest, CreateRoomUnitRequest, RoomTypeResponse, RoomUnitResponse,
    UpdateRoomTypeRequest, UpdateRoomUnitRequest,
};
use stay_service::services::{RoomTypeService, RoomUnitService};
use uuid::Uuid;

use crate::extractors::{AdminUser, IdPath, QueryParams, ValidatedJson};
use crate::response::{ApiResult, Created, NoContent};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomTypeListQuery {
    #[serde(default)]
    pub include_inactive: bool,
}

// ============================================================================
// Room types
// ============================================================================

/// GET /api/admin/properties/{id}/room-types
pub async fn list_room_types(
    State(state): State<AppState>,
    admin: AdminUser,
    IdPath(property_id): IdPath<Uuid>,
    QueryParams(query): QueryParams<RoomTypeListQuery>,
) -> ApiResult<Json<Vec<RoomTypeResponse>>> {
    let service = RoomTypeService::new(state.service_context());
    let room_types = service
        .list_by_property(admin.actor(), property_id, query.include_inactive)
        .await?;
    Ok(Json(room_types))
}

/// POST /api/admin/properties/{id}/room-types
pub async fn create_room_type(
    State(state): State<AppState>,
    admin: AdminUser,
    IdPath(property_id): IdPath<Uuid>,
    ValidatedJson(request): ValidatedJson<CreateRoomTypeRequest>,
) -> ApiResult<Created<Json<RoomTypeResponse>>> {
    let service = RoomTypeService::new(state.service_context());
    let room_type = service.create(admin.actor(), property_id, request).await?;
    Ok(Created(Json(room_type)))
}

/// GET /api/admin/room-types/{id}
pub async fn get_room_type(
    State(state): State<AppState>,
    admin: AdminUser,
    IdPath(room_type_id): IdPath<Uuid>,
) -> ApiResult<Json<RoomTypeResponse>> {
    let service = RoomTypeService::new(state.service_context());
    Ok(Json(service.get(admin.actor(), room_type_id).await?))
}

/// PATCH /api/admin/room-types/{id}
pub async fn update_room_type(
    State(state): State<AppState>,
    admin: AdminUser,
    IdPath(room_type_id): IdPath<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateRoomTypeRequest>,
) -> ApiResult<Json<RoomTypeResponse>> {
    let service = RoomTypeService::new(state.service_context());
    Ok(Json(service.update(admin.actor(), room_type_id, request).await?))
}

/// DELETE /api/admin/room-types/{id}
pub async fn delete_room_type(
    State(state): State<AppState>,
    admin: AdminUser,
    IdPath(room_type_id): IdPath<Uuid>,
) -> ApiResult<NoContent> {
    RoomTypeService::new(state.service_context())
        .delete(admin.actor(), room_type_id)
        .await?;
    Ok(NoContent)
}

// ============================================================================
// Room units
// ============================================================================

/// GET /api/admin/room-types/{id}/units
pub async fn list_room_units(
    State(state): State<AppState>,
    admin: AdminUser,
    IdPath(room_type_id): IdPath<Uuid>,
) -> ApiResult<Json<Vec<RoomUnitResponse>>> {
    let service = RoomUnitService::new(state.service_context());
    Ok(Json(service.list_by_room_type(admin.actor(), room_type_id).await?))
}

/// POST /api/admin/room-types/{id}/units
pub async fn create_room_unit(
    State(state): State<AppState>,
    admin: AdminUser,
    IdPath(room_type_id): IdPath<Uuid>,
    ValidatedJson(request): ValidatedJson<CreateRoomUnitRequest>,
) -> ApiResult<Created<Json<RoomUnitResponse>>> {
    let service = RoomUnitService::new(state.service_context());
    let unit = service.create(admin.actor(), room_type_id, request).await?;
    Ok(Created(Json(unit)))
}

/// GET /api/admin/room-units/{id}
pub async fn get_room_unit(
    State(state): State<AppState>,
    admin: AdminUser,
    IdPath(unit_id): IdPath<Uuid>,
) -> ApiResult<Json<RoomUnitResponse>> {
    let service = RoomUnitService::new(state.service_context());
    Ok(Json(service.get(admin.actor(), unit_id).await?))
}

/// PATCH /api/admin/room-units/{id}
pub async fn update_room_unit(
    State(state): State<AppState>,
    admin: AdminUser,
    IdPath(unit_id): IdPath<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateRoomUnitRequest>,
) -> ApiResult<Json<RoomUnitResponse>> {
    let service = RoomUnitService::new(state.service_context());
    Ok(Json(service.update(admin.actor(), unit_id, request).await?))
}

/// DELETE /api/admin/room-units/{id}
pub async fn delete_room_unit(
    State(state): State<AppState>,
    admin: AdminUser,
    IdPath(unit_id): IdPath<Uuid>,
) -> ApiResult<NoContent> {
    RoomUnitService::new(state.service_context())
        .delete(admin.actor(), unit_id)
        .await?;
    Ok(NoContent)
}

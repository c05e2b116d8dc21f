//! Property handlers

use axum::{extract::State, Json};
use stay_service::dto::{
    CreatePropertyRequest, PropertyListQuery, PropertyResponse, UpdatePropertyRequest,
};
use stay_service::services::PropertyService;
use uuid::Uuid;

use crate::extractors::{AdminUser, IdPath, Pagination, QueryParams, ValidatedJson};
use crate::response::{ApiResult, Created, NoContent};
use crate::state::AppState;

/// List properties visible to the caller
///
/// GET /api/admin/properties
pub async fn list_properties(
    State(state): State<AppState>,
    admin: AdminUser,
    QueryParams(query): QueryParams<PropertyListQuery>,
    pagination: Pagination,
) -> ApiResult<Json<Vec<PropertyResponse>>> {
    let service = PropertyService::new(state.service_context());
    let properties = service.list(admin.actor(), &query, pagination.page()).await?;
    Ok(Json(properties))
}

/// GET /api/admin/properties/{id}
pub async fn get_property(
    State(state): State<AppState>,
    admin: AdminUser,
    IdPath(property_id): IdPath<Uuid>,
) -> ApiResult<Json<PropertyResponse>> {
    let service = PropertyService::new(state.service_context());
    Ok(Json(service.get(admin.actor(), property_id).await?))
}

/// POST /api/admin/properties
pub async fn create_property(
    State(state): State<AppState>,
    admin: AdminUser,
    ValidatedJson(request): ValidatedJson<CreatePropertyRequest>,
) -> ApiResult<Created<Json<PropertyResponse>>> {
    let service = PropertyService::new(state.service_context());
    let property = service.create(admin.actor(), request).await?;
    Ok(Created(Json(property)))
}

/// PATCH /api/admin/properties/{id}
pub async fn update_property(
    State(state): State<AppState>,
    admin: AdminUser,
    IdPath(property_id): IdPath<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdatePropertyRequest>,
) -> ApiResult<Json<PropertyResponse>> {
    let service = PropertyService::new(state.service_context());
    Ok(Json(service.update(admin.actor(), property_id, request).await?))
}

/// Deactivate a property
///
/// DELETE /api/admin/properties/{id}
pub async fn delete_property(
    State(state): State<AppState>,
    admin: AdminUser,
    IdPath(property_id): IdPath<Uuid>,
) -> ApiResult<NoContent> {
    PropertyService::new(state.service_context())
        .delete(admin.actor(), property_id)
        .await?;
    Ok(NoContent)
}

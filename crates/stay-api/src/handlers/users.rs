//! Staff user handlers

use axum::{extract::State, Json};
use stay_service::dto::{CreateUserRequest, UpdateUserRequest, UserListQuery, UserResponse};
use stay_service::services::UserService;
use uuid::Uuid;

use crate::extractors::{AdminUser, IdPath, Pagination, QueryParams, ValidatedJson};
use crate::response::{ApiResult, Created, NoContent};
use crate::state::AppState;

/// Profile of the caller
///
/// GET /api/admin/me
pub async fn get_current_user(
    State(state): State<AppState>,
    admin: AdminUser,
) -> ApiResult<Json<UserResponse>> {
    let service = UserService::new(state.service_context());
    Ok(Json(service.me(admin.actor()).await?))
}

/// GET /api/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    admin: AdminUser,
    QueryParams(query): QueryParams<UserListQuery>,
    pagination: Pagination,
) -> ApiResult<Json<Vec<UserResponse>>> {
    let service = UserService::new(state.service_context());
    Ok(Json(service.list(admin.actor(), query, pagination.page()).await?))
}

/// GET /api/admin/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    admin: AdminUser,
    IdPath(user_id): IdPath<Uuid>,
) -> ApiResult<Json<UserResponse>> {
    let service = UserService::new(state.service_context());
    Ok(Json(service.get(admin.actor(), user_id).await?))
}

/// Create the profile for an account that exists at the auth provider
///
/// POST /api/admin/users
pub async fn create_user(
    State(state): State<AppState>,
    admin: AdminUser,
    ValidatedJson(request): ValidatedJson<CreateUserRequest>,
) -> ApiResult<Created<Json<UserResponse>>> {
    let service = UserService::new(state.service_context());
    let user = service.create(admin.actor(), request).await?;
    Ok(Created(Json(user)))
}

/// PATCH /api/admin/users/{id}
pub async fn update_user(
    State(state): State<AppState>,
    admin: AdminUser,
    IdPath(user_id): IdPath<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateUserRequest>,
) -> ApiResult<Json<UserResponse>> {
    let service = UserService::new(state.service_context());
    Ok(Json(service.update(admin.actor(), user_id, request).await?))
}

/// DELETE /api/admin/users/{id}
pub async fn delete_user(
    State(state): State<AppState>,
    admin: AdminUser,
    IdPath(user_id): IdPath<Uuid>,
) -> ApiResult<NoContent> {
    UserService::new(state.service_context())
        .delete(admin.actor(), user_id)
        .await?;
    Ok(NoContent)
}

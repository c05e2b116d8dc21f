//! Cleaning task handlers
//!
//! Managers see every task of their properties; cleaners only their own.

use axum::{extract::State, Json};
use stay_service::dto::{
    AssignCleanerRequest, CleaningTaskListQuery, CleaningTaskResponse, CreateCleaningTaskRequest,
    UpdateCleaningStatusRequest, UpdateCleaningTaskRequest,
};
use stay_service::services::CleaningTaskService;
use uuid::Uuid;

use crate::extractors::{AdminUser, IdPath, JsonBody, Pagination, QueryParams, ValidatedJson};
use crate::response::{ApiResult, Created, NoContent};
use crate::state::AppState;

/// GET /api/admin/cleaning-tasks
pub async fn list_tasks(
    State(state): State<AppState>,
    admin: AdminUser,
    QueryParams(query): QueryParams<CleaningTaskListQuery>,
    pagination: Pagination,
) -> ApiResult<Json<Vec<CleaningTaskResponse>>> {
    let service = CleaningTaskService::new(state.service_context());
    let tasks = service.list(admin.actor(), query, pagination.page()).await?;
    Ok(Json(tasks))
}

/// GET /api/admin/cleaning-tasks/{id}
pub async fn get_task(
    State(state): State<AppState>,
    admin: AdminUser,
    IdPath(task_id): IdPath<Uuid>,
) -> ApiResult<Json<CleaningTaskResponse>> {
    let service = CleaningTaskService::new(state.service_context());
    Ok(Json(service.get(admin.actor(), task_id).await?))
}

/// POST /api/admin/cleaning-tasks
pub async fn create_task(
    State(state): State<AppState>,
    admin: AdminUser,
    ValidatedJson(request): ValidatedJson<CreateCleaningTaskRequest>,
) -> ApiResult<Created<Json<CleaningTaskResponse>>> {
    let service = CleaningTaskService::new(state.service_context());
    let task = service.create(admin.actor(), request).await?;
    Ok(Created(Json(task)))
}

/// PATCH /api/admin/cleaning-tasks/{id}
pub async fn update_task(
    State(state): State<AppState>,
    admin: AdminUser,
    IdPath(task_id): IdPath<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateCleaningTaskRequest>,
) -> ApiResult<Json<CleaningTaskResponse>> {
    let service = CleaningTaskService::new(state.service_context());
    Ok(Json(service.update(admin.actor(), task_id, request).await?))
}

/// PUT /api/admin/cleaning-tasks/{id}/assign
pub async fn assign_task(
    State(state): State<AppState>,
    admin: AdminUser,
    IdPath(task_id): IdPath<Uuid>,
    JsonBody(request): JsonBody<AssignCleanerRequest>,
) -> ApiResult<Json<CleaningTaskResponse>> {
    let service = CleaningTaskService::new(state.service_context());
    Ok(Json(service.assign(admin.actor(), task_id, request).await?))
}

/// PUT /api/admin/cleaning-tasks/{id}/status
pub async fn update_task_status(
    State(state): State<AppState>,
    admin: AdminUser,
    IdPath(task_id): IdPath<Uuid>,
    JsonBody(request): JsonBody<UpdateCleaningStatusRequest>,
) -> ApiResult<Json<CleaningTaskResponse>> {
    let service = CleaningTaskService::new(state.service_context());
    Ok(Json(service.update_status(admin.actor(), task_id, request).await?))
}

/// DELETE /api/admin/cleaning-tasks/{id}
pub async fn delete_task(
    State(state): State<AppState>,
    admin: AdminUser,
    IdPath(task_id): IdPath<Uuid>,
) -> ApiResult<NoContent> {
    CleaningTaskService::new(state.service_context())
        .delete(admin.actor(), task_id)
        .await?;
    Ok(NoContent)
}

//! Host side of the guest chat

use axum::{extract::State, Json};
use stay_service::dto::{
    MarkReadResponse, MessageListQuery, MessageResponse, PostMessageRequest, ThreadResponse,
};
use stay_service::services::MessagingService;
use uuid::Uuid;

use crate::extractors::{AdminUser, IdPath, Pagination, QueryParams, ValidatedJson};
use crate::response::{ApiResult, Created};
use crate::state::AppState;

/// Threads of a property, most recent activity first
///
/// GET /api/admin/properties/{id}/threads
pub async fn list_threads(
    State(state): State<AppState>,
    admin: AdminUser,
    IdPath(property_id): IdPath<Uuid>,
    pagination: Pagination,
) -> ApiResult<Json<Vec<ThreadResponse>>> {
    let service = MessagingService::new(state.service_context());
    let threads = service
        .list_threads(admin.actor(), property_id, pagination.page())
        .await?;
    Ok(Json(threads))
}

/// Thread of a reservation, created on first access
///
/// GET /api/admin/reservations/{id}/thread
pub async fn reservation_thread(
    State(state): State<AppState>,
    admin: AdminUser,
    IdPath(reservation_id): IdPath<Uuid>,
) -> ApiResult<Json<ThreadResponse>> {
    let service = MessagingService::new(state.service_context());
    Ok(Json(service.reservation_thread(admin.actor(), reservation_id).await?))
}

/// GET /api/admin/threads/{id}/messages?before=&limit=
pub async fn list_messages(
    State(state): State<AppState>,
    admin: AdminUser,
    IdPath(thread_id): IdPath<Uuid>,
    QueryParams(query): QueryParams<MessageListQuery>,
) -> ApiResult<Json<Vec<MessageResponse>>> {
    let service = MessagingService::new(state.service_context());
    Ok(Json(service.list_messages(admin.actor(), thread_id, query).await?))
}

/// POST /api/admin/threads/{id}/messages
pub async fn post_message(
    State(state): State<AppState>,
    admin: AdminUser,
    IdPath(thread_id): IdPath<Uuid>,
    ValidatedJson(request): ValidatedJson<PostMessageRequest>,
) -> ApiResult<Created<Json<MessageResponse>>> {
    let service = MessagingService::new(state.service_context());
    let message = service.post_as_host(admin.actor(), thread_id, request).await?;
    Ok(Created(Json(message)))
}

/// Mark guest messages read
///
/// POST /api/admin/threads/{id}/read
pub async fn mark_read(
    State(state): State<AppState>,
    admin: AdminUser,
    IdPath(thread_id): IdPath<Uuid>,
) -> ApiResult<Json<MarkReadResponse>> {
    let service = MessagingService::new(state.service_context());
    Ok(Json(service.mark_read_as_host(admin.actor(), thread_id).await?))
}

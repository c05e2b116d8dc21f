//! Guest portal handlers
//!
//! Authenticated by the opaque token in the path; no account is involved.

use axum::{extract::State, Json};
use stay_service::dto::{
    AccessResponse, CheckInRequest, GuestPortalResponse, MarkReadResponse, MessageListQuery,
    MessageResponse, PostMessageRequest, ReservationServiceResponse,
};
use stay_service::services::GuestPortalService;

use crate::extractors::{GuestTokenPath, QueryParams, ValidatedJson};
use crate::response::{ApiResult, Created};
use crate::state::AppState;

/// GET /api/guest/{token}
pub async fn overview(
    State(state): State<AppState>,
    token: GuestTokenPath,
) -> ApiResult<Json<GuestPortalResponse>> {
    let service = GuestPortalService::new(state.service_context());
    Ok(Json(service.overview(token.as_str()).await?))
}

/// Submit the guest registration
///
/// POST /api/guest/{token}/check-in
pub async fn check_in(
    State(state): State<AppState>,
    token: GuestTokenPath,
    ValidatedJson(request): ValidatedJson<CheckInRequest>,
) -> ApiResult<Json<GuestPortalResponse>> {
    let service = GuestPortalService::new(state.service_context());
    Ok(Json(service.check_in(token.as_str(), request).await?))
}

/// GET /api/guest/{token}/services
pub async fn services(
    State(state): State<AppState>,
    token: GuestTokenPath,
) -> ApiResult<Json<Vec<ReservationServiceResponse>>> {
    let service = GuestPortalService::new(state.service_context());
    Ok(Json(service.services(token.as_str()).await?))
}

/// Door code and wifi, once the access gate opens
///
/// GET /api/guest/{token}/access
pub async fn access(
    State(state): State<AppState>,
    token: GuestTokenPath,
) -> ApiResult<Json<AccessResponse>> {
    let service = GuestPortalService::new(state.service_context());
    Ok(Json(service.access(token.as_str()).await?))
}

/// GET /api/guest/{token}/messages
pub async fn messages(
    State(state): State<AppState>,
    token: GuestTokenPath,
    QueryParams(query): QueryParams<MessageListQuery>,
) -> ApiResult<Json<Vec<MessageResponse>>> {
    let service = GuestPortalService::new(state.service_context());
    Ok(Json(service.messages(token.as_str(), query).await?))
}

/// POST /api/guest/{token}/messages
pub async fn post_message(
    State(state): State<AppState>,
    token: GuestTokenPath,
    ValidatedJson(request): ValidatedJson<PostMessageRequest>,
) -> ApiResult<Created<Json<MessageResponse>>> {
    let service = GuestPortalService::new(state.service_context());
    let message = service.post_message(token.as_str(), request).await?;
    Ok(Created(Json(message)))
}

/// POST /api/guest/{token}/messages/read
pub async fn mark_read(
    State(state): State<AppState>,
    token: GuestTokenPath,
) -> ApiResult<Json<MarkReadResponse>> {
    let service = GuestPortalService::new(state.service_context());
    Ok(Json(service.mark_read(token.as_str()).await?))
}

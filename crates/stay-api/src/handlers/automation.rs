//! Message automation handlers: rules, templates and scheduled messages

use axum::{extract::State, Json};
use stay_service::dto::{
    CreateMessageRuleRequest, CreateMessageTemplateRequest, MessageRuleResponse,
    MessageTemplateResponse, PlanSummaryResponse, ScheduledMessageResponse, TemplateListQuery,
    UpdateMessageRuleRequest, UpdateMessageTemplateRequest,
};
use stay_service::services::AutomationService;
use uuid::Uuid;

use crate::extractors::{AdminUser, IdPath, QueryParams, ValidatedJson};
use crate::response::{ApiResult, Created, NoContent};
use crate::state::AppState;

// ============================================================================
// Rules
// ============================================================================

/// GET /api/admin/properties/{id}/message-rules
pub async fn list_rules(
    State(state): State<AppState>,
    admin: AdminUser,
    IdPath(property_id): IdPath<Uuid>,
) -> ApiResult<Json<Vec<MessageRuleResponse>>> {
    let service = AutomationService::new(state.service_context());
    Ok(Json(service.list_rules(admin.actor(), property_id).await?))
}

/// POST /api/admin/properties/{id}/message-rules
pub async fn create_rule(
    State(state): State<AppState>,
    admin: AdminUser,
    IdPath(property_id): IdPath<Uuid>,
    ValidatedJson(request): ValidatedJson<CreateMessageRuleRequest>,
) -> ApiResult<Created<Json<MessageRuleResponse>>> {
    let service = AutomationService::new(state.service_context());
    let rule = service.create_rule(admin.actor(), property_id, request).await?;
    Ok(Created(Json(rule)))
}

/// GET /api/admin/message-rules/{id}
pub async fn get_rule(
    State(state): State<AppState>,
    admin: AdminUser,
    IdPath(rule_id): IdPath<Uuid>,
) -> ApiResult<Json<MessageRuleResponse>> {
    let service = AutomationService::new(state.service_context());
    Ok(Json(service.get_rule(admin.actor(), rule_id).await?))
}

/// Pending sends of the rule are cancelled; reservations pick up the new
/// timing on their next re-plan
///
/// PATCH /api/admin/message-rules/{id}
pub async fn update_rule(
    State(state): State<AppState>,
    admin: AdminUser,
    IdPath(rule_id): IdPath<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateMessageRuleRequest>,
) -> ApiResult<Json<MessageRuleResponse>> {
    let service = AutomationService::new(state.service_context());
    Ok(Json(service.update_rule(admin.actor(), rule_id, request).await?))
}

/// DELETE /api/admin/message-rules/{id}
pub async fn delete_rule(
    State(state): State<AppState>,
    admin: AdminUser,
    IdPath(rule_id): IdPath<Uuid>,
) -> ApiResult<NoContent> {
    AutomationService::new(state.service_context())
        .delete_rule(admin.actor(), rule_id)
        .await?;
    Ok(NoContent)
}

// ============================================================================
// Templates
// ============================================================================

/// GET /api/admin/message-templates?propertyId=
pub async fn list_templates(
    State(state): State<AppState>,
    admin: AdminUser,
    QueryParams(query): QueryParams<TemplateListQuery>,
) -> ApiResult<Json<Vec<MessageTemplateResponse>>> {
    let service = AutomationService::new(state.service_context());
    Ok(Json(service.list_templates(admin.actor(), query.property_id).await?))
}

/// GET /api/admin/message-templates/{id}
pub async fn get_template(
    State(state): State<AppState>,
    admin: AdminUser,
    IdPath(template_id): IdPath<Uuid>,
) -> ApiResult<Json<MessageTemplateResponse>> {
    let service = AutomationService::new(state.service_context());
    Ok(Json(service.get_template(admin.actor(), template_id).await?))
}

/// POST /api/admin/message-templates
pub async fn create_template(
    State(state): State<AppState>,
    admin: AdminUser,
    ValidatedJson(request): ValidatedJson<CreateMessageTemplateRequest>,
) -> ApiResult<Created<Json<MessageTemplateResponse>>> {
    let service = AutomationService::new(state.service_context());
    let template = service.create_template(admin.actor(), request).await?;
    Ok(Created(Json(template)))
}

/// PATCH /api/admin/message-templates/{id}
pub async fn update_template(
    State(state): State<AppState>,
    admin: AdminUser,
    IdPath(template_id): IdPath<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateMessageTemplateRequest>,
) -> ApiResult<Json<MessageTemplateResponse>> {
    let service = AutomationService::new(state.service_context());
    Ok(Json(service.update_template(admin.actor(), template_id, request).await?))
}

/// DELETE /api/admin/message-templates/{id}
pub async fn delete_template(
    State(state): State<AppState>,
    admin: AdminUser,
    IdPath(template_id): IdPath<Uuid>,
) -> ApiResult<NoContent> {
    AutomationService::new(state.service_context())
        .delete_template(admin.actor(), template_id)
        .await?;
    Ok(NoContent)
}

// ============================================================================
// Scheduled messages
// ============================================================================

/// Re-plan the automated messages of a reservation
///
/// POST /api/admin/reservations/{id}/messages/plan
pub async fn plan_reservation(
    State(state): State<AppState>,
    admin: AdminUser,
    IdPath(reservation_id): IdPath<Uuid>,
) -> ApiResult<Json<PlanSummaryResponse>> {
    let service = AutomationService::new(state.service_context());
    Ok(Json(service.plan_for_reservation(admin.actor(), reservation_id).await?))
}

/// GET /api/admin/reservations/{id}/scheduled-messages
pub async fn list_scheduled(
    State(state): State<AppState>,
    admin: AdminUser,
    IdPath(reservation_id): IdPath<Uuid>,
) -> ApiResult<Json<Vec<ScheduledMessageResponse>>> {
    let service = AutomationService::new(state.service_context());
    Ok(Json(service.list_scheduled(admin.actor(), reservation_id).await?))
}

/// POST /api/admin/scheduled-messages/{id}/cancel
pub async fn cancel_scheduled(
    State(state): State<AppState>,
    admin: AdminUser,
    IdPath(scheduled_id): IdPath<Uuid>,
) -> ApiResult<Json<ScheduledMessageResponse>> {
    let service = AutomationService::new(state.service_context());
    Ok(Json(service.cancel_scheduled(admin.actor(), scheduled_id).await?))
}

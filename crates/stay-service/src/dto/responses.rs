//! Response DTOs for API endpoints
//!
//! All response DTOs implement `Serialize` and are emitted in camelCase.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use stay_core::entities::{
    BackfillPolicy, CleaningTaskStatus, DeliveryChannel, DeliveryStatus, ReservationStatus,
    RuleType, ScheduledMessageStatus, ServicePaymentStatus, UserRole,
};
use stay_core::{LockReason, MessageRecord};
use uuid::Uuid;

// ============================================================================
// Common Response Types
// ============================================================================

/// Generic API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Offset-paginated list
#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, limit: i64, offset: i64, total: Option<i64>) -> Self {
        let has_more = match total {
            Some(total) => offset + (data.len() as i64) < total,
            None => data.len() as i64 >= limit,
        };
        Self {
            data,
            pagination: PaginationMeta {
                limit,
                offset,
                total,
                has_more,
            },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub limit: i64,
    pub offset: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<i64>,
    pub has_more: bool,
}

// ============================================================================
// Property Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyResponse {
    pub id: Uuid,
    pub owner_id: Option<Uuid>,
    pub name: String,
    pub address: Option<String>,
    pub description: Option<String>,
    pub amenities: Vec<String>,
    pub wifi_ssid: Option<String>,
    pub wifi_password: Option<String>,
    pub check_in_time: NaiveTime,
    pub access_time: Option<NaiveTime>,
    pub departure_time: NaiveTime,
    pub timezone: String,
    pub beds24_property_id: Option<i64>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomTypeResponse {
    pub id: Uuid,
    pub property_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub max_guests: i32,
    pub base_price: Option<i64>,
    pub weekend_price: Option<i64>,
    pub high_season_price: Option<i64>,
    pub amenities: Vec<String>,
    pub beds24_room_id: Option<i64>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomUnitResponse {
    pub id: Uuid,
    pub room_type_id: Uuid,
    pub unit_number: String,
    pub floor: Option<i32>,
    pub access_code: Option<String>,
    pub wifi_ssid: Option<String>,
    pub wifi_password: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// Reservation Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestRegistrationResponse {
    pub full_name: String,
    pub nationality: String,
    pub address: String,
    pub phone: Option<String>,
    pub occupation: Option<String>,
    pub passport_number: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationResponse {
    pub id: Uuid,
    pub property_id: Uuid,
    pub room_type_id: Option<Uuid>,
    pub room_unit_id: Option<Uuid>,
    pub beds24_booking_id: Option<i64>,
    pub booking_name: String,
    pub booking_email: Option<String>,
    pub booking_phone: Option<String>,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub nights: i64,
    pub num_adults: i32,
    pub num_children: i32,
    pub total_amount: Option<i64>,
    pub currency: String,
    pub status: ReservationStatus,
    pub guest_token: String,
    pub portal_url: Option<String>,
    pub registration: Option<GuestRegistrationResponse>,
    pub checked_in_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_type_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_unit_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ReservationResponse {
    /// Attach the guest portal link
    pub fn with_portal_url(mut self, url: String) -> Self {
        self.portal_url = Some(url);
        self
    }
}

// ============================================================================
// Cleaning Task Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleaningTaskResponse {
    pub id: Uuid,
    pub property_id: Uuid,
    pub room_unit_id: Option<Uuid>,
    pub reservation_id: Option<Uuid>,
    pub cleaner_id: Option<Uuid>,
    pub scheduled_date: NaiveDate,
    pub status: CleaningTaskStatus,
    pub notes: Option<String>,
    pub assigned_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// User Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    pub display_name: String,
    pub phone: Option<String>,
    pub role: UserRole,
    pub capabilities: Vec<&'static str>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// Automation Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRuleResponse {
    pub id: Uuid,
    pub property_id: Uuid,
    pub template_id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub rule_type: RuleType,
    pub delay_minutes: Option<i32>,
    pub days: Option<i32>,
    pub hours: Option<i32>,
    pub at_time: Option<String>,
    pub backfill: BackfillPolicy,
    pub timezone: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageTemplateResponse {
    pub id: Uuid,
    pub property_id: Option<Uuid>,
    pub name: String,
    pub subject: Option<String>,
    pub body: String,
    pub language: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledMessageResponse {
    pub id: Uuid,
    pub reservation_id: Uuid,
    pub rule_id: Uuid,
    pub template_id: Uuid,
    pub run_at: DateTime<Utc>,
    pub status: ScheduledMessageStatus,
    pub attempts: i32,
    pub last_error: Option<String>,
    pub sent_at: Option<DateTime<Utc>>,
    pub message_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Outcome of re-planning a reservation's automated messages
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSummaryResponse {
    pub reservation_id: Uuid,
    /// Pending rows cancelled before planning
    pub cancelled: u64,
    pub scheduled: usize,
    pub skipped: usize,
    /// Rules whose time had passed with backfill `none`
    pub dropped: usize,
}

// ============================================================================
// Chat Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadResponse {
    pub id: Uuid,
    pub reservation_id: Uuid,
    pub property_id: Uuid,
    pub last_message_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Chat messages use the realtime wire form so REST results and pushed
/// events reconcile field for field
pub type MessageResponse = MessageRecord;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDeliveryResponse {
    pub id: Uuid,
    pub message_id: Uuid,
    pub channel: DeliveryChannel,
    pub status: DeliveryStatus,
    pub error: Option<String>,
    pub attempted_at: DateTime<Utc>,
    pub delivered_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkReadResponse {
    pub updated: usize,
}

// ============================================================================
// Guest Service Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestServiceResponse {
    pub id: Uuid,
    pub property_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub currency: String,
    pub is_mandatory: bool,
    pub per_guest_night: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationServiceResponse {
    pub id: Uuid,
    pub reservation_id: Uuid,
    pub service_id: Option<Uuid>,
    pub name: String,
    pub amount: i64,
    pub currency: String,
    pub is_mandatory: bool,
    pub status: ServicePaymentStatus,
    pub is_settled: bool,
    pub payment_reference: Option<String>,
    pub exempt_reason: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Guest Portal Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestReservationView {
    pub id: Uuid,
    pub booking_name: String,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub nights: i64,
    pub num_adults: i32,
    pub num_children: i32,
    pub status: ReservationStatus,
    pub check_in_completed: bool,
    pub checked_in_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestPropertyView {
    pub name: String,
    pub address: Option<String>,
    pub description: Option<String>,
    pub amenities: Vec<String>,
    pub check_in_time: NaiveTime,
    pub departure_time: NaiveTime,
    pub timezone: String,
}

/// Room access state; secrets are only filled in once unlocked
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessResponse {
    pub unlocked: bool,
    pub unlocks_at: DateTime<Utc>,
    pub reasons: Vec<LockReason>,
    pub room_number: Option<String>,
    pub access_code: Option<String>,
    pub wifi_ssid: Option<String>,
    pub wifi_password: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestPortalResponse {
    pub reservation: GuestReservationView,
    pub property: GuestPropertyView,
    pub room_type_name: Option<String>,
    pub thread_id: Uuid,
    pub services: Vec<ReservationServiceResponse>,
    pub access: AccessResponse,
}

// ============================================================================
// Webhook Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Beds24WebhookResponse {
    pub reservation_id: Uuid,
    /// `false` when an existing booking was updated
    pub created: bool,
    pub status: ReservationStatus,
    pub services_attached: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<PlanSummaryResponse>,
}

// ============================================================================
// Health Responses
// ============================================================================

/// Basic health check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Readiness check response
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub checks: HealthChecks,
}

/// Health check status for each dependency
#[derive(Debug, Clone, Serialize)]
pub struct HealthChecks {
    pub database: String,
    pub redis: String,
}

impl ReadinessResponse {
    pub fn ready(database_healthy: bool, redis_healthy: bool) -> Self {
        let all_healthy = database_healthy && redis_healthy;
        Self {
            status: if all_healthy { "ready" } else { "not_ready" }.to_string(),
            timestamp: Utc::now(),
            checks: HealthChecks {
                database: if database_healthy { "healthy" } else { "unhealthy" }.to_string(),
                redis: if redis_healthy { "healthy" } else { "unhealthy" }.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_has_more() {
        let page = PaginatedResponse::new(vec![1, 2], 2, 0, Some(5));
        assert!(page.pagination.has_more);

        let page = PaginatedResponse::new(vec![1, 2], 2, 3, Some(5));
        assert!(!page.pagination.has_more);

        let page = PaginatedResponse::new(vec![1], 2, 0, None);
        assert!(!page.pagination.has_more);
    }

    #[test]
    fn test_pagination_meta_is_camel_case() {
        let page = PaginatedResponse::new(vec!["a"], 10, 0, Some(1));
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["pagination"]["hasMore"], false);
        assert_eq!(json["pagination"]["total"], 1);
    }

    #[test]
    fn test_access_response_serialization() {
        let response = AccessResponse {
            unlocked: false,
            unlocks_at: Utc::now(),
            reasons: vec![
                LockReason::CheckInIncomplete,
                LockReason::UnpaidMandatoryServices { count: 1 },
            ],
            room_number: Some("101".to_string()),
            access_code: None,
            wifi_ssid: None,
            wifi_password: None,
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["unlocked"], false);
        assert_eq!(json["reasons"][0]["reason"], "check_in_incomplete");
        assert_eq!(json["reasons"][1]["count"], 1);
        assert!(json["accessCode"].is_null());
    }

    #[test]
    fn test_health_response() {
        let health = HealthResponse::healthy();
        assert_eq!(health.status, "healthy");
    }

    #[test]
    fn test_readiness_response() {
        let ready = ReadinessResponse::ready(true, true);
        assert_eq!(ready.status, "ready");
        assert_eq!(ready.checks.database, "healthy");

        let not_ready = ReadinessResponse::ready(true, false);
        assert_eq!(not_ready.status, "not_ready");
        assert_eq!(not_ready.checks.redis, "unhealthy");
    }
}

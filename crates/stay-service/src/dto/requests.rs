//! Request DTOs for API endpoints
//!
//! All request DTOs implement `Deserialize` (camelCase) and, where they carry
//! free-form input, `Validate`.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::de::{self, Deserializer};
use serde::Deserialize;
use stay_core::entities::{
    BackfillPolicy, CleaningTaskStatus, ReservationStatus, RuleType, UserRole,
};
use stay_core::DomainError;
use uuid::Uuid;
use validator::Validate;

/// Parse `HH:MM` or `HH:MM:SS`
pub fn parse_clock_time(field: &str, value: &str) -> Result<NaiveTime, DomainError> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|_| DomainError::ValidationError(format!("{field} must be HH:MM, got {value:?}")))
}

// ============================================================================
// Property Requests
// ============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePropertyRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,

    /// Admins may create on behalf of an owner; defaults to the caller
    pub owner_id: Option<Uuid>,

    #[validate(length(max = 500, message = "Address must be at most 500 characters"))]
    pub address: Option<String>,

    #[validate(length(max = 5000, message = "Description must be at most 5000 characters"))]
    pub description: Option<String>,

    #[serde(default)]
    pub amenities: Vec<String>,

    pub wifi_ssid: Option<String>,
    pub wifi_password: Option<String>,

    /// `HH:MM`
    pub check_in_time: Option<String>,
    pub access_time: Option<String>,
    pub departure_time: Option<String>,

    /// IANA name; the configured default applies when unset
    pub timezone: Option<String>,

    pub beds24_property_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePropertyRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: Option<String>,

    #[validate(length(max = 500, message = "Address must be at most 500 characters"))]
    pub address: Option<String>,

    #[validate(length(max = 5000, message = "Description must be at most 5000 characters"))]
    pub description: Option<String>,

    pub amenities: Option<Vec<String>>,
    pub wifi_ssid: Option<String>,
    pub wifi_password: Option<String>,
    pub check_in_time: Option<String>,
    pub access_time: Option<String>,
    pub departure_time: Option<String>,
    pub timezone: Option<String>,
    pub beds24_property_id: Option<i64>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyListQuery {
    #[serde(default)]
    pub include_inactive: bool,
}

// ============================================================================
// Room Requests
// ============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomTypeRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,

    pub description: Option<String>,

    #[validate(range(min = 1, max = 100, message = "maxGuests must be 1-100"))]
    pub max_guests: i32,

    #[validate(range(min = 0))]
    pub base_price: Option<i64>,
    #[validate(range(min = 0))]
    pub weekend_price: Option<i64>,
    #[validate(range(min = 0))]
    pub high_season_price: Option<i64>,

    #[serde(default)]
    pub amenities: Vec<String>,

    pub beds24_room_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRoomTypeRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: Option<String>,

    pub description: Option<String>,

    #[validate(range(min = 1, max = 100, message = "maxGuests must be 1-100"))]
    pub max_guests: Option<i32>,

    #[validate(range(min = 0))]
    pub base_price: Option<i64>,
    #[validate(range(min = 0))]
    pub weekend_price: Option<i64>,
    #[validate(range(min = 0))]
    pub high_season_price: Option<i64>,

    pub amenities: Option<Vec<String>>,
    pub beds24_room_id: Option<i64>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomUnitRequest {
    #[validate(length(min = 1, max = 20, message = "Unit number must be 1-20 characters"))]
    pub unit_number: String,

    pub floor: Option<i32>,

    #[validate(length(max = 64, message = "Access code must be at most 64 characters"))]
    pub access_code: Option<String>,

    pub wifi_ssid: Option<String>,
    pub wifi_password: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRoomUnitRequest {
    #[validate(length(min = 1, max = 20, message = "Unit number must be 1-20 characters"))]
    pub unit_number: Option<String>,

    pub floor: Option<i32>,

    #[validate(length(max = 64, message = "Access code must be at most 64 characters"))]
    pub access_code: Option<String>,

    pub wifi_ssid: Option<String>,
    pub wifi_password: Option<String>,
}

// ============================================================================
// Reservation Requests
// ============================================================================

fn default_adults() -> i32 {
    1
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateReservationRequest {
    pub property_id: Uuid,
    pub room_type_id: Option<Uuid>,
    pub room_unit_id: Option<Uuid>,

    #[validate(length(min = 1, max = 200, message = "Booking name must be 1-200 characters"))]
    pub booking_name: String,

    #[validate(email(message = "Invalid email format"))]
    pub booking_email: Option<String>,

    #[validate(length(max = 50, message = "Phone must be at most 50 characters"))]
    pub booking_phone: Option<String>,

    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,

    #[serde(default = "default_adults")]
    #[validate(range(min = 1, max = 100, message = "numAdults must be 1-100"))]
    pub num_adults: i32,

    #[serde(default)]
    #[validate(range(min = 0, max = 100, message = "numChildren must be 0-100"))]
    pub num_children: i32,

    #[validate(range(min = 0))]
    pub total_amount: Option<i64>,

    #[validate(length(equal = 3, message = "Currency must be an ISO 4217 code"))]
    pub currency: Option<String>,

    pub status: Option<ReservationStatus>,

    #[validate(length(max = 5000, message = "Notes must be at most 5000 characters"))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReservationRequest {
    pub room_type_id: Option<Uuid>,
    pub room_unit_id: Option<Uuid>,

    #[validate(length(min = 1, max = 200, message = "Booking name must be 1-200 characters"))]
    pub booking_name: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    pub booking_email: Option<String>,

    #[validate(length(max = 50, message = "Phone must be at most 50 characters"))]
    pub booking_phone: Option<String>,

    pub check_in_date: Option<NaiveDate>,
    pub check_out_date: Option<NaiveDate>,

    #[validate(range(min = 1, max = 100, message = "numAdults must be 1-100"))]
    pub num_adults: Option<i32>,

    #[validate(range(min = 0, max = 100, message = "numChildren must be 0-100"))]
    pub num_children: Option<i32>,

    #[validate(range(min = 0))]
    pub total_amount: Option<i64>,

    #[validate(length(max = 5000, message = "Notes must be at most 5000 characters"))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReservationStatusRequest {
    pub status: ReservationStatus,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationListQuery {
    pub property_id: Option<Uuid>,
    pub status: Option<ReservationStatus>,
    pub arrival_from: Option<NaiveDate>,
    pub arrival_to: Option<NaiveDate>,
    pub search: Option<String>,
}

// ============================================================================
// Cleaning Task Requests
// ============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCleaningTaskRequest {
    pub property_id: Uuid,
    pub room_unit_id: Option<Uuid>,
    pub reservation_id: Option<Uuid>,
    pub cleaner_id: Option<Uuid>,
    pub scheduled_date: NaiveDate,

    #[validate(length(max = 2000, message = "Notes must be at most 2000 characters"))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCleaningTaskRequest {
    pub room_unit_id: Option<Uuid>,
    pub scheduled_date: Option<NaiveDate>,

    #[validate(length(max = 2000, message = "Notes must be at most 2000 characters"))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignCleanerRequest {
    pub cleaner_id: Uuid,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCleaningStatusRequest {
    pub status: CleaningTaskStatus,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleaningTaskListQuery {
    pub property_id: Option<Uuid>,
    pub cleaner_id: Option<Uuid>,
    pub status: Option<CleaningTaskStatus>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

// ============================================================================
// User Requests
// ============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    /// Subject of the user's token at the hosted auth provider
    pub id: Uuid,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub full_name: Option<String>,

    #[validate(length(max = 50, message = "Phone must be at most 50 characters"))]
    pub phone: Option<String>,

    pub role: UserRole,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub full_name: Option<String>,

    #[validate(length(max = 50, message = "Phone must be at most 50 characters"))]
    pub phone: Option<String>,

    pub role: Option<UserRole>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListQuery {
    pub role: Option<UserRole>,
    #[serde(default)]
    pub include_inactive: bool,
}

// ============================================================================
// Automation Requests
// ============================================================================

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateMessageRuleRequest {
    pub template_id: Uuid,

    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,

    #[serde(rename = "type")]
    pub rule_type: RuleType,

    #[validate(range(min = 0, max = 525_600, message = "delayMinutes must be 0-525600"))]
    pub delay_minutes: Option<i32>,
    #[validate(range(min = 0, max = 365, message = "days must be 0-365"))]
    pub days: Option<i32>,
    #[validate(range(min = 0, max = 8760, message = "hours must be 0-8760"))]
    pub hours: Option<i32>,

    /// `HH:MM`
    pub at_time: Option<String>,

    #[serde(default)]
    pub backfill: BackfillPolicy,

    pub timezone: Option<String>,

    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMessageRuleRequest {
    pub template_id: Option<Uuid>,

    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: Option<String>,

    #[serde(rename = "type")]
    pub rule_type: Option<RuleType>,

    #[validate(range(min = 0, max = 525_600, message = "delayMinutes must be 0-525600"))]
    pub delay_minutes: Option<i32>,
    #[validate(range(min = 0, max = 365, message = "days must be 0-365"))]
    pub days: Option<i32>,
    #[validate(range(min = 0, max = 8760, message = "hours must be 0-8760"))]
    pub hours: Option<i32>,
    pub at_time: Option<String>,
    pub backfill: Option<BackfillPolicy>,
    pub timezone: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateMessageTemplateRequest {
    /// Omit for a template shared by every property
    pub property_id: Option<Uuid>,

    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,

    #[validate(length(max = 200, message = "Subject must be at most 200 characters"))]
    pub subject: Option<String>,

    #[validate(length(min = 1, max = 10000, message = "Body must be 1-10000 characters"))]
    pub body: String,

    #[validate(length(min = 2, max = 10, message = "Language must be a language tag"))]
    pub language: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMessageTemplateRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: Option<String>,

    #[validate(length(max = 200, message = "Subject must be at most 200 characters"))]
    pub subject: Option<String>,

    #[validate(length(min = 1, max = 10000, message = "Body must be 1-10000 characters"))]
    pub body: Option<String>,

    #[validate(length(min = 2, max = 10, message = "Language must be a language tag"))]
    pub language: Option<String>,

    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateListQuery {
    pub property_id: Option<Uuid>,
}

// ============================================================================
// Chat Requests
// ============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PostMessageRequest {
    #[validate(length(min = 1, max = 4000, message = "Message must be 1-4000 characters"))]
    pub content: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageListQuery {
    /// Return messages created before this instant
    pub before: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
}

// ============================================================================
// Guest Portal Requests
// ============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CheckInRequest {
    #[validate(length(min = 1, max = 200, message = "Full name must be 1-200 characters"))]
    pub full_name: String,

    /// ISO 3166-1 alpha-2
    #[validate(length(equal = 2, message = "Nationality must be a two-letter country code"))]
    pub nationality: String,

    #[validate(length(min = 1, max = 500, message = "Address must be 1-500 characters"))]
    pub address: String,

    #[validate(length(max = 50, message = "Phone must be at most 50 characters"))]
    pub phone: Option<String>,

    #[validate(length(max = 100, message = "Occupation must be at most 100 characters"))]
    pub occupation: Option<String>,

    #[validate(length(max = 50, message = "Passport number must be at most 50 characters"))]
    pub passport_number: Option<String>,
}

// ============================================================================
// Guest Service Requests
// ============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateGuestServiceRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,

    pub description: Option<String>,

    #[validate(range(min = 0, message = "Price must not be negative"))]
    pub price: i64,

    #[validate(length(equal = 3, message = "Currency must be an ISO 4217 code"))]
    pub currency: Option<String>,

    #[serde(default)]
    pub is_mandatory: bool,

    #[serde(default)]
    pub per_guest_night: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGuestServiceRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: Option<String>,

    pub description: Option<String>,

    #[validate(range(min = 0, message = "Price must not be negative"))]
    pub price: Option<i64>,

    pub is_mandatory: Option<bool>,
    pub per_guest_night: Option<bool>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachServiceRequest {
    pub service_id: Uuid,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MarkPaidRequest {
    #[validate(length(max = 200, message = "Payment reference must be at most 200 characters"))]
    pub payment_reference: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ExemptServiceRequest {
    #[validate(length(min = 1, max = 500, message = "Reason must be 1-500 characters"))]
    pub reason: String,
}

// ============================================================================
// Beds24 Webhook
// ============================================================================

/// Body posted by the Beds24 booking webhook
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Beds24WebhookPayload {
    /// `NEW`, `MODIFY` or `CANCEL`; some accounts omit it
    #[serde(default)]
    pub event: Option<String>,
    pub booking: Beds24Booking,
}

/// Booking object of the webhook. Beds24 sends numbers as strings on some
/// account versions, so numeric fields accept both.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Beds24Booking {
    #[serde(deserialize_with = "lenient_number")]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub property_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub room_id: Option<i64>,
    pub arrival: NaiveDate,
    pub departure: NaiveDate,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub num_adult: Option<i32>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub num_child: Option<i32>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub price: Option<f64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

fn lenient_number<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
{
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::Number(n)) => n
            .to_string()
            .parse()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("invalid number: {n}"))),
        Some(serde_json::Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(serde_json::Value::String(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("invalid number: {s:?}"))),
        Some(other) => Err(de::Error::custom(format!("expected a number, got {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_clock_time() {
        assert_eq!(
            parse_clock_time("atTime", "10:00").unwrap(),
            NaiveTime::from_hms_opt(10, 0, 0).unwrap()
        );
        assert_eq!(
            parse_clock_time("atTime", "23:59:30").unwrap(),
            NaiveTime::from_hms_opt(23, 59, 30).unwrap()
        );
        assert!(parse_clock_time("atTime", "25:00").is_err());
        assert!(parse_clock_time("atTime", "ten").is_err());
    }

    #[test]
    fn test_rule_request_uses_type_field() {
        let request: CreateMessageRuleRequest = serde_json::from_value(json!({
            "templateId": Uuid::nil(),
            "name": "Day before arrival",
            "type": "BEFORE_ARRIVAL_DAYS_AT_TIME",
            "days": 1,
            "atTime": "10:00",
            "backfill": "skip_if_past"
        }))
        .unwrap();

        assert_eq!(request.rule_type, RuleType::BeforeArrivalDaysAtTime);
        assert_eq!(request.backfill, BackfillPolicy::SkipIfPast);
        assert_eq!(request.at_time.as_deref(), Some("10:00"));
        assert!(request.is_active);
    }

    #[test]
    fn test_rule_request_rejects_huge_offsets() {
        let request: CreateMessageRuleRequest = serde_json::from_value(json!({
            "templateId": Uuid::nil(),
            "name": "Far future",
            "type": "BEFORE_ARRIVAL_DAYS_AT_TIME",
            "days": i32::MAX,
            "atTime": "10:00"
        }))
        .unwrap();
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("days"));

        let update = UpdateMessageRuleRequest {
            hours: Some(-1),
            ..Default::default()
        };
        assert!(update.validate().unwrap_err().field_errors().contains_key("hours"));
    }

    #[test]
    fn test_reservation_request_defaults_and_validation() {
        let request: CreateReservationRequest = serde_json::from_value(json!({
            "propertyId": Uuid::nil(),
            "bookingName": "Taro Yamada",
            "checkInDate": "2024-03-05",
            "checkOutDate": "2024-03-07"
        }))
        .unwrap();
        assert_eq!(request.num_adults, 1);
        assert_eq!(request.num_children, 0);
        assert!(request.validate().is_ok());

        let bad: CreateReservationRequest = serde_json::from_value(json!({
            "propertyId": Uuid::nil(),
            "bookingName": "",
            "bookingEmail": "not-an-email",
            "checkInDate": "2024-03-05",
            "checkOutDate": "2024-03-07"
        }))
        .unwrap();
        let errors = bad.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("booking_name"));
        assert!(errors.field_errors().contains_key("booking_email"));
    }

    #[test]
    fn test_beds24_booking_accepts_string_numbers() {
        let payload: Beds24WebhookPayload = serde_json::from_value(json!({
            "event": "MODIFY",
            "booking": {
                "id": "12345",
                "propertyId": 678,
                "roomId": "91",
                "arrival": "2024-03-05",
                "departure": "2024-03-08",
                "firstName": "Anna",
                "lastName": "Smith",
                "numAdult": "2",
                "numChild": "",
                "price": "36000.00",
                "status": "1"
            }
        }))
        .unwrap();

        let booking = payload.booking;
        assert_eq!(booking.id, Some(12345));
        assert_eq!(booking.property_id, Some(678));
        assert_eq!(booking.room_id, Some(91));
        assert_eq!(booking.num_adult, Some(2));
        assert_eq!(booking.num_child, None);
        assert_eq!(booking.price, Some(36000.0));
        assert_eq!(payload.event.as_deref(), Some("MODIFY"));
    }

    #[test]
    fn test_check_in_request_validation() {
        let request = CheckInRequest {
            full_name: "Anna Smith".to_string(),
            nationality: "GBR".to_string(),
            address: "1 High St".to_string(),
            phone: None,
            occupation: None,
            passport_number: None,
        };
        assert!(request.validate().is_err());
    }
}

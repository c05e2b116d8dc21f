//! Add-on service database models

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for guest_services table
#[derive(Debug, Clone, FromRow)]
pub struct GuestServiceModel {
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

/// Database model for reservation_services table
#[derive(Debug, Clone, FromRow)]
pub struct ReservationServiceModel {
    pub id: Uuid,
    pub reservation_id: Uuid,
    pub service_id: Option<Uuid>,
    pub name: String,
    pub amount: i64,
    pub currency: String,
    pub is_mandatory: bool,
    pub status: String,
    pub payment_reference: Option<String>,
    pub exempt_reason: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

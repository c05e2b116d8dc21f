//! Property database model

use chrono::{DateTime, NaiveTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for properties table
#[derive(Debug, Clone, FromRow)]
pub struct PropertyModel {
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

//! Room type and room unit database models

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for room_types table
#[derive(Debug, Clone, FromRow)]
pub struct RoomTypeModel {
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

/// Database model for room_units table
#[derive(Debug, Clone, FromRow)]
pub struct RoomUnitModel {
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

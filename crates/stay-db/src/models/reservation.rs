//! Reservation database models

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for reservations table.
/// Guest register fields are flattened into `guest_*` columns.
#[derive(Debug, Clone, FromRow)]
pub struct ReservationModel {
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
    pub num_adults: i32,
    pub num_children: i32,
    pub total_amount: Option<i64>,
    pub currency: String,
    pub status: String,
    pub guest_token: String,
    pub guest_full_name: Option<String>,
    pub guest_nationality: Option<String>,
    pub guest_address: Option<String>,
    pub guest_phone: Option<String>,
    pub guest_occupation: Option<String>,
    pub guest_passport_number: Option<String>,
    pub checked_in_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row of the `reservation_details` view (or the equivalent join)
#[derive(Debug, Clone, FromRow)]
pub struct ReservationDetailsModel {
    #[sqlx(flatten)]
    pub reservation: ReservationModel,
    pub property_name: String,
    pub room_type_name: Option<String>,
    pub room_unit_number: Option<String>,
}

/// Row returned by the Beds24 upsert
#[derive(Debug, Clone, FromRow)]
pub struct ReservationUpsertModel {
    #[sqlx(flatten)]
    pub reservation: ReservationModel,
    /// `xmax = 0` on the returned tuple: the row was inserted, not updated
    pub inserted: bool,
}

//! Cleaning task database model

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for cleaning_tasks table
#[derive(Debug, Clone, FromRow)]
pub struct CleaningTaskModel {
    pub id: Uuid,
    pub property_id: Uuid,
    pub room_unit_id: Option<Uuid>,
    pub reservation_id: Option<Uuid>,
    pub cleaner_id: Option<Uuid>,
    pub scheduled_date: NaiveDate,
    pub status: String,
    pub notes: Option<String>,
    pub assigned_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//! Guest chat database models

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for message_threads table
#[derive(Debug, Clone, FromRow)]
pub struct MessageThreadModel {
    pub id: Uuid,
    pub reservation_id: Uuid,
    pub property_id: Uuid,
    pub last_message_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Database model for messages table
#[derive(Debug, Clone, FromRow)]
pub struct MessageModel {
    pub id: Uuid,
    pub thread_id: Uuid,
    pub sender_role: String,
    pub sender_id: Option<Uuid>,
    pub content: String,
    pub scheduled_message_id: Option<Uuid>,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Database model for message_deliveries table
#[derive(Debug, Clone, FromRow)]
pub struct MessageDeliveryModel {
    pub id: Uuid,
    pub message_id: Uuid,
    pub channel: String,
    pub status: String,
    pub error: Option<String>,
    pub attempted_at: DateTime<Utc>,
    pub delivered_at: Option<DateTime<Utc>>,
}

//! Message automation database models

use chrono::{DateTime, NaiveTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for message_rules table
#[derive(Debug, Clone, FromRow)]
pub struct MessageRuleModel {
    pub id: Uuid,
    pub property_id: Uuid,
    pub template_id: Uuid,
    pub name: String,
    pub rule_type: String,
    pub delay_minutes: Option<i32>,
    pub days: Option<i32>,
    pub hours: Option<i32>,
    pub at_time: Option<NaiveTime>,
    pub backfill: String,
    pub timezone: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Database model for message_templates table
#[derive(Debug, Clone, FromRow)]
pub struct MessageTemplateModel {
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

/// Database model for scheduled_messages table
///
/// `locked_until` is a dispatcher lease and is not part of the entity.
#[derive(Debug, Clone, FromRow)]
pub struct ScheduledMessageModel {
    pub id: Uuid,
    pub reservation_id: Uuid,
    pub rule_id: Uuid,
    pub template_id: Uuid,
    pub run_at: DateTime<Utc>,
    pub status: String,
    pub attempts: i32,
    pub last_error: Option<String>,
    pub sent_at: Option<DateTime<Utc>>,
    pub message_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

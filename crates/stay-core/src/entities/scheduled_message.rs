//! Scheduled message entity - one planned send of a rule for a reservation

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ScheduledMessageStatus {
    #[default]
    Pending,
    Sent,
    Skipped,
    Failed,
    Cancelled,
}

impl ScheduledMessageStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Sent => "sent",
            Self::Skipped => "skipped",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for ScheduledMessageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScheduledMessageStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "sent" => Ok(Self::Sent),
            "skipped" => Ok(Self::Skipped),
            "failed" => Ok(Self::Failed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(DomainError::ValidationError(format!(
                "unknown scheduled message status: {other}"
            ))),
        }
    }
}

/// Scheduled message entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledMessage {
    pub id: Uuid,
    pub reservation_id: Uuid,
    pub rule_id: Uuid,
    pub template_id: Uuid,
    pub run_at: DateTime<Utc>,
    pub status: ScheduledMessageStatus,
    pub attempts: i32,
    pub last_error: Option<String>,
    pub sent_at: Option<DateTime<Utc>>,
    /// Chat message produced when sent
    pub message_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ScheduledMessage {
    /// Max delivery attempts before a row is left as failed
    pub const MAX_ATTEMPTS: i32 = 3;

    pub fn new(
        reservation_id: Uuid,
        rule_id: Uuid,
        template_id: Uuid,
        run_at: DateTime<Utc>,
        status: ScheduledMessageStatus,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            reservation_id,
            rule_id,
            template_id,
            run_at,
            status,
            attempts: 0,
            last_error: None,
            sent_at: None,
            message_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[inline]
    pub fn is_pending(&self) -> bool {
        self.status == ScheduledMessageStatus::Pending
    }

    /// Pending and due at `now`
    #[inline]
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.is_pending() && self.run_at <= now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_is_due() {
        let now = Utc::now();
        let msg = ScheduledMessage::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            now - Duration::minutes(1),
            ScheduledMessageStatus::Pending,
        );
        assert!(msg.is_due(now));
        assert!(!msg.is_due(now - Duration::minutes(5)));

        let skipped = ScheduledMessage {
            status: ScheduledMessageStatus::Skipped,
            ..msg
        };
        assert!(!skipped.is_due(now));
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(
            "skipped".parse::<ScheduledMessageStatus>().unwrap(),
            ScheduledMessageStatus::Skipped
        );
    }
}

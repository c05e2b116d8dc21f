//! Guest chat entities - threads, messages, and delivery records

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Maximum message length in characters
pub const MAX_MESSAGE_LENGTH: usize = 4000;

/// Who wrote a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SenderRole {
    Guest,
    Host,
    /// Automated messages produced by rules
    System,
}

impl SenderRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Guest => "guest",
            Self::Host => "host",
            Self::System => "system",
        }
    }
}

impl fmt::Display for SenderRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SenderRole {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "guest" => Ok(Self::Guest),
            "host" => Ok(Self::Host),
            "system" => Ok(Self::System),
            other => Err(DomainError::ValidationError(format!(
                "unknown sender role: {other}"
            ))),
        }
    }
}

/// One conversation per reservation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageThread {
    pub id: Uuid,
    pub reservation_id: Uuid,
    pub property_id: Uuid,
    pub last_message_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MessageThread {
    pub fn new(reservation_id: Uuid, property_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            reservation_id,
            property_id,
            last_message_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Chat message entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: Uuid,
    pub thread_id: Uuid,
    pub sender_role: SenderRole,
    pub sender_id: Option<Uuid>,
    pub content: String,
    pub scheduled_message_id: Option<Uuid>,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Message {
    pub fn new(
        thread_id: Uuid,
        sender_role: SenderRole,
        sender_id: Option<Uuid>,
        content: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            thread_id,
            sender_role,
            sender_id,
            content,
            scheduled_message_id: None,
            read_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Message produced by an automation rule
    pub fn automated(thread_id: Uuid, content: String, scheduled_message_id: Uuid) -> Self {
        let mut msg = Self::new(thread_id, SenderRole::System, None, content);
        msg.scheduled_message_id = Some(scheduled_message_id);
        msg
    }

    /// Reject empty or oversized content
    pub fn validate_content(content: &str) -> Result<(), DomainError> {
        if content.trim().is_empty() {
            return Err(DomainError::ValidationError(
                "message content must not be empty".to_string(),
            ));
        }
        if content.chars().count() > MAX_MESSAGE_LENGTH {
            return Err(DomainError::ContentTooLong {
                max: MAX_MESSAGE_LENGTH,
            });
        }
        Ok(())
    }

    #[inline]
    pub fn is_read(&self) -> bool {
        self.read_at.is_some()
    }

    /// Whether a reader in `role` should see this message as incoming
    #[inline]
    pub fn is_incoming_for(&self, role: SenderRole) -> bool {
        match role {
            SenderRole::Guest => self.sender_role != SenderRole::Guest,
            SenderRole::Host | SenderRole::System => self.sender_role == SenderRole::Guest,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryChannel {
    InApp,
    Email,
}

impl DeliveryChannel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InApp => "in_app",
            Self::Email => "email",
        }
    }
}

impl FromStr for DeliveryChannel {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in_app" => Ok(Self::InApp),
            "email" => Ok(Self::Email),
            other => Err(DomainError::ValidationError(format!(
                "unknown delivery channel: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    Pending,
    Delivered,
    Failed,
}

impl DeliveryStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Delivered => "delivered",
            Self::Failed => "failed",
        }
    }
}

impl FromStr for DeliveryStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "delivered" => Ok(Self::Delivered),
            "failed" => Ok(Self::Failed),
            other => Err(DomainError::ValidationError(format!(
                "unknown delivery status: {other}"
            ))),
        }
    }
}

/// Record of one attempt to deliver a message through a channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageDelivery {
    pub id: Uuid,
    pub message_id: Uuid,
    pub channel: DeliveryChannel,
    pub status: DeliveryStatus,
    pub error: Option<String>,
    pub attempted_at: DateTime<Utc>,
    pub delivered_at: Option<DateTime<Utc>>,
}

impl MessageDelivery {
    pub fn delivered(message_id: Uuid, channel: DeliveryChannel, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            message_id,
            channel,
            status: DeliveryStatus::Delivered,
            error: None,
            attempted_at: now,
            delivered_at: Some(now),
        }
    }

    pub fn failed(
        message_id: Uuid,
        channel: DeliveryChannel,
        error: String,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            message_id,
            channel,
            status: DeliveryStatus::Failed,
            error: Some(error),
            attempted_at: now,
            delivered_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_content() {
        assert!(Message::validate_content("hello").is_ok());
        assert!(Message::validate_content("   ").is_err());
        let long = "a".repeat(MAX_MESSAGE_LENGTH + 1);
        assert!(matches!(
            Message::validate_content(&long),
            Err(DomainError::ContentTooLong { .. })
        ));
    }

    #[test]
    fn test_automated_message() {
        let thread = Uuid::new_v4();
        let scheduled = Uuid::new_v4();
        let msg = Message::automated(thread, "Welcome".to_string(), scheduled);
        assert_eq!(msg.sender_role, SenderRole::System);
        assert_eq!(msg.scheduled_message_id, Some(scheduled));
        assert!(msg.sender_id.is_none());
    }

    #[test]
    fn test_is_incoming_for() {
        let thread = Uuid::new_v4();
        let from_guest = Message::new(thread, SenderRole::Guest, None, "hi".to_string());
        let from_host = Message::new(thread, SenderRole::Host, None, "hello".to_string());

        assert!(from_guest.is_incoming_for(SenderRole::Host));
        assert!(!from_guest.is_incoming_for(SenderRole::Guest));
        assert!(from_host.is_incoming_for(SenderRole::Guest));
        assert!(!from_host.is_incoming_for(SenderRole::Host));
    }

    #[test]
    fn test_delivery_constructors() {
        let now = Utc::now();
        let ok = MessageDelivery::delivered(Uuid::new_v4(), DeliveryChannel::InApp, now);
        assert_eq!(ok.status, DeliveryStatus::Delivered);
        assert_eq!(ok.delivered_at, Some(now));

        let failed =
            MessageDelivery::failed(Uuid::new_v4(), DeliveryChannel::Email, "smtp".to_string(), now);
        assert_eq!(failed.status, DeliveryStatus::Failed);
        assert!(failed.delivered_at.is_none());
    }
}

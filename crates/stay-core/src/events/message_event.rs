//! Message change events pushed to realtime subscribers
//!
//! Mirrors a row-level change feed: every insert or update of a chat
//! message is published with the full row so subscribers can merge it
//! without another fetch.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::{Message, SenderRole};

/// Wire form of a chat message row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRecord {
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

impl From<&Message> for MessageRecord {
    fn from(m: &Message) -> Self {
        Self {
            id: m.id,
            thread_id: m.thread_id,
            sender_role: m.sender_role,
            sender_id: m.sender_id,
            content: m.content.clone(),
            scheduled_message_id: m.scheduled_message_id,
            read_at: m.read_at,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// A change to the messages table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "record", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageEvent {
    Insert(MessageRecord),
    Update(MessageRecord),
}

impl MessageEvent {
    /// Event type name as sent on the wire
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Insert(_) => "INSERT",
            Self::Update(_) => "UPDATE",
        }
    }

    pub fn record(&self) -> &MessageRecord {
        match self {
            Self::Insert(r) | Self::Update(r) => r,
        }
    }

    pub fn into_record(self) -> MessageRecord {
        match self {
            Self::Insert(r) | Self::Update(r) => r,
        }
    }

    #[inline]
    pub fn thread_id(&self) -> Uuid {
        self.record().thread_id
    }

    pub fn inserted(message: &Message) -> Self {
        Self::Insert(MessageRecord::from(message))
    }

    pub fn updated(message: &Message) -> Self {
        Self::Update(MessageRecord::from(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization() {
        let msg = Message::new(Uuid::new_v4(), SenderRole::Guest, None, "Hello".to_string());
        let event = MessageEvent::inserted(&msg);

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "INSERT");
        assert_eq!(json["record"]["content"], "Hello");
        assert_eq!(json["record"]["senderRole"], "guest");
        assert_eq!(json["record"]["threadId"], msg.thread_id.to_string());

        let parsed: MessageEvent = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, event);
    }

    #[test]
    fn test_event_accessors() {
        let msg = Message::new(Uuid::new_v4(), SenderRole::Host, None, "Hi".to_string());
        let event = MessageEvent::updated(&msg);
        assert_eq!(event.event_type(), "UPDATE");
        assert_eq!(event.thread_id(), msg.thread_id);
        assert_eq!(event.into_record().id, msg.id);
    }
}

//! Redis Pub/Sub publisher.
//!
//! Message changes are published on the thread channel and on the
//! property's staff inbox channel. Gateways subscribed to either forward
//! them to their WebSocket sessions.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use stay_core::MessageEvent;

use crate::pool::{RedisPool, RedisResult};
use crate::pubsub::PubSubChannel;

/// Event wrapper for Pub/Sub messages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PubSubEvent {
    /// Event type name (`INSERT`, `UPDATE`)
    pub event_type: String,
    /// Event payload
    pub data: serde_json::Value,
}

impl PubSubEvent {
    /// Create a new event
    #[must_use]
    pub fn new(event_type: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            event_type: event_type.into(),
            data,
        }
    }

    /// Wrap a message change; `data` is the camelCase row
    pub fn from_message_event(event: &MessageEvent) -> Result<Self, serde_json::Error> {
        Ok(Self::new(
            event.event_type(),
            serde_json::to_value(event.record())?,
        ))
    }

    /// Rebuild the message change, if this event carries one
    #[must_use]
    pub fn to_message_event(&self) -> Option<MessageEvent> {
        let record = serde_json::from_value(self.data.clone()).ok()?;
        match self.event_type.as_str() {
            "INSERT" => Some(MessageEvent::Insert(record)),
            "UPDATE" => Some(MessageEvent::Update(record)),
            _ => None,
        }
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Publishes events through the shared connection pool
#[derive(Clone)]
pub struct Publisher {
    pool: RedisPool,
}

impl Publisher {
    #[must_use]
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }

    /// Returns how many subscribers received the event
    pub async fn publish(&self, channel: &PubSubChannel, event: &PubSubEvent) -> RedisResult<u32> {
        self.publish_many(std::slice::from_ref(channel), event).await
    }

    /// Send one event to several channels in a single pipeline; returns the
    /// receiver count summed over all channels.
    pub async fn publish_many(
        &self,
        channels: &[PubSubChannel],
        event: &PubSubEvent,
    ) -> RedisResult<u32> {
        if channels.is_empty() {
            return Ok(0);
        }
        let payload = event.to_json()?;

        let mut pipe = redis::pipe();
        for channel in channels {
            pipe.publish(channel.name(), &payload);
        }
        let mut conn = self.pool.get().await?;
        let counts: Vec<u32> = pipe.query_async(&mut conn).await?;
        let receivers = counts.iter().sum();

        tracing::debug!(
            channels = channels.len(),
            event_type = %event.event_type,
            receivers,
            "Published event"
        );
        Ok(receivers)
    }

    /// Publish a message change to its thread and to the property inbox
    pub async fn publish_message_event(
        &self,
        property_id: Uuid,
        event: &MessageEvent,
    ) -> RedisResult<u32> {
        let payload = PubSubEvent::from_message_event(event)?;
        let channels = [
            PubSubChannel::thread(event.thread_id()),
            PubSubChannel::property(property_id),
        ];
        self.publish_many(&channels, &payload).await
    }
}

//! Pub/Sub channel definitions.
//!
//! Defines the channel naming conventions for Redis Pub/Sub.

use uuid::Uuid;

/// Channel prefix for events of one guest conversation
pub const THREAD_CHANNEL_PREFIX: &str = "thread:";
/// Channel prefix for the staff inbox of a property
pub const PROPERTY_CHANNEL_PREFIX: &str = "property:";
/// Channel for broadcast events (all connected clients)
pub const BROADCAST_CHANNEL: &str = "broadcast";

/// Pub/Sub channel types
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PubSubChannel {
    /// Events for one message thread
    Thread(Uuid),
    /// Events for every thread of a property
    Property(Uuid),
    /// Broadcast to all connected clients
    Broadcast,
    /// Custom channel name
    Custom(String),
}

impl PubSubChannel {
    #[must_use]
    pub fn thread(thread_id: Uuid) -> Self {
        Self::Thread(thread_id)
    }

    #[must_use]
    pub fn property(property_id: Uuid) -> Self {
        Self::Property(property_id)
    }

    #[must_use]
    pub fn broadcast() -> Self {
        Self::Broadcast
    }

    #[must_use]
    pub fn custom(name: impl Into<String>) -> Self {
        Self::Custom(name.into())
    }

    /// Get the Redis channel name
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::Thread(id) => format!("{THREAD_CHANNEL_PREFIX}{id}"),
            Self::Property(id) => format!("{PROPERTY_CHANNEL_PREFIX}{id}"),
            Self::Broadcast => BROADCAST_CHANNEL.to_string(),
            Self::Custom(name) => name.clone(),
        }
    }

    /// Parse a channel name back to a `PubSubChannel`
    #[must_use]
    pub fn parse(name: &str) -> Self {
        if name == BROADCAST_CHANNEL {
            return Self::Broadcast;
        }

        if let Some(id) = name
            .strip_prefix(THREAD_CHANNEL_PREFIX)
            .and_then(|s| s.parse::<Uuid>().ok())
        {
            return Self::Thread(id);
        }

        if let Some(id) = name
            .strip_prefix(PROPERTY_CHANNEL_PREFIX)
            .and_then(|s| s.parse::<Uuid>().ok())
        {
            return Self::Property(id);
        }

        Self::Custom(name.to_string())
    }
}

impl std::fmt::Display for PubSubChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_names() {
        let id = Uuid::parse_str("6f1c2f0e-3a43-4a8e-9d0e-0d7f5f3b7a11").unwrap();

        assert_eq!(
            PubSubChannel::thread(id).name(),
            "thread:6f1c2f0e-3a43-4a8e-9d0e-0d7f5f3b7a11"
        );
        assert_eq!(
            PubSubChannel::property(id).name(),
            "property:6f1c2f0e-3a43-4a8e-9d0e-0d7f5f3b7a11"
        );
        assert_eq!(PubSubChannel::broadcast().name(), "broadcast");
        assert_eq!(PubSubChannel::custom("test").name(), "test");
    }

    #[test]
    fn test_channel_parse() {
        let id = Uuid::new_v4();

        assert_eq!(PubSubChannel::parse(&format!("thread:{id}")), PubSubChannel::Thread(id));
        assert_eq!(PubSubChannel::parse(&format!("property:{id}")), PubSubChannel::Property(id));
        assert_eq!(PubSubChannel::parse("broadcast"), PubSubChannel::Broadcast);

        // Malformed ids fall through to custom
        assert_eq!(
            PubSubChannel::parse("thread:123"),
            PubSubChannel::Custom("thread:123".to_string())
        );
    }
}

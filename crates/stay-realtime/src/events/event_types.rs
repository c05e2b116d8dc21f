//! Gateway event types
//!
//! Names sent in the `t` field of dispatch messages.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Gateway event types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GatewayEventType {
    /// Sent after a successful Identify
    Ready,
    /// Thread subscription confirmed
    Subscribed,
    /// Thread subscription removed
    Unsubscribed,
    /// Message row inserted
    Insert,
    /// Message row updated (read receipts)
    Update,
}

impl GatewayEventType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ready => "READY",
            Self::Subscribed => "SUBSCRIBED",
            Self::Unsubscribed => "UNSUBSCRIBED",
            Self::Insert => "INSERT",
            Self::Update => "UPDATE",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "READY" => Some(Self::Ready),
            "SUBSCRIBED" => Some(Self::Subscribed),
            "UNSUBSCRIBED" => Some(Self::Unsubscribed),
            "INSERT" => Some(Self::Insert),
            "UPDATE" => Some(Self::Update),
            _ => None,
        }
    }

    /// Whether this event carries a message row
    #[must_use]
    pub const fn is_message_change(self) -> bool {
        matches!(self, Self::Insert | Self::Update)
    }
}

impl fmt::Display for GatewayEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

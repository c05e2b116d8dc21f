//! Client and handshake payloads

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Payload for op 10 (Hello)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HelloPayload {
    /// Heartbeat interval in milliseconds
    pub heartbeat_interval: u64,
}

impl HelloPayload {
    /// Default heartbeat interval (45 seconds)
    pub const DEFAULT_HEARTBEAT_INTERVAL: u64 = 45_000;

    #[must_use]
    pub fn with_interval(heartbeat_interval: u64) -> Self {
        Self { heartbeat_interval }
    }
}

impl Default for HelloPayload {
    fn default() -> Self {
        Self::with_interval(Self::DEFAULT_HEARTBEAT_INTERVAL)
    }
}

/// Payload for op 2 (Identify)
///
/// Exactly one of `token` (staff bearer token, with or without the
/// `Bearer ` prefix) and `guestToken` (portal link token) must be set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentifyPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guest_token: Option<String>,
}

/// Credential presented in Identify
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Credential<'a> {
    Staff(&'a str),
    Guest(&'a str),
}

impl IdentifyPayload {
    #[must_use]
    pub fn staff(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            guest_token: None,
        }
    }

    #[must_use]
    pub fn guest(token: impl Into<String>) -> Self {
        Self {
            token: None,
            guest_token: Some(token.into()),
        }
    }

    /// The single credential carried, or `None` when zero or two are set
    #[must_use]
    pub fn credential(&self) -> Option<Credential<'_>> {
        match (self.token.as_deref(), self.guest_token.as_deref()) {
            (Some(token), None) => Some(Credential::Staff(
                token.strip_prefix("Bearer ").unwrap_or(token),
            )),
            (None, Some(token)) => Some(Credential::Guest(token)),
            _ => None,
        }
    }
}

/// Payload for op 3 (Subscribe), op 4 (Unsubscribe) and the matching
/// `SUBSCRIBED`/`UNSUBSCRIBED` dispatches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadPayload {
    pub thread_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identify_credential() {
        let staff = IdentifyPayload::staff("Bearer abc.def.ghi");
        assert_eq!(staff.credential(), Some(Credential::Staff("abc.def.ghi")));

        let bare: IdentifyPayload = serde_json::from_value(serde_json::json!({
            "token": "abc.def.ghi"
        }))
        .unwrap();
        assert_eq!(bare.credential(), Some(Credential::Staff("abc.def.ghi")));

        let guest: IdentifyPayload = serde_json::from_value(serde_json::json!({
            "guestToken": "tok"
        }))
        .unwrap();
        assert_eq!(guest.credential(), Some(Credential::Guest("tok")));
    }

    #[test]
    fn test_identify_requires_exactly_one_credential() {
        assert_eq!(IdentifyPayload::default().credential(), None);

        let both = IdentifyPayload {
            token: Some("a".to_string()),
            guest_token: Some("b".to_string()),
        };
        assert_eq!(both.credential(), None);
    }

    #[test]
    fn test_hello_is_camel_case() {
        let json = serde_json::to_value(HelloPayload::default()).unwrap();
        assert_eq!(json["heartbeatInterval"], 45_000);
    }
}

//! Gateway message envelope

use super::{CloseCode, HelloPayload, IdentifyPayload, OpCode, ThreadPayload};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Envelope of every frame on the socket
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayMessage {
    /// Operation code
    pub op: OpCode,

    /// Event type (only for op=0 Dispatch)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub t: Option<String>,

    /// Per-connection sequence number (only for op=0 Dispatch)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub s: Option<u64>,

    /// Event data payload
    #[serde(skip_serializing_if = "Option::is_none")]
    pub d: Option<Value>,
}

impl GatewayMessage {
    fn bare(op: OpCode, d: Option<Value>) -> Self {
        Self {
            op,
            t: None,
            s: None,
            d,
        }
    }

    // === Server Messages ===

    /// Create a Dispatch message (op=0)
    #[must_use]
    pub fn dispatch(event_type: impl Into<String>, sequence: u64, data: Value) -> Self {
        Self {
            op: OpCode::Dispatch,
            t: Some(event_type.into()),
            s: Some(sequence),
            d: Some(data),
        }
    }

    /// Create a Hello message (op=10)
    #[must_use]
    pub fn hello(payload: HelloPayload) -> Self {
        Self::bare(OpCode::Hello, serde_json::to_value(payload).ok())
    }

    /// Create a Heartbeat ACK message (op=11)
    #[must_use]
    pub fn heartbeat_ack() -> Self {
        Self::bare(OpCode::HeartbeatAck, None)
    }

    // === Client Messages ===

    #[must_use]
    pub fn heartbeat(last_sequence: Option<u64>) -> Self {
        Self::bare(OpCode::Heartbeat, last_sequence.map(|s| Value::Number(s.into())))
    }

    #[must_use]
    pub fn identify(payload: &IdentifyPayload) -> Self {
        Self::bare(OpCode::Identify, serde_json::to_value(payload).ok())
    }

    #[must_use]
    pub fn subscribe(thread_id: uuid::Uuid) -> Self {
        Self::bare(
            OpCode::Subscribe,
            serde_json::to_value(ThreadPayload { thread_id }).ok(),
        )
    }

    #[must_use]
    pub fn unsubscribe(thread_id: uuid::Uuid) -> Self {
        Self::bare(
            OpCode::Unsubscribe,
            serde_json::to_value(ThreadPayload { thread_id }).ok(),
        )
    }

    // === Parsing ===

    fn payload<T: serde::de::DeserializeOwned>(&self, op: OpCode) -> Option<T> {
        if self.op != op {
            return None;
        }
        self.d
            .as_ref()
            .and_then(|d| serde_json::from_value(d.clone()).ok())
    }

    /// Try to parse as an Identify payload (op=2)
    pub fn as_identify(&self) -> Option<IdentifyPayload> {
        self.payload(OpCode::Identify)
    }

    /// Try to parse as a Subscribe payload (op=3)
    pub fn as_subscribe(&self) -> Option<ThreadPayload> {
        self.payload(OpCode::Subscribe)
    }

    /// Try to parse as an Unsubscribe payload (op=4)
    pub fn as_unsubscribe(&self) -> Option<ThreadPayload> {
        self.payload(OpCode::Unsubscribe)
    }

    /// Try to parse as a Hello payload (op=10)
    pub fn as_hello(&self) -> Option<HelloPayload> {
        self.payload(OpCode::Hello)
    }

    /// Try to parse the heartbeat sequence number (op=1)
    pub fn as_heartbeat_seq(&self) -> Option<Option<u64>> {
        if self.op != OpCode::Heartbeat {
            return None;
        }
        Some(self.d.as_ref().and_then(Value::as_u64))
    }

    // === Utilities ===

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Code and reason for a close frame
    #[must_use]
    pub fn close_frame(code: CloseCode) -> (u16, String) {
        (code.as_u16(), code.description().to_string())
    }
}

impl std::fmt::Display for GatewayMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(t) = &self.t {
            write!(f, "GatewayMessage(op={}, t={}", self.op, t)?;
            if let Some(s) = self.s {
                write!(f, ", s={s}")?;
            }
            write!(f, ")")
        } else {
            write!(f, "GatewayMessage(op={})", self.op)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_dispatch_wire_format() {
        let msg = GatewayMessage::dispatch("INSERT", 42, serde_json::json!({"content": "Hi"}));
        let json: Value = serde_json::from_str(&msg.to_json().unwrap()).unwrap();

        assert_eq!(json["op"], 0);
        assert_eq!(json["t"], "INSERT");
        assert_eq!(json["s"], 42);
        assert_eq!(json["d"]["content"], "Hi");
    }

    #[test]
    fn test_heartbeat_ack_has_no_fields() {
        let json = GatewayMessage::heartbeat_ack().to_json().unwrap();
        assert_eq!(json, r#"{"op":11}"#);
    }

    #[test]
    fn test_parse_subscribe() {
        let thread_id = Uuid::new_v4();
        let text = format!(r#"{{"op":3,"d":{{"threadId":"{thread_id}"}}}}"#);
        let msg = GatewayMessage::from_json(&text).unwrap();

        assert_eq!(msg.as_subscribe(), Some(ThreadPayload { thread_id }));
        // Wrong op for the accessor
        assert!(msg.as_unsubscribe().is_none());
    }

    #[test]
    fn test_parse_heartbeat() {
        let msg = GatewayMessage::from_json(r#"{"op":1,"d":41}"#).unwrap();
        assert_eq!(msg.as_heartbeat_seq(), Some(Some(41)));

        let msg = GatewayMessage::from_json(r#"{"op":1}"#).unwrap();
        assert_eq!(msg.as_heartbeat_seq(), Some(None));
    }

    #[test]
    fn test_malformed_identify_is_none() {
        let msg = GatewayMessage::from_json(r#"{"op":2,"d":"not an object"}"#).unwrap();
        assert!(msg.as_identify().is_none());
    }

    #[test]
    fn test_close_frame() {
        let (code, desc) = GatewayMessage::close_frame(CloseCode::ThreadForbidden);
        assert_eq!(code, 4010);
        assert_eq!(desc, "Thread not accessible");
    }
}

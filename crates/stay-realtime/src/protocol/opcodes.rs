//! Gateway operation codes
//!
//! Encoded on the wire as a bare integer in the `op` field.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum OpCode {
    /// Server event push: READY, SUBSCRIBED, INSERT, ...
    Dispatch = 0,
    Heartbeat = 1,
    /// Staff JWT or guest token
    Identify = 2,
    Subscribe = 3,
    Unsubscribe = 4,
    /// First frame after the upgrade, carries the heartbeat interval
    Hello = 10,
    HeartbeatAck = 11,
}

impl OpCode {
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Whether a client may send this op; the server closes the connection
    /// with `UnknownOpcode` otherwise.
    #[must_use]
    pub const fn is_client_op(self) -> bool {
        matches!(
            self,
            Self::Heartbeat | Self::Identify | Self::Subscribe | Self::Unsubscribe
        )
    }
}

impl TryFrom<u8> for OpCode {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => Self::Dispatch,
            1 => Self::Heartbeat,
            2 => Self::Identify,
            3 => Self::Subscribe,
            4 => Self::Unsubscribe,
            10 => Self::Hello,
            11 => Self::HeartbeatAck,
            other => return Err(format!("invalid op code: {other}")),
        })
    }
}

impl From<OpCode> for u8 {
    fn from(op: OpCode) -> Self {
        op.as_u8()
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?} ({})", self.as_u8())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_and_unknown_values() {
        assert_eq!(OpCode::try_from(0), Ok(OpCode::Dispatch));
        assert_eq!(OpCode::try_from(4), Ok(OpCode::Unsubscribe));
        assert_eq!(OpCode::try_from(11), Ok(OpCode::HeartbeatAck));
        assert!(OpCode::try_from(5).is_err());
        assert!(OpCode::try_from(255).is_err());
    }

    #[test]
    fn test_only_client_ops_are_accepted_from_clients() {
        let client: Vec<u8> = (0..=u8::MAX)
            .filter_map(|v| OpCode::try_from(v).ok())
            .filter(|op| op.is_client_op())
            .map(u8::from)
            .collect();
        assert_eq!(client, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_wire_encoding_is_numeric() {
        assert_eq!(serde_json::to_string(&OpCode::Hello).unwrap(), "10");
        let op: OpCode = serde_json::from_str("3").unwrap();
        assert_eq!(op, OpCode::Subscribe);
        assert!(serde_json::from_str::<OpCode>("9").is_err());
        assert_eq!(OpCode::Identify.to_string(), "Identify (2)");
    }
}

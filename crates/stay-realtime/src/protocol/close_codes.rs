//! Application close codes sent when the gateway ends a connection
//!
//! Codes live in the 4000-4999 range reserved for applications. The client
//! reconnects after any code where the same credentials could succeed.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum CloseCode {
    UnknownError = 4000,
    UnknownOpcode = 4001,
    DecodeError = 4002,
    /// A frame other than Identify or Heartbeat arrived before Identify
    NotAuthenticated = 4003,
    /// Staff JWT or guest token rejected
    AuthenticationFailed = 4004,
    AlreadyAuthenticated = 4005,
    /// No heartbeat within the timeout
    SessionTimeout = 4009,
    /// Subscribe named a thread outside the session's scope
    ThreadForbidden = 4010,
}

const ALL: [CloseCode; 8] = [
    CloseCode::UnknownError,
    CloseCode::UnknownOpcode,
    CloseCode::DecodeError,
    CloseCode::NotAuthenticated,
    CloseCode::AuthenticationFailed,
    CloseCode::AlreadyAuthenticated,
    CloseCode::SessionTimeout,
    CloseCode::ThreadForbidden,
];

impl CloseCode {
    #[must_use]
    pub fn from_u16(value: u16) -> Option<Self> {
        ALL.into_iter().find(|code| code.as_u16() == value)
    }

    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Auth and authorization failures are final; everything else is worth
    /// another connection attempt.
    #[must_use]
    pub const fn should_reconnect(self) -> bool {
        !matches!(
            self,
            Self::NotAuthenticated | Self::AuthenticationFailed | Self::ThreadForbidden
        )
    }

    /// Reason text carried in the close frame
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::UnknownError => "Something went wrong on the gateway",
            Self::UnknownOpcode => "Opcode not accepted from clients",
            Self::DecodeError => "Frame is not a valid gateway payload",
            Self::NotAuthenticated => "Identify before sending other frames",
            Self::AuthenticationFailed => "Credentials were rejected",
            Self::AlreadyAuthenticated => "Session already identified",
            Self::SessionTimeout => "Heartbeat not received in time",
            Self::ThreadForbidden => "Thread not accessible",
        }
    }
}

impl fmt::Display for CloseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.as_u16(), self.description())
    }
}

impl From<CloseCode> for u16 {
    fn from(code: CloseCode) -> Self {
        code.as_u16()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_round_trip_through_u16() {
        for code in ALL {
            assert_eq!(CloseCode::from_u16(code.as_u16()), Some(code));
        }
        assert_eq!(CloseCode::from_u16(1000), None);
        assert_eq!(CloseCode::from_u16(4006), None);
    }

    #[test]
    fn test_credential_failures_are_final() {
        assert!(CloseCode::UnknownError.should_reconnect());
        assert!(CloseCode::SessionTimeout.should_reconnect());
        assert!(CloseCode::AlreadyAuthenticated.should_reconnect());

        assert!(!CloseCode::NotAuthenticated.should_reconnect());
        assert!(!CloseCode::AuthenticationFailed.should_reconnect());
        assert!(!CloseCode::ThreadForbidden.should_reconnect());
    }

    #[test]
    fn test_display_carries_numeric_code() {
        assert_eq!(
            CloseCode::ThreadForbidden.to_string(),
            "4010 Thread not accessible"
        );
    }
}

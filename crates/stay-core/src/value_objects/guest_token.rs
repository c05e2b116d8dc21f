//! Guest portal token
//!
//! The portal URL carries an opaque token instead of the reservation id.
//! Only the shape is checked here; lookup happens in the repository.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Minimum accepted token length
pub const MIN_TOKEN_LEN: usize = 16;
/// Maximum accepted token length
pub const MAX_TOKEN_LEN: usize = 128;

/// A syntactically valid guest portal token
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GuestToken(String);

impl GuestToken {
    /// Validate and wrap a raw token
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let len = raw.len();
        if !(MIN_TOKEN_LEN..=MAX_TOKEN_LEN).contains(&len) {
            return Err(DomainError::InvalidGuestToken);
        }
        if !raw
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
        {
            return Err(DomainError::InvalidGuestToken);
        }
        Ok(Self(raw.to_string()))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for GuestToken {
    // Tokens are credentials; only a prefix goes into logs.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}…", &self.0[..6.min(self.0.len())])
    }
}

impl AsRef<str> for GuestToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        let token = GuestToken::parse("abcDEF123_-xyz789").unwrap();
        assert_eq!(token.as_str(), "abcDEF123_-xyz789");
    }

    #[test]
    fn test_parse_rejects_short_and_bad_chars() {
        assert!(GuestToken::parse("short").is_err());
        assert!(GuestToken::parse("abcdefghijklmnop/../").is_err());
        assert!(GuestToken::parse(&"a".repeat(MAX_TOKEN_LEN + 1)).is_err());
    }

    #[test]
    fn test_display_is_redacted() {
        let token = GuestToken::parse("abcdefghijklmnopqrstuvwxyz").unwrap();
        assert_eq!(token.to_string(), "abcdef…");
    }
}

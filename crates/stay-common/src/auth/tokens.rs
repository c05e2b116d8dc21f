//! Random guest-portal tokens and shared-secret comparison

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::RngCore;

/// Entropy in a guest portal token
pub const GUEST_TOKEN_BYTES: usize = 32;

/// Generate a new guest portal token: 32 random bytes, URL-safe base64
#[must_use]
pub fn generate_guest_token() -> String {
    let mut bytes = [0u8; GUEST_TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Compare a presented secret with the configured one in constant time
#[must_use]
pub fn secrets_match(presented: &str, expected: &str) -> bool {
    let (a, b) = (presented.as_bytes(), expected.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use stay_core::GuestToken;

    #[test]
    fn test_guest_token_shape() {
        let token = generate_guest_token();
        assert_eq!(token.len(), 43);
        assert!(GuestToken::parse(&token).is_ok());
        assert_ne!(token, generate_guest_token());
    }

    #[test]
    fn test_secrets_match() {
        assert!(secrets_match("s3cret", "s3cret"));
        assert!(!secrets_match("s3cret", "s3cre"));
        assert!(!secrets_match("s3cret", "S3cret"));
    }
}

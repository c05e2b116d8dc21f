//! JWT utilities for authentication
//!
//! Bearer tokens are issued by the hosted auth provider (HS256, shared
//! secret). This service verifies them; `issue_token` exists for local
//! tooling and tests.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user UUID)
    pub sub: String,
    /// Issued at (Unix timestamp)
    #[serde(default)]
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Audience, usually `authenticated`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
    /// Provider role claim; application roles live in the user profile
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Claims {
    /// Get the user ID
    ///
    /// # Errors
    /// Returns an error if the subject is not a UUID
    pub fn user_id(&self) -> Result<Uuid, AppError> {
        self.sub.parse::<Uuid>().map_err(|_| AppError::InvalidToken)
    }

    /// Check if the token is expired
    #[must_use]
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }
}

/// JWT service for verifying and issuing tokens
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    audience: Option<String>,
    access_token_expiry: i64,
}

impl JwtService {
    /// Create a new JWT service. An empty `audience` disables the `aud` check.
    #[must_use]
    pub fn new(secret: &str, audience: &str, access_token_expiry: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            audience: (!audience.is_empty()).then(|| audience.to_string()),
            access_token_expiry,
        }
    }

    /// Issue a token for a user
    ///
    /// # Errors
    /// Returns an error if token encoding fails
    pub fn issue_token(&self, user_id: Uuid, email: Option<String>) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.access_token_expiry)).timestamp(),
            aud: self.audience.clone(),
            role: Some("authenticated".to_string()),
            email,
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|_| AppError::Internal(anyhow::anyhow!("Failed to encode JWT")))
    }

    /// Decode and validate a JWT token
    ///
    /// # Errors
    /// Returns an error if the token is invalid, expired, or for another audience
    pub fn decode_token(&self, token: &str) -> Result<Claims, AppError> {
        let mut validation = Validation::default();
        match &self.audience {
            Some(aud) => validation.set_audience(&[aud]),
            None => validation.validate_aud = false,
        }

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => AppError::TokenExpired,
                _ => AppError::InvalidToken,
            }
        })?;

        Ok(token_data.claims)
    }

    /// Validate a bearer token and return the authenticated user ID
    ///
    /// # Errors
    /// Returns an error if the token is invalid or the subject is not a UUID
    pub fn authenticate(&self, token: &str) -> Result<(Uuid, Claims), AppError> {
        let claims = self.decode_token(token)?;
        let user_id = claims.user_id()?;
        Ok((user_id, claims))
    }
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("audience", &self.audience)
            .field("access_token_expiry", &self.access_token_expiry)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-that-is-long-enough";

    fn create_test_service() -> JwtService {
        JwtService::new(SECRET, "authenticated", 900)
    }

    #[test]
    fn test_issue_and_authenticate() {
        let service = create_test_service();
        let user_id = Uuid::new_v4();

        let token = service
            .issue_token(user_id, Some("host@example.com".to_string()))
            .unwrap();
        let (id, claims) = service.authenticate(&token).unwrap();

        assert_eq!(id, user_id);
        assert_eq!(claims.aud.as_deref(), Some("authenticated"));
        assert_eq!(claims.email.as_deref(), Some("host@example.com"));
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_wrong_audience_rejected() {
        let issuer = JwtService::new(SECRET, "service_role", 900);
        let token = issuer.issue_token(Uuid::new_v4(), None).unwrap();

        let result = create_test_service().decode_token(&token);
        assert!(matches!(result, Err(AppError::InvalidToken)));

        let lenient = JwtService::new(SECRET, "", 900);
        assert!(lenient.decode_token(&token).is_ok());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let issuer = JwtService::new("another-secret-entirely", "authenticated", 900);
        let token = issuer.issue_token(Uuid::new_v4(), None).unwrap();
        assert!(create_test_service().decode_token(&token).is_err());
    }

    #[test]
    fn test_expired_token() {
        let service = JwtService::new(SECRET, "authenticated", -3600);
        let token = service.issue_token(Uuid::new_v4(), None).unwrap();
        assert!(matches!(service.decode_token(&token), Err(AppError::TokenExpired)));
    }

    #[test]
    fn test_invalid_token() {
        let service = create_test_service();
        let result = service.decode_token("invalid.token.here");
        assert!(matches!(result, Err(AppError::InvalidToken)));
    }

    #[test]
    fn test_claims_user_id() {
        let claims = Claims {
            sub: "not-a-uuid".to_string(),
            iat: 0,
            exp: i64::MAX,
            aud: None,
            role: None,
            email: None,
        };
        assert!(matches!(claims.user_id(), Err(AppError::InvalidToken)));
    }
}

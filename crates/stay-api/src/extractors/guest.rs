//! Guest portal token extractor

use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use stay_core::GuestToken;

use crate::response::ApiError;

/// Well-formed guest token taken from the `:token` path segment
///
/// Only the shape is checked here; the portal service resolves the token to
/// a reservation.
#[derive(Debug, Clone)]
pub struct GuestTokenPath(pub GuestToken);

impl GuestTokenPath {
    #[inline]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for GuestTokenPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::invalid_path(e.to_string()))?;

        Ok(GuestTokenPath(GuestToken::parse(&raw)?))
    }
}

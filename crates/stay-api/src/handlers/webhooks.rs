//! Inbound webhook handlers

use axum::{extract::State, http::HeaderMap, Json};
use stay_common::secrets_match;
use stay_service::dto::{Beds24WebhookPayload, Beds24WebhookResponse};
use stay_service::services::Beds24Service;
use tracing::warn;

use crate::extractors::JsonBody;
use crate::response::{ApiError, ApiResult};
use crate::state::AppState;

/// Header carrying the shared webhook secret
pub const WEBHOOK_SECRET_HEADER: &str = "x-webhook-secret";

/// Check the shared secret when one is configured
pub fn verify_secret(headers: &HeaderMap, expected: Option<&str>) -> Result<(), ApiError> {
    let Some(expected) = expected.filter(|s| !s.is_empty()) else {
        return Ok(());
    };

    let presented = headers
        .get(WEBHOOK_SECRET_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if secrets_match(presented, expected) {
        Ok(())
    } else {
        warn!("Rejected Beds24 webhook with a bad secret");
        Err(ApiError::InvalidWebhookSecret)
    }
}

/// Import or update a booking pushed by Beds24
///
/// POST /api/webhooks/beds24
pub async fn beds24(
    State(state): State<AppState>,
    headers: HeaderMap,
    JsonBody(payload): JsonBody<Beds24WebhookPayload>,
) -> ApiResult<Json<Beds24WebhookResponse>> {
    verify_secret(&headers, state.config().webhooks.beds24_secret.as_deref())?;

    let service = Beds24Service::new(state.service_context());
    Ok(Json(service.handle_webhook(payload).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(secret: Option<&'static str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(secret) = secret {
            headers.insert(WEBHOOK_SECRET_HEADER, HeaderValue::from_static(secret));
        }
        headers
    }

    #[test]
    fn test_no_configured_secret_accepts_anything() {
        assert!(verify_secret(&headers(None), None).is_ok());
        assert!(verify_secret(&headers(Some("whatever")), Some("")).is_ok());
    }

    #[test]
    fn test_configured_secret_is_enforced() {
        assert!(verify_secret(&headers(Some("hook-secret")), Some("hook-secret")).is_ok());

        let err = verify_secret(&headers(Some("guess")), Some("hook-secret")).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_WEBHOOK_SECRET");

        assert!(verify_secret(&headers(None), Some("hook-secret")).is_err());
    }
}

//! Middleware stack for the API server
//!
//! Request ids, tracing, timeouts, compression, CORS and rate limiting.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{header, HeaderName, HeaderValue, Method, Request, StatusCode},
    Router,
};
use stay_common::{CorsConfig, RateLimitConfig};
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::GlobalKeyExtractor, GovernorLayer,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

/// Header name for request ID
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Upper bound for a single request
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Apply the middleware stack with rate limiting and configured CORS
///
/// Request order: rate limit, request id, trace, timeout, compression, CORS,
/// handler. Layers added later wrap the earlier ones.
pub fn apply_middleware_with_config(
    router: Router<AppState>,
    rate_limit_config: &RateLimitConfig,
    cors_config: &CorsConfig,
    is_production: bool,
) -> Router<AppState> {
    let router = router
        .layer(create_cors_layer_from_config(cors_config, is_production))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::SERVICE_UNAVAILABLE,
            REQUEST_TIMEOUT,
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = request
                        .headers()
                        .get(REQUEST_ID_HEADER)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("unknown");

                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri().path(),
                        request_id = %request_id,
                    )
                })
                .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            REQUEST_ID_HEADER,
        )))
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static(REQUEST_ID_HEADER),
            MakeRequestUuid,
        ));

    // The rate limiter is global rather than per client IP: the API sits
    // behind a proxy that does not forward a trustworthy peer address.
    let governor_conf = GovernorConfigBuilder::default()
        .per_second(rate_limit_config.requests_per_second.max(1).into())
        .burst_size(rate_limit_config.burst.max(1))
        .key_extractor(GlobalKeyExtractor)
        .finish();

    match governor_conf {
        Some(config) => router.layer(GovernorLayer {
            config: Arc::new(config),
        }),
        None => {
            tracing::warn!(
                requests_per_second = rate_limit_config.requests_per_second,
                burst = rate_limit_config.burst,
                "Invalid rate limit configuration; rate limiting disabled"
            );
            router
        }
    }
}

/// Create CORS layer from configuration
fn create_cors_layer_from_config(config: &CorsConfig, is_production: bool) -> CorsLayer {
    let base_layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
        .expose_headers([
            HeaderName::from_static(REQUEST_ID_HEADER),
            HeaderName::from_static("x-ratelimit-limit"),
            HeaderName::from_static("x-ratelimit-remaining"),
            HeaderName::from_static("x-ratelimit-reset"),
        ]);

    // Production only allows configured origins; development allows any
    // origin unless a list is configured.
    if !is_production && config.allowed_origins.is_empty() {
        tracing::warn!(
            "CORS: Allowing any origin (development mode). \
             Configure CORS_ORIGINS for production."
        );
        return base_layer.allow_origin(Any);
    }

    if config.allowed_origins.is_empty() {
        tracing::warn!(
            "CORS: No allowed origins configured in production mode. \
             Requests from browsers will be blocked."
        );
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!("Invalid CORS origin: {}", origin);
                None
            })
        })
        .collect();

    tracing::info!("CORS: Allowing {} configured origins", origins.len());
    base_layer.allow_origin(AllowOrigin::list(origins))
}

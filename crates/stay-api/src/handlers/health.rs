//! Liveness and readiness probes for the load balancer

use axum::{extract::State, http::StatusCode, Json};
use stay_service::dto::{HealthResponse, ReadinessResponse};

use crate::state::AppState;

/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

/// GET /ready
///
/// 503 until both PostgreSQL and Redis answer.
pub async fn readiness_check(State(state): State<AppState>) -> (StatusCode, Json<ReadinessResponse>) {
    let ctx = state.service_context();
    let (db, redis) = tokio::join!(stay_db::ping(ctx.pool()), ctx.redis_pool().health_check());

    if let Err(e) = &db {
        tracing::warn!(error = %e, "Readiness: database unreachable");
    }
    if let Err(e) = &redis {
        tracing::warn!(error = %e, "Readiness: redis unreachable");
    }

    let response = ReadinessResponse::ready(db.is_ok(), redis.is_ok());
    let status = if db.is_ok() && redis.is_ok() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(response))
}

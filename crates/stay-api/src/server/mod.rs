//! Server setup and initialization
//!
//! Builds the application, wires the dependencies and runs the HTTP server
//! next to the scheduled-message dispatcher.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use stay_cache::RedisPool;
use stay_common::{AppConfig, AppError, JwtService};
use stay_db::{create_pool, DatabaseConfig};
use stay_service::{MessageDispatcher, ServiceContext};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::middleware::apply_middleware_with_config;
use crate::routes::create_router;
use crate::state::AppState;

/// Build the complete Axum application with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    let config = state.config();
    let router = apply_middleware_with_config(
        create_router(),
        &config.rate_limit,
        &config.cors,
        config.app.env.is_production(),
    );
    router.with_state(state)
}

/// Initialize all dependencies and create `AppState`
pub async fn create_app_state(config: AppConfig) -> Result<AppState, AppError> {
    info!("Connecting to PostgreSQL...");
    let pool = create_pool(&DatabaseConfig::from(&config.database))
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    info!("PostgreSQL connection established");

    info!("Connecting to Redis...");
    let redis_pool = RedisPool::from_config(&config.redis).map_err(|e| AppError::Cache(e.to_string()))?;
    info!("Redis pool ready");

    let jwt_service = Arc::new(JwtService::new(
        &config.jwt.secret,
        &config.jwt.audience,
        config.jwt.access_token_expiry,
    ));

    let service_context =
        ServiceContext::postgres(pool, redis_pool, jwt_service, config.portal.clone());

    Ok(AppState::new(service_context, config))
}

/// Resolve once Ctrl-C is received
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Run the HTTP server until `shutdown` resolves
pub async fn run_server(
    app: Router,
    addr: SocketAddr,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> Result<(), AppError> {
    info!("Starting HTTP server on {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {addr}: {e}")))?;

    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| AppError::Config(format!("Server error: {e}")))?;

    Ok(())
}

/// Run the API server and, when enabled, the message dispatcher
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr: SocketAddr = config
        .api
        .address()
        .parse()
        .map_err(|e| AppError::Config(format!("Invalid API address: {e}")))?;
    let scheduler = config.scheduler.clone();

    let state = create_app_state(config).await?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let dispatcher = scheduler.enabled.then(|| {
        MessageDispatcher::new(state.shared_context(), scheduler).spawn(shutdown_rx)
    });
    if dispatcher.is_none() {
        info!("Message dispatcher disabled");
    }

    let app = create_app(state);
    let result = run_server(app, addr, shutdown_signal()).await;

    let _ = shutdown_tx.send(true);
    if let Some(handle) = dispatcher {
        if let Err(e) = handle.await {
            warn!(error = %e, "Message dispatcher task ended abnormally");
        }
    }

    result
}

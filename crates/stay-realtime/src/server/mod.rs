//! Gateway server setup

mod handler;
mod state;

pub use handler::{gateway_handler, HEARTBEAT_INTERVAL_MS, HEARTBEAT_TIMEOUT_MS};
pub use state::GatewayState;

use crate::broadcast::{EventDispatcher, EventDispatcherConfig};
use crate::connection::ConnectionManager;
use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};
use stay_cache::RedisPool;
use stay_common::{AppConfig, AppError, JwtService};
use stay_db::{create_pool, DatabaseConfig};
use stay_service::ServiceContext;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// How often connections whose socket task died are swept
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Create the gateway router
pub fn create_router() -> Router<GatewayState> {
    Router::new()
        .route("/ws", get(gateway_handler))
        .route("/health", get(health_check))
}

async fn health_check(State(state): State<GatewayState>) -> Json<Value> {
    let manager = state.connection_manager();
    Json(json!({
        "status": "ok",
        "connections": manager.connection_count(),
        "threads": manager.thread_count(),
        "dispatcher": state.event_dispatcher().is_running(),
    }))
}

/// Build the complete application
pub fn create_app(state: GatewayState) -> Router {
    create_router()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Initialize all dependencies and create `GatewayState`
pub async fn create_gateway_state(config: AppConfig) -> Result<GatewayState, AppError> {
    info!("Connecting to PostgreSQL...");
    let pool = create_pool(&DatabaseConfig::from(&config.database))
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    info!("PostgreSQL connection established");

    let redis_pool =
        RedisPool::from_config(&config.redis).map_err(|e| AppError::Cache(e.to_string()))?;

    let jwt_service = Arc::new(JwtService::new(
        &config.jwt.secret,
        &config.jwt.audience,
        config.jwt.access_token_expiry,
    ));
    let service_context =
        ServiceContext::postgres(pool, redis_pool, jwt_service, config.portal.clone());

    let connection_manager = ConnectionManager::new_shared();
    let event_dispatcher = EventDispatcher::new(
        EventDispatcherConfig::from(&config.redis),
        connection_manager.clone(),
    )
    .await
    .map_err(|e| AppError::Cache(format!("Failed to create event dispatcher: {e}")))?;
    let event_dispatcher = Arc::new(event_dispatcher);
    event_dispatcher.clone().start();

    Ok(GatewayState::new(
        service_context,
        connection_manager,
        event_dispatcher,
    ))
}

/// Periodically drop connections whose socket task ended without cleanup
fn spawn_sweeper(state: &GatewayState) -> tokio::task::JoinHandle<()> {
    let manager = state.shared_connection_manager();
    let dispatcher = state.shared_event_dispatcher();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(SWEEP_INTERVAL);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let emptied = manager.cleanup_closed_connections().await;
            dispatcher.release_threads(&emptied).await;
        }
    })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Run the gateway until `shutdown` resolves
pub async fn run_server(
    app: Router,
    addr: SocketAddr,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> Result<(), AppError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {addr}: {e}")))?;

    info!("Gateway listening on ws://{}/ws", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| AppError::Config(format!("Server error: {e}")))
}

/// Run the gateway with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr: SocketAddr = config
        .realtime
        .address()
        .parse()
        .map_err(|e| AppError::Config(format!("Invalid realtime address: {e}")))?;

    let state = create_gateway_state(config).await?;
    let sweeper = spawn_sweeper(&state);
    let dispatcher = state.shared_event_dispatcher();

    let result = run_server(create_app(state), addr, shutdown_signal()).await;

    sweeper.abort();
    dispatcher.stop().await;
    result
}

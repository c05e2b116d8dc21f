//! Realtime gateway entry point
//!
//! Run with:
//! ```bash
//! cargo run -p stay-realtime
//! ```
//!
//! Configuration is loaded from environment variables.

use stay_common::{try_init_tracing_with_config, AppConfig, TracingConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = try_init_tracing_with_config(TracingConfig::for_environment(config.app.env)) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    info!(
        env = ?config.app.env,
        port = config.realtime.port,
        "Starting realtime gateway"
    );

    if let Err(e) = stay_realtime::run(config).await {
        error!(error = %e, "Gateway failed");
        std::process::exit(1);
    }
}

//! Tracing and logging setup
//!
//! Configures the `tracing` subscriber with environment-based filtering.

use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::config::Environment;

/// Tracing configuration options
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Log level filter used when `RUST_LOG` is not set
    pub level: Level,
    /// Emit JSON lines instead of human-readable output
    pub json_format: bool,
    /// Include the event target (module path)
    pub with_target: bool,
    /// Include file and line numbers
    pub with_file: bool,
    /// Include thread IDs
    pub with_thread_ids: bool,
    /// Log span open/close events
    pub span_events: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            json_format: false,
            with_target: true,
            with_file: true,
            with_thread_ids: false,
            span_events: false,
        }
    }
}

impl TracingConfig {
    /// Debug logging with span events
    #[must_use]
    pub fn development() -> Self {
        Self {
            level: Level::DEBUG,
            span_events: true,
            ..Self::default()
        }
    }

    /// JSON logging for log shippers
    #[must_use]
    pub fn production() -> Self {
        Self {
            level: Level::INFO,
            json_format: true,
            with_target: true,
            with_file: false,
            with_thread_ids: false,
            span_events: false,
        }
    }

    /// Pick a preset for the running environment
    #[must_use]
    pub fn for_environment(env: Environment) -> Self {
        if env.is_production() {
            Self::production()
        } else if env.is_development() {
            Self::development()
        } else {
            Self::default()
        }
    }

    fn fmt_span(&self) -> FmtSpan {
        if self.span_events {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        }
    }
}

/// Try to initialize tracing with the default configuration
///
/// Uses `RUST_LOG` for filtering if set, otherwise defaults to "info".
pub fn try_init_tracing() -> Result<(), TracingError> {
    try_init_tracing_with_config(TracingConfig::default())
}

/// Try to initialize tracing with custom configuration
///
/// Returns `AlreadyInitialized` instead of panicking when a global
/// subscriber is already set (tests, embedded use).
pub fn try_init_tracing_with_config(config: TracingConfig) -> Result<(), TracingError> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.to_string()));

    // Only one of the two is Some; Option<Layer> is itself a layer.
    let json_layer = config.json_format.then(|| {
        fmt::layer()
            .json()
            .with_target(config.with_target)
            .with_file(config.with_file)
            .with_line_number(config.with_file)
            .with_thread_ids(config.with_thread_ids)
            .with_span_events(config.fmt_span())
    });
    let text_layer = (!config.json_format).then(|| {
        fmt::layer()
            .with_target(config.with_target)
            .with_file(config.with_file)
            .with_line_number(config.with_file)
            .with_thread_ids(config.with_thread_ids)
            .with_span_events(config.fmt_span())
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .try_init()
        .map_err(|_| TracingError::AlreadyInitialized)
}

/// Tracing initialization errors
#[derive(Debug, thiserror::Error)]
pub enum TracingError {
    #[error("Tracing subscriber already initialized")]
    AlreadyInitialized,
}

//! # stay-common
//!
//! Shared utilities including configuration, error handling, authentication, and telemetry.

pub mod auth;
pub mod config;
pub mod error;
pub mod telemetry;

// Re-export commonly used types at crate root
pub use auth::{generate_guest_token, secrets_match, Claims, JwtService};
pub use config::{
    AppConfig, AppSettings, ConfigError, CorsConfig, DatabaseSettings, Environment, JwtConfig,
    PortalConfig, RateLimitConfig, RedisConfig, SchedulerConfig, ServerConfig, WebhookConfig,
};
pub use error::{domain_status, AppError, AppResult};
pub use telemetry::{try_init_tracing, try_init_tracing_with_config, TracingConfig, TracingError};

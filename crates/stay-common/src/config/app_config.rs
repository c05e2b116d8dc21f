//! Application configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file when present).

use serde::Deserialize;
use std::env;
use std::str::FromStr;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub api: ServerConfig,
    pub realtime: ServerConfig,
    pub database: DatabaseSettings,
    pub redis: RedisConfig,
    pub jwt: JwtConfig,
    pub rate_limit: RateLimitConfig,
    pub cors: CorsConfig,
    pub scheduler: SchedulerConfig,
    pub portal: PortalConfig,
    pub webhooks: WebhookConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default)]
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Some(Self::Production),
            "staging" => Some(Self::Staging),
            "development" | "dev" => Some(Self::Development),
            _ => None,
        }
    }
}

/// Server configuration (for both the REST API and the realtime gateway)
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Database connection settings
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Redis configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: String,
    #[serde(default = "default_redis_max_connections")]
    pub max_connections: u32,
}

/// Settings for verifying bearer tokens issued by the hosted auth provider
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    /// Expected `aud` claim; empty disables the audience check
    #[serde(default = "default_jwt_audience")]
    pub audience: String,
    /// Lifetime of tokens issued locally (dev tooling, tests)
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry: i64,
}

/// Rate limiting configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,
    #[serde(default = "default_burst")]
    pub burst: u32,
}

/// CORS configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

/// Scheduled-message dispatcher settings
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_scheduler_interval")]
    pub interval_secs: u64,
    #[serde(default = "default_scheduler_batch")]
    pub batch_size: i64,
    /// How long a claimed row stays invisible to other dispatchers
    #[serde(default = "default_scheduler_lease")]
    pub lease_secs: i64,
}

/// Guest portal settings
#[derive(Debug, Clone, Deserialize)]
pub struct PortalConfig {
    /// Base URL that guest tokens are appended to in messages
    #[serde(default = "default_portal_base_url")]
    pub public_base_url: String,
    /// IANA timezone used when a property has none
    #[serde(default = "default_timezone")]
    pub default_timezone: String,
}

impl PortalConfig {
    /// Portal link for a guest token
    #[must_use]
    pub fn guest_url(&self, token: &str) -> String {
        format!("{}/guest/{}", self.public_base_url.trim_end_matches('/'), token)
    }
}

/// Inbound webhook settings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookConfig {
    /// Shared secret expected in `x-webhook-secret`; unset accepts any caller
    #[serde(default)]
    pub beds24_secret: Option<String>,
}

// Default value functions
fn default_app_name() -> String {
    "stayflow".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_api_port() -> u16 {
    8080
}

fn default_realtime_port() -> u16 {
    8081
}

fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    2
}

fn default_redis_max_connections() -> u32 {
    10
}

fn default_jwt_audience() -> String {
    "authenticated".to_string()
}

fn default_access_token_expiry() -> i64 {
    3600 // 1 hour
}

fn default_requests_per_second() -> u32 {
    10
}

fn default_burst() -> u32 {
    50
}

fn default_true() -> bool {
    true
}

fn default_scheduler_interval() -> u64 {
    30
}

fn default_scheduler_batch() -> i64 {
    50
}

fn default_scheduler_lease() -> i64 {
    300
}

fn default_portal_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_timezone() -> String {
    "Asia/Tokyo".to_string()
}

/// Read and parse an optional variable, falling back to `default` when unset.
/// A value that is set but unparsable is an error rather than silently ignored.
fn parse_var<T: FromStr>(name: &'static str, default: impl FnOnce() -> T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(name, raw)),
        _ => Ok(default()),
    }
}

fn required_var(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::MissingVar(name))
}

fn optional_var(name: &'static str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing or malformed
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let env_name = optional_var("APP_ENV");
        let environment = match env_name {
            Some(raw) => Environment::parse(&raw).ok_or(ConfigError::InvalidValue("APP_ENV", raw))?,
            None => Environment::default(),
        };

        let timezone = env::var("DEFAULT_TIMEZONE").unwrap_or_else(|_| default_timezone());
        if stay_core::automation::parse_timezone(&timezone).is_err() {
            return Err(ConfigError::InvalidValue("DEFAULT_TIMEZONE", timezone));
        }

        Ok(Self {
            app: AppSettings {
                name: env::var("APP_NAME").unwrap_or_else(|_| default_app_name()),
                env: environment,
            },
            api: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| default_host()),
                port: parse_var("SERVER_PORT", default_api_port)?,
            },
            realtime: ServerConfig {
                host: env::var("REALTIME_HOST").unwrap_or_else(|_| default_host()),
                port: parse_var("REALTIME_PORT", default_realtime_port)?,
            },
            database: DatabaseSettings {
                url: required_var("DATABASE_URL")?,
                max_connections: parse_var("DATABASE_MAX_CONNECTIONS", default_max_connections)?,
                min_connections: parse_var("DATABASE_MIN_CONNECTIONS", default_min_connections)?,
            },
            redis: RedisConfig {
                url: required_var("REDIS_URL")?,
                max_connections: parse_var("REDIS_MAX_CONNECTIONS", default_redis_max_connections)?,
            },
            jwt: JwtConfig {
                secret: required_var("JWT_SECRET")?,
                audience: env::var("JWT_AUDIENCE").unwrap_or_else(|_| default_jwt_audience()),
                access_token_expiry: parse_var("JWT_ACCESS_TOKEN_EXPIRY", default_access_token_expiry)?,
            },
            rate_limit: RateLimitConfig {
                requests_per_second: parse_var("RATE_LIMIT_PER_SECOND", default_requests_per_second)?,
                burst: parse_var("RATE_LIMIT_BURST", default_burst)?,
            },
            cors: CorsConfig {
                allowed_origins: env::var("CORS_ORIGINS")
                    .ok()
                    .map(|s| {
                        s.split(',')
                            .map(str::trim)
                            .filter(|o| !o.is_empty())
                            .map(String::from)
                            .collect()
                    })
                    .unwrap_or_default(),
            },
            scheduler: SchedulerConfig {
                enabled: parse_var("SCHEDULER_ENABLED", default_true)?,
                interval_secs: parse_var("SCHEDULER_INTERVAL_SECS", default_scheduler_interval)?,
                batch_size: parse_var("SCHEDULER_BATCH_SIZE", default_scheduler_batch)?,
                lease_secs: parse_var("SCHEDULER_LEASE_SECS", default_scheduler_lease)?,
            },
            portal: PortalConfig {
                public_base_url: env::var("PORTAL_BASE_URL")
                    .unwrap_or_else(|_| default_portal_base_url()),
                default_timezone: timezone,
            },
            webhooks: WebhookConfig {
                beds24_secret: optional_var("BEDS24_WEBHOOK_SECRET"),
            },
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_parse() {
        assert_eq!(Environment::parse("PRODUCTION"), Some(Environment::Production));
        assert_eq!(Environment::parse("dev"), Some(Environment::Development));
        assert_eq!(Environment::parse("qa"), None);
        assert!(Environment::Production.is_production());
        assert!(!Environment::Staging.is_development());
    }

    #[test]
    fn test_server_address() {
        let config = ServerConfig {
            host: "0.0.0.0".to_string(),
            port: 8080,
        };
        assert_eq!(config.address(), "0.0.0.0:8080");
    }

    #[test]
    fn test_guest_url() {
        let portal = PortalConfig {
            public_base_url: "https://stay.example.com/".to_string(),
            default_timezone: default_timezone(),
        };
        assert_eq!(portal.guest_url("abc123"), "https://stay.example.com/guest/abc123");
    }

    #[test]
    fn test_default_values() {
        assert_eq!(default_app_name(), "stayflow");
        assert_eq!(default_host(), "127.0.0.1");
        assert_eq!(default_jwt_audience(), "authenticated");
        assert_eq!(default_timezone(), "Asia/Tokyo");
        assert_eq!(default_scheduler_interval(), 30);
    }

    #[test]
    fn test_parse_var_rejects_garbage() {
        env::set_var("STAYFLOW_TEST_PORT", "not-a-port");
        let result: Result<u16, _> = parse_var("STAYFLOW_TEST_PORT", || 1);
        assert!(matches!(result, Err(ConfigError::InvalidValue("STAYFLOW_TEST_PORT", _))));
        env::remove_var("STAYFLOW_TEST_PORT");

        let fallback: u16 = parse_var("STAYFLOW_TEST_PORT", || 7).unwrap();
        assert_eq!(fallback, 7);
    }
}

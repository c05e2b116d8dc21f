//! PostgreSQL pool construction
//!
//! Pool sizing comes from [`DatabaseSettings`]; timeouts are fixed here.

use sqlx::postgres::{PgPool, PgPoolOptions};
use stay_common::DatabaseSettings;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    /// Connections kept open while idle
    pub min_connections: u32,
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
    /// Connections are recycled after this age even when busy
    pub max_lifetime: Duration,
}

impl DatabaseConfig {
    const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(10);
    const IDLE_TIMEOUT: Duration = Duration::from_secs(5 * 60);
    const MAX_LIFETIME: Duration = Duration::from_secs(30 * 60);

    pub fn new(url: impl Into<String>, max_connections: u32, min_connections: u32) -> Self {
        Self {
            url: url.into(),
            max_connections,
            min_connections: min_connections.min(max_connections),
            acquire_timeout: Self::ACQUIRE_TIMEOUT,
            idle_timeout: Self::IDLE_TIMEOUT,
            max_lifetime: Self::MAX_LIFETIME,
        }
    }

    fn pool_options(&self) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .acquire_timeout(self.acquire_timeout)
            .idle_timeout(self.idle_timeout)
            .max_lifetime(self.max_lifetime)
    }
}

impl From<&DatabaseSettings> for DatabaseConfig {
    fn from(settings: &DatabaseSettings) -> Self {
        Self::new(
            settings.url.clone(),
            settings.max_connections,
            settings.min_connections,
        )
    }
}

/// Open the pool and establish `min_connections` connections
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let pool = config.pool_options().connect(&config.url).await?;
    tracing::debug!(
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        "PostgreSQL pool opened"
    );
    Ok(pool)
}

/// `SELECT 1` through the pool; used by readiness probes
pub async fn ping(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await.map(|_| ())
}

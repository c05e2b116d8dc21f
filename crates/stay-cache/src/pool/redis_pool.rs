//! Pooled Redis connections for publishing and readiness checks.
//!
//! The Pub/Sub subscriber opens its own dedicated connection and does not
//! draw from this pool.

use deadpool_redis::{Config, Pool, PoolConfig, Runtime};

#[derive(Debug, Clone)]
pub struct RedisPoolConfig {
    /// e.g. `redis://:password@localhost:6379/0`
    pub url: String,
    pub max_connections: usize,
}

impl Default for RedisPoolConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            max_connections: 16,
        }
    }
}

impl From<&stay_common::RedisConfig> for RedisPoolConfig {
    fn from(config: &stay_common::RedisConfig) -> Self {
        Self {
            url: config.url.clone(),
            max_connections: config.max_connections as usize,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RedisPoolError {
    #[error("Failed to create Redis pool: {0}")]
    CreatePool(#[from] deadpool_redis::CreatePoolError),

    #[error("No Redis connection available: {0}")]
    GetConnection(#[from] deadpool_redis::PoolError),

    #[error("Redis command error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type RedisResult<T> = Result<T, RedisPoolError>;

#[derive(Clone)]
pub struct RedisPool {
    pool: Pool,
}

impl std::fmt::Debug for RedisPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = self.pool.status();
        f.debug_struct("RedisPool")
            .field("size", &status.size)
            .field("available", &status.available)
            .field("max_size", &status.max_size)
            .finish()
    }
}

impl RedisPool {
    /// Build the pool. Connections are opened lazily on first use, so an
    /// unreachable server is only reported by [`RedisPool::get`].
    pub fn new(config: RedisPoolConfig) -> RedisResult<Self> {
        let pool = Config {
            url: Some(config.url.clone()),
            connection: None,
            pool: Some(PoolConfig::new(config.max_connections)),
        }
        .create_pool(Some(Runtime::Tokio1))?;

        tracing::info!(
            url = %redact_url(&config.url),
            max_connections = config.max_connections,
            "Redis pool created"
        );

        Ok(Self { pool })
    }

    pub fn from_config(config: &stay_common::RedisConfig) -> RedisResult<Self> {
        Self::new(config.into())
    }

    pub async fn get(&self) -> RedisResult<deadpool_redis::Connection> {
        Ok(self.pool.get().await?)
    }

    #[must_use]
    pub fn status(&self) -> deadpool_redis::Status {
        self.pool.status()
    }

    /// Round-trip a PING through a pooled connection
    pub async fn health_check(&self) -> RedisResult<()> {
        let mut conn = self.get().await?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}

/// Host part of a connection URL, without credentials
pub(crate) fn redact_url(url: &str) -> &str {
    url.rsplit('@').next().unwrap_or(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_config_follows_app_config() {
        assert_eq!(RedisPoolConfig::default().max_connections, 16);

        let redis_config = stay_common::RedisConfig {
            url: "redis://localhost:6380".to_string(),
            max_connections: 32,
        };
        let pool_config = RedisPoolConfig::from(&redis_config);
        assert_eq!(pool_config.url, "redis://localhost:6380");
        assert_eq!(pool_config.max_connections, 32);
    }

    #[test]
    fn test_redact_url_drops_password() {
        assert_eq!(redact_url("redis://:hunter2@cache:6379"), "cache:6379");
        assert_eq!(redact_url("redis://cache:6379"), "redis://cache:6379");
    }

    #[tokio::test]
    async fn test_pool_creation_is_lazy() {
        let pool = RedisPool::new(RedisPoolConfig {
            max_connections: 4,
            ..RedisPoolConfig::default()
        })
        .unwrap();
        let status = pool.status();
        assert_eq!(status.size, 0);
        assert_eq!(status.max_size, 4);
    }
}

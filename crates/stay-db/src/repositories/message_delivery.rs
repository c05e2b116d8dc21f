//! PostgreSQL implementation of MessageDeliveryRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use stay_core::entities::MessageDelivery;
use stay_core::traits::{MessageDeliveryRepository, RepoResult};

use crate::mappers::try_collect;
use crate::models::MessageDeliveryModel;

use super::error::map_db_error;

/// PostgreSQL implementation of MessageDeliveryRepository
#[derive(Clone)]
pub struct PgMessageDeliveryRepository {
    pool: PgPool,
}

impl PgMessageDeliveryRepository {
    /// Create a new PgMessageDeliveryRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageDeliveryRepository for PgMessageDeliveryRepository {
    #[instrument(skip(self, delivery), fields(message_id = %delivery.message_id))]
    async fn create(&self, delivery: &MessageDelivery) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO message_deliveries (id, message_id, channel, status, error, attempted_at, delivered_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(delivery.id)
        .bind(delivery.message_id)
        .bind(delivery.channel.as_str())
        .bind(delivery.status.as_str())
        .bind(&delivery.error)
        .bind(delivery.attempted_at)
        .bind(delivery.delivered_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_by_message(&self, message_id: Uuid) -> RepoResult<Vec<MessageDelivery>> {
        let results = sqlx::query_as::<_, MessageDeliveryModel>(
            r"
            SELECT id, message_id, channel, status, error, attempted_at, delivered_at
            FROM message_deliveries
            WHERE message_id = $1
            ORDER BY attempted_at ASC
            ",
        )
        .bind(message_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        try_collect(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PgMessageDeliveryRepository>();
    }
}

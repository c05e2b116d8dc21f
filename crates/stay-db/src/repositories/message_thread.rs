//! PostgreSQL implementation of MessageThreadRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use stay_core::entities::MessageThread;
use stay_core::traits::{MessageThreadRepository, PageRequest, RepoResult};

use crate::models::MessageThreadModel;

use super::error::{map_db_error, thread_not_found};

const THREAD_COLUMNS: &str =
    "id, reservation_id, property_id, last_message_at, created_at, updated_at";

/// PostgreSQL implementation of MessageThreadRepository
#[derive(Clone)]
pub struct PgMessageThreadRepository {
    pool: PgPool,
}

impl PgMessageThreadRepository {
    /// Create a new PgMessageThreadRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageThreadRepository for PgMessageThreadRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<MessageThread>> {
        let result = sqlx::query_as::<_, MessageThreadModel>(&format!(
            "SELECT {THREAD_COLUMNS} FROM message_threads WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(MessageThread::from))
    }

    #[instrument(skip(self))]
    async fn find_by_reservation(&self, reservation_id: Uuid) -> RepoResult<Option<MessageThread>> {
        let result = sqlx::query_as::<_, MessageThreadModel>(&format!(
            "SELECT {THREAD_COLUMNS} FROM message_threads WHERE reservation_id = $1"
        ))
        .bind(reservation_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(MessageThread::from))
    }

    #[instrument(skip(self))]
    async fn get_or_create(
        &self,
        reservation_id: Uuid,
        property_id: Uuid,
    ) -> RepoResult<MessageThread> {
        let thread = MessageThread::new(reservation_id, property_id);

        // The no-op update makes RETURNING yield the existing row on conflict
        let result = sqlx::query_as::<_, MessageThreadModel>(&format!(
            r"
            INSERT INTO message_threads (id, reservation_id, property_id, last_message_at, created_at, updated_at)
            VALUES ($1, $2, $3, NULL, $4, $4)
            ON CONFLICT (reservation_id) DO UPDATE SET reservation_id = EXCLUDED.reservation_id
            RETURNING {THREAD_COLUMNS}
            "
        ))
        .bind(thread.id)
        .bind(thread.reservation_id)
        .bind(thread.property_id)
        .bind(thread.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.into())
    }

    #[instrument(skip(self))]
    async fn list_by_property(
        &self,
        property_id: Uuid,
        page: PageRequest,
    ) -> RepoResult<Vec<MessageThread>> {
        let results = sqlx::query_as::<_, MessageThreadModel>(&format!(
            r"
            SELECT {THREAD_COLUMNS}
            FROM message_threads
            WHERE property_id = $1
            ORDER BY last_message_at DESC NULLS LAST, created_at DESC
            LIMIT $2 OFFSET $3
            "
        ))
        .bind(property_id)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(MessageThread::from).collect())
    }

    #[instrument(skip(self))]
    async fn touch(&self, id: Uuid, at: DateTime<Utc>) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE message_threads
            SET last_message_at = GREATEST(COALESCE(last_message_at, $2), $2), updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(thread_not_found(id));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PgMessageThreadRepository>();
    }
}

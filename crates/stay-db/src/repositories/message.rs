//! PostgreSQL implementation of MessageRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use stay_core::entities::{Message, SenderRole};
use stay_core::traits::{MessageQuery, MessageRepository, PageRequest, RepoResult};

use crate::mappers::try_collect;
use crate::models::MessageModel;

use super::error::map_db_error;

const MESSAGE_COLUMNS: &str = r"
    id, thread_id, sender_role, sender_id, content, scheduled_message_id, read_at,
    created_at, updated_at
";

/// PostgreSQL implementation of MessageRepository
#[derive(Clone)]
pub struct PgMessageRepository {
    pool: PgPool,
}

impl PgMessageRepository {
    /// Create a new PgMessageRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageRepository for PgMessageRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Message>> {
        let result = sqlx::query_as::<_, MessageModel>(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(Message::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn list_by_thread(
        &self,
        thread_id: Uuid,
        query: MessageQuery,
    ) -> RepoResult<Vec<Message>> {
        let limit = if query.limit > 0 {
            query.limit.min(PageRequest::MAX_LIMIT)
        } else {
            PageRequest::DEFAULT_LIMIT
        };

        // Newest page before the cursor, flipped back to chronological order
        let results = sqlx::query_as::<_, MessageModel>(&format!(
            r"
            SELECT {MESSAGE_COLUMNS}
            FROM (
                SELECT {MESSAGE_COLUMNS}
                FROM messages
                WHERE thread_id = $1
                  AND ($2::timestamptz IS NULL OR created_at < $2)
                ORDER BY created_at DESC, id DESC
                LIMIT $3
            ) AS page
            ORDER BY created_at ASC, id ASC
            "
        ))
        .bind(thread_id)
        .bind(query.before)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        try_collect(results)
    }

    #[instrument(skip(self, message), fields(message_id = %message.id))]
    async fn create(&self, message: &Message) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO messages (
                id, thread_id, sender_role, sender_id, content, scheduled_message_id,
                read_at, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ",
        )
        .bind(message.id)
        .bind(message.thread_id)
        .bind(message.sender_role.as_str())
        .bind(message.sender_id)
        .bind(&message.content)
        .bind(message.scheduled_message_id)
        .bind(message.read_at)
        .bind(message.created_at)
        .bind(message.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn mark_read(
        &self,
        thread_id: Uuid,
        reader: SenderRole,
        at: DateTime<Utc>,
    ) -> RepoResult<Vec<Message>> {
        let results = sqlx::query_as::<_, MessageModel>(&format!(
            r"
            UPDATE messages
            SET read_at = $3, updated_at = NOW()
            WHERE thread_id = $1
              AND read_at IS NULL
              AND CASE WHEN $2 = 'guest' THEN sender_role <> 'guest' ELSE sender_role = 'guest' END
            RETURNING {MESSAGE_COLUMNS}
            "
        ))
        .bind(thread_id)
        .bind(reader.as_str())
        .bind(at)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        let mut read: Vec<Message> = try_collect(results)?;
        read.sort_by_key(|m| m.created_at);
        Ok(read)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PgMessageRepository>();
    }
}

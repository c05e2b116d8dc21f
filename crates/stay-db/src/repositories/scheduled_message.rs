//! PostgreSQL implementation of ScheduledMessageRepository
//!
//! Due rows are handed to dispatchers under a lease (`locked_until`), so two
//! workers polling at the same time never send the same message twice. A
//! worker that dies mid-send leaves the lease to expire and the row is
//! picked up again on a later pass.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{debug, instrument};
use uuid::Uuid;

use stay_core::entities::{ScheduledMessage, ScheduledMessageStatus};
use stay_core::traits::{RepoResult, ScheduledMessageRepository};

use crate::mappers::try_collect;
use crate::models::ScheduledMessageModel;

use super::error::{map_db_error, scheduled_message_not_found};

const SCHEDULED_COLUMNS: &str = r"
    id, reservation_id, rule_id, template_id, run_at, status, attempts, last_error,
    sent_at, message_id, created_at, updated_at
";

/// PostgreSQL implementation of ScheduledMessageRepository
#[derive(Clone)]
pub struct PgScheduledMessageRepository {
    pool: PgPool,
}

impl PgScheduledMessageRepository {
    /// Create a new PgScheduledMessageRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn set_terminal(
        &self,
        id: Uuid,
        status: ScheduledMessageStatus,
        error: Option<&str>,
    ) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE scheduled_messages
            SET status = $2, last_error = COALESCE($3, last_error), locked_until = NULL,
                updated_at = NOW()
            WHERE id = $1 AND status = 'pending'
            ",
        )
        .bind(id)
        .bind(status.as_str())
        .bind(error)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(scheduled_message_not_found(id));
        }

        Ok(())
    }
}

#[async_trait]
impl ScheduledMessageRepository for PgScheduledMessageRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<ScheduledMessage>> {
        let result = sqlx::query_as::<_, ScheduledMessageModel>(&format!(
            "SELECT {SCHEDULED_COLUMNS} FROM scheduled_messages WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(ScheduledMessage::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn list_by_reservation(&self, reservation_id: Uuid) -> RepoResult<Vec<ScheduledMessage>> {
        let results = sqlx::query_as::<_, ScheduledMessageModel>(&format!(
            r"
            SELECT {SCHEDULED_COLUMNS}
            FROM scheduled_messages
            WHERE reservation_id = $1
            ORDER BY run_at ASC
            "
        ))
        .bind(reservation_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        try_collect(results)
    }

    #[instrument(skip(self, messages), fields(count = messages.len()))]
    async fn insert_many(&self, messages: &[ScheduledMessage]) -> RepoResult<()> {
        if messages.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        for message in messages {
            sqlx::query(
                r"
                INSERT INTO scheduled_messages (
                    id, reservation_id, rule_id, template_id, run_at, status, attempts,
                    last_error, sent_at, message_id, created_at, updated_at
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
                ",
            )
            .bind(message.id)
            .bind(message.reservation_id)
            .bind(message.rule_id)
            .bind(message.template_id)
            .bind(message.run_at)
            .bind(message.status.as_str())
            .bind(message.attempts)
            .bind(&message.last_error)
            .bind(message.sent_at)
            .bind(message.message_id)
            .bind(message.created_at)
            .bind(message.updated_at)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;
        }

        tx.commit().await.map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn cancel_pending_for_reservation(&self, reservation_id: Uuid) -> RepoResult<u64> {
        let result = sqlx::query(
            r"
            UPDATE scheduled_messages
            SET status = 'cancelled', locked_until = NULL, updated_at = NOW()
            WHERE reservation_id = $1 AND status = 'pending'
            ",
        )
        .bind(reservation_id)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self))]
    async fn cancel_pending_for_rule(&self, rule_id: Uuid) -> RepoResult<u64> {
        let result = sqlx::query(
            r"
            UPDATE scheduled_messages
            SET status = 'cancelled', locked_until = NULL, updated_at = NOW()
            WHERE rule_id = $1 AND status = 'pending'
            ",
        )
        .bind(rule_id)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self))]
    async fn cancel(&self, id: Uuid) -> RepoResult<()> {
        self.set_terminal(id, ScheduledMessageStatus::Cancelled, None)
            .await
    }

    #[instrument(skip(self))]
    async fn claim_due(
        &self,
        now: DateTime<Utc>,
        limit: i64,
        lease_secs: i64,
    ) -> RepoResult<Vec<ScheduledMessage>> {
        let results = sqlx::query_as::<_, ScheduledMessageModel>(&format!(
            r"
            UPDATE scheduled_messages
            SET locked_until = $1 + ($3::double precision * INTERVAL '1 second'),
                attempts = attempts + 1,
                updated_at = NOW()
            WHERE id IN (
                SELECT id
                FROM scheduled_messages
                WHERE status = 'pending'
                  AND run_at <= $1
                  AND (locked_until IS NULL OR locked_until < $1)
                ORDER BY run_at ASC
                LIMIT $2
                FOR UPDATE SKIP LOCKED
            )
            RETURNING {SCHEDULED_COLUMNS}
            "
        ))
        .bind(now)
        .bind(limit)
        .bind(lease_secs as f64)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        if !results.is_empty() {
            debug!(claimed = results.len(), "Claimed due scheduled messages");
        }

        // RETURNING order is unspecified
        let mut claimed: Vec<ScheduledMessage> = try_collect(results)?;
        claimed.sort_by_key(|m| m.run_at);
        Ok(claimed)
    }

    #[instrument(skip(self))]
    async fn mark_sent(
        &self,
        id: Uuid,
        message_id: Uuid,
        sent_at: DateTime<Utc>,
    ) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE scheduled_messages
            SET status = 'sent', message_id = $2, sent_at = $3, last_error = NULL,
                locked_until = NULL, updated_at = NOW()
            WHERE id = $1 AND status = 'pending'
            ",
        )
        .bind(id)
        .bind(message_id)
        .bind(sent_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(scheduled_message_not_found(id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn mark_skipped(&self, id: Uuid, reason: &str) -> RepoResult<()> {
        self.set_terminal(id, ScheduledMessageStatus::Skipped, Some(reason))
            .await
    }

    #[instrument(skip(self))]
    async fn mark_failed(&self, id: Uuid, error: &str, give_up: bool) -> RepoResult<()> {
        if give_up {
            return self
                .set_terminal(id, ScheduledMessageStatus::Failed, Some(error))
                .await;
        }

        // Release the lease so the next pass retries immediately
        let result = sqlx::query(
            r"
            UPDATE scheduled_messages
            SET last_error = $2, locked_until = NULL, updated_at = NOW()
            WHERE id = $1 AND status = 'pending'
            ",
        )
        .bind(id)
        .bind(error)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(scheduled_message_not_found(id));
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
        assert_send_sync::<PgScheduledMessageRepository>();
    }
}

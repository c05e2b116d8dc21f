//! PostgreSQL implementation of MessageRuleRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use stay_core::entities::MessageRule;
use stay_core::traits::{MessageRuleRepository, RepoResult};

use crate::mappers::try_collect;
use crate::models::MessageRuleModel;

use super::error::{map_db_error, message_rule_not_found};

const RULE_COLUMNS: &str = r"
    id, property_id, template_id, name, rule_type, delay_minutes, days, hours, at_time,
    backfill, timezone, is_active, created_at, updated_at
";

/// PostgreSQL implementation of MessageRuleRepository
#[derive(Clone)]
pub struct PgMessageRuleRepository {
    pool: PgPool,
}

impl PgMessageRuleRepository {
    /// Create a new PgMessageRuleRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageRuleRepository for PgMessageRuleRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<MessageRule>> {
        let result = sqlx::query_as::<_, MessageRuleModel>(&format!(
            "SELECT {RULE_COLUMNS} FROM message_rules WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(MessageRule::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn list_by_property(
        &self,
        property_id: Uuid,
        active_only: bool,
    ) -> RepoResult<Vec<MessageRule>> {
        let results = sqlx::query_as::<_, MessageRuleModel>(&format!(
            r"
            SELECT {RULE_COLUMNS}
            FROM message_rules
            WHERE property_id = $1 AND (NOT $2 OR is_active)
            ORDER BY created_at ASC
            "
        ))
        .bind(property_id)
        .bind(active_only)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        try_collect(results)
    }

    #[instrument(skip(self, rule), fields(rule_id = %rule.id))]
    async fn create(&self, rule: &MessageRule) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO message_rules (
                id, property_id, template_id, name, rule_type, delay_minutes, days, hours,
                at_time, backfill, timezone, is_active, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            ",
        )
        .bind(rule.id)
        .bind(rule.property_id)
        .bind(rule.template_id)
        .bind(&rule.name)
        .bind(rule.rule_type.as_str())
        .bind(rule.delay_minutes)
        .bind(rule.days)
        .bind(rule.hours)
        .bind(rule.at_time)
        .bind(rule.backfill.as_str())
        .bind(&rule.timezone)
        .bind(rule.is_active)
        .bind(rule.created_at)
        .bind(rule.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self, rule), fields(rule_id = %rule.id))]
    async fn update(&self, rule: &MessageRule) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE message_rules
            SET template_id = $2, name = $3, rule_type = $4, delay_minutes = $5, days = $6,
                hours = $7, at_time = $8, backfill = $9, timezone = $10, is_active = $11,
                updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(rule.id)
        .bind(rule.template_id)
        .bind(&rule.name)
        .bind(rule.rule_type.as_str())
        .bind(rule.delay_minutes)
        .bind(rule.days)
        .bind(rule.hours)
        .bind(rule.at_time)
        .bind(rule.backfill.as_str())
        .bind(&rule.timezone)
        .bind(rule.is_active)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(message_rule_not_found(rule.id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> RepoResult<()> {
        let result = sqlx::query("DELETE FROM message_rules WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(message_rule_not_found(id));
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
        assert_send_sync::<PgMessageRuleRepository>();
    }
}

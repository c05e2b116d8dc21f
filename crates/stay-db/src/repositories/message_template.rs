//! PostgreSQL implementation of MessageTemplateRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use stay_core::entities::MessageTemplate;
use stay_core::traits::{MessageTemplateRepository, RepoResult};

use crate::models::MessageTemplateModel;

use super::error::{map_db_error, message_template_not_found};

const TEMPLATE_COLUMNS: &str =
    "id, property_id, name, subject, body, language, is_active, created_at, updated_at";

/// PostgreSQL implementation of MessageTemplateRepository
#[derive(Clone)]
pub struct PgMessageTemplateRepository {
    pool: PgPool,
}

impl PgMessageTemplateRepository {
    /// Create a new PgMessageTemplateRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageTemplateRepository for PgMessageTemplateRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<MessageTemplate>> {
        let result = sqlx::query_as::<_, MessageTemplateModel>(&format!(
            "SELECT {TEMPLATE_COLUMNS} FROM message_templates WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(MessageTemplate::from))
    }

    #[instrument(skip(self))]
    async fn list(&self, property_id: Option<Uuid>) -> RepoResult<Vec<MessageTemplate>> {
        let results = sqlx::query_as::<_, MessageTemplateModel>(&format!(
            r"
            SELECT {TEMPLATE_COLUMNS}
            FROM message_templates
            WHERE $1::uuid IS NULL OR property_id = $1 OR property_id IS NULL
            ORDER BY name ASC
            "
        ))
        .bind(property_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(MessageTemplate::from).collect())
    }

    #[instrument(skip(self, template), fields(template_id = %template.id))]
    async fn create(&self, template: &MessageTemplate) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO message_templates (
                id, property_id, name, subject, body, language, is_active, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ",
        )
        .bind(template.id)
        .bind(template.property_id)
        .bind(&template.name)
        .bind(&template.subject)
        .bind(&template.body)
        .bind(&template.language)
        .bind(template.is_active)
        .bind(template.created_at)
        .bind(template.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self, template), fields(template_id = %template.id))]
    async fn update(&self, template: &MessageTemplate) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE message_templates
            SET name = $2, subject = $3, body = $4, language = $5, is_active = $6,
                updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(template.id)
        .bind(&template.name)
        .bind(&template.subject)
        .bind(&template.body)
        .bind(&template.language)
        .bind(template.is_active)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(message_template_not_found(template.id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> RepoResult<()> {
        let result = sqlx::query("DELETE FROM message_templates WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(message_template_not_found(id));
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
        assert_send_sync::<PgMessageTemplateRepository>();
    }
}

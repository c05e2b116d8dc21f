//! PostgreSQL implementation of CleaningTaskRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use stay_core::entities::CleaningTask;
use stay_core::traits::{CleaningTaskFilter, CleaningTaskRepository, PageRequest, RepoResult};

use crate::mappers::try_collect;
use crate::models::CleaningTaskModel;

use super::error::{cleaning_task_not_found, map_db_error};

const TASK_COLUMNS: &str = r"
    id, property_id, room_unit_id, reservation_id, cleaner_id, scheduled_date, status,
    notes, assigned_at, started_at, completed_at, created_at, updated_at
";

/// PostgreSQL implementation of CleaningTaskRepository
#[derive(Clone)]
pub struct PgCleaningTaskRepository {
    pool: PgPool,
}

impl PgCleaningTaskRepository {
    /// Create a new PgCleaningTaskRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CleaningTaskRepository for PgCleaningTaskRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<CleaningTask>> {
        let result = sqlx::query_as::<_, CleaningTaskModel>(&format!(
            "SELECT {TASK_COLUMNS} FROM cleaning_tasks WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(CleaningTask::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn find_by_reservation(&self, reservation_id: Uuid) -> RepoResult<Vec<CleaningTask>> {
        let results = sqlx::query_as::<_, CleaningTaskModel>(&format!(
            r"
            SELECT {TASK_COLUMNS}
            FROM cleaning_tasks
            WHERE reservation_id = $1
            ORDER BY scheduled_date ASC
            "
        ))
        .bind(reservation_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        try_collect(results)
    }

    #[instrument(skip(self))]
    async fn list(
        &self,
        filter: &CleaningTaskFilter,
        page: PageRequest,
    ) -> RepoResult<Vec<CleaningTask>> {
        let results = sqlx::query_as::<_, CleaningTaskModel>(&format!(
            r"
            SELECT {TASK_COLUMNS}
            FROM cleaning_tasks
            WHERE ($1::uuid IS NULL OR property_id = $1)
              AND ($2::uuid IS NULL OR property_id IN (SELECT id FROM properties WHERE owner_id = $2))
              AND ($3::uuid IS NULL OR cleaner_id = $3)
              AND ($4::text IS NULL OR status = $4)
              AND ($5::date IS NULL OR scheduled_date >= $5)
              AND ($6::date IS NULL OR scheduled_date <= $6)
            ORDER BY scheduled_date ASC, created_at ASC
            LIMIT $7 OFFSET $8
            "
        ))
        .bind(filter.property_id)
        .bind(filter.owner_id)
        .bind(filter.cleaner_id)
        .bind(filter.status.map(|s| s.as_str()))
        .bind(filter.date_from)
        .bind(filter.date_to)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        try_collect(results)
    }

    #[instrument(skip(self, task), fields(task_id = %task.id))]
    async fn create(&self, task: &CleaningTask) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO cleaning_tasks (
                id, property_id, room_unit_id, reservation_id, cleaner_id, scheduled_date,
                status, notes, assigned_at, started_at, completed_at, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            ",
        )
        .bind(task.id)
        .bind(task.property_id)
        .bind(task.room_unit_id)
        .bind(task.reservation_id)
        .bind(task.cleaner_id)
        .bind(task.scheduled_date)
        .bind(task.status.as_str())
        .bind(&task.notes)
        .bind(task.assigned_at)
        .bind(task.started_at)
        .bind(task.completed_at)
        .bind(task.created_at)
        .bind(task.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self, task), fields(task_id = %task.id))]
    async fn update(&self, task: &CleaningTask) -> RepoResult<()> {
        // COALESCE keeps lifecycle timestamps from ever being cleared
        let result = sqlx::query(
            r"
            UPDATE cleaning_tasks
            SET room_unit_id = $2, reservation_id = $3, cleaner_id = $4, scheduled_date = $5,
                status = $6, notes = $7,
                assigned_at = COALESCE(assigned_at, $8),
                started_at = COALESCE(started_at, $9),
                completed_at = COALESCE(completed_at, $10),
                updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(task.id)
        .bind(task.room_unit_id)
        .bind(task.reservation_id)
        .bind(task.cleaner_id)
        .bind(task.scheduled_date)
        .bind(task.status.as_str())
        .bind(&task.notes)
        .bind(task.assigned_at)
        .bind(task.started_at)
        .bind(task.completed_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(cleaning_task_not_found(task.id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> RepoResult<()> {
        let result = sqlx::query("DELETE FROM cleaning_tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(cleaning_task_not_found(id));
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
        assert_send_sync::<PgCleaningTaskRepository>();
    }
}

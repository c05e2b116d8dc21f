//! PostgreSQL implementation of GuestServiceRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use stay_core::entities::GuestService;
use stay_core::traits::{GuestServiceRepository, RepoResult};

use crate::models::GuestServiceModel;

use super::error::{guest_service_not_found, map_db_error};

const SERVICE_COLUMNS: &str = r"
    id, property_id, name, description, price, currency, is_mandatory, per_guest_night,
    is_active, created_at, updated_at
";

/// PostgreSQL implementation of GuestServiceRepository
#[derive(Clone)]
pub struct PgGuestServiceRepository {
    pool: PgPool,
}

impl PgGuestServiceRepository {
    /// Create a new PgGuestServiceRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GuestServiceRepository for PgGuestServiceRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<GuestService>> {
        let result = sqlx::query_as::<_, GuestServiceModel>(&format!(
            "SELECT {SERVICE_COLUMNS} FROM guest_services WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(GuestService::from))
    }

    #[instrument(skip(self))]
    async fn list_by_property(
        &self,
        property_id: Uuid,
        active_only: bool,
    ) -> RepoResult<Vec<GuestService>> {
        let results = sqlx::query_as::<_, GuestServiceModel>(&format!(
            r"
            SELECT {SERVICE_COLUMNS}
            FROM guest_services
            WHERE property_id = $1 AND (NOT $2 OR is_active)
            ORDER BY is_mandatory DESC, name ASC
            "
        ))
        .bind(property_id)
        .bind(active_only)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(GuestService::from).collect())
    }

    #[instrument(skip(self, service), fields(service_id = %service.id))]
    async fn create(&self, service: &GuestService) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO guest_services (
                id, property_id, name, description, price, currency, is_mandatory,
                per_guest_night, is_active, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ",
        )
        .bind(service.id)
        .bind(service.property_id)
        .bind(&service.name)
        .bind(&service.description)
        .bind(service.price)
        .bind(&service.currency)
        .bind(service.is_mandatory)
        .bind(service.per_guest_night)
        .bind(service.is_active)
        .bind(service.created_at)
        .bind(service.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self, service), fields(service_id = %service.id))]
    async fn update(&self, service: &GuestService) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE guest_services
            SET name = $2, description = $3, price = $4, currency = $5, is_mandatory = $6,
                per_guest_night = $7, is_active = $8, updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(service.id)
        .bind(&service.name)
        .bind(&service.description)
        .bind(service.price)
        .bind(&service.currency)
        .bind(service.is_mandatory)
        .bind(service.per_guest_night)
        .bind(service.is_active)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(guest_service_not_found(service.id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn deactivate(&self, id: Uuid) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE guest_services
            SET is_active = FALSE, updated_at = NOW()
            WHERE id = $1 AND is_active
            ",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(guest_service_not_found(id));
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
        assert_send_sync::<PgGuestServiceRepository>();
    }
}

//! PostgreSQL implementation of ReservationServiceRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use stay_core::entities::ReservationService;
use stay_core::traits::{RepoResult, ReservationServiceRepository};

use crate::mappers::try_collect;
use crate::models::ReservationServiceModel;

use super::error::{map_db_error, reservation_service_not_found};

const ITEM_COLUMNS: &str = r"
    id, reservation_id, service_id, name, amount, currency, is_mandatory, status,
    payment_reference, exempt_reason, paid_at, created_at, updated_at
";

/// PostgreSQL implementation of ReservationServiceRepository
#[derive(Clone)]
pub struct PgReservationServiceRepository {
    pool: PgPool,
}

impl PgReservationServiceRepository {
    /// Create a new PgReservationServiceRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReservationServiceRepository for PgReservationServiceRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<ReservationService>> {
        let result = sqlx::query_as::<_, ReservationServiceModel>(&format!(
            "SELECT {ITEM_COLUMNS} FROM reservation_services WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(ReservationService::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn list_by_reservation(
        &self,
        reservation_id: Uuid,
    ) -> RepoResult<Vec<ReservationService>> {
        let results = sqlx::query_as::<_, ReservationServiceModel>(&format!(
            r"
            SELECT {ITEM_COLUMNS}
            FROM reservation_services
            WHERE reservation_id = $1
            ORDER BY is_mandatory DESC, created_at ASC
            "
        ))
        .bind(reservation_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        try_collect(results)
    }

    #[instrument(skip(self, item), fields(reservation_id = %item.reservation_id))]
    async fn attach(&self, item: &ReservationService) -> RepoResult<bool> {
        let result = sqlx::query(
            r"
            INSERT INTO reservation_services (
                id, reservation_id, service_id, name, amount, currency, is_mandatory, status,
                payment_reference, exempt_reason, paid_at, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            ON CONFLICT (reservation_id, service_id) DO NOTHING
            ",
        )
        .bind(item.id)
        .bind(item.reservation_id)
        .bind(item.service_id)
        .bind(&item.name)
        .bind(item.amount)
        .bind(&item.currency)
        .bind(item.is_mandatory)
        .bind(item.status.as_str())
        .bind(&item.payment_reference)
        .bind(&item.exempt_reason)
        .bind(item.paid_at)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, item), fields(item_id = %item.id))]
    async fn update(&self, item: &ReservationService) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE reservation_services
            SET amount = $2, status = $3, payment_reference = $4, exempt_reason = $5,
                paid_at = $6, updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(item.id)
        .bind(item.amount)
        .bind(item.status.as_str())
        .bind(&item.payment_reference)
        .bind(&item.exempt_reason)
        .bind(item.paid_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(reservation_service_not_found(item.id));
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
        assert_send_sync::<PgReservationServiceRepository>();
    }
}

//! PostgreSQL implementation of RoomUnitRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use stay_core::entities::RoomUnit;
use stay_core::error::DomainError;
use stay_core::traits::{RepoResult, RoomUnitRepository};

use crate::models::RoomUnitModel;

use super::error::{map_db_error, map_unique_violation, room_unit_not_found};

const ROOM_UNIT_COLUMNS: &str = r"
    id, room_type_id, unit_number, floor, access_code, wifi_ssid, wifi_password,
    created_at, updated_at
";

/// PostgreSQL implementation of RoomUnitRepository
#[derive(Clone)]
pub struct PgRoomUnitRepository {
    pool: PgPool,
}

impl PgRoomUnitRepository {
    /// Create a new PgRoomUnitRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoomUnitRepository for PgRoomUnitRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<RoomUnit>> {
        let result = sqlx::query_as::<_, RoomUnitModel>(&format!(
            "SELECT {ROOM_UNIT_COLUMNS} FROM room_units WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(RoomUnit::from))
    }

    #[instrument(skip(self))]
    async fn list_by_room_type(&self, room_type_id: Uuid) -> RepoResult<Vec<RoomUnit>> {
        let results = sqlx::query_as::<_, RoomUnitModel>(&format!(
            r"
            SELECT {ROOM_UNIT_COLUMNS}
            FROM room_units
            WHERE room_type_id = $1
            ORDER BY unit_number ASC
            "
        ))
        .bind(room_type_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(RoomUnit::from).collect())
    }

    #[instrument(skip(self, unit), fields(room_unit_id = %unit.id))]
    async fn create(&self, unit: &RoomUnit) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO room_units (
                id, room_type_id, unit_number, floor, access_code, wifi_ssid, wifi_password,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ",
        )
        .bind(unit.id)
        .bind(unit.room_type_id)
        .bind(&unit.unit_number)
        .bind(unit.floor)
        .bind(&unit.access_code)
        .bind(&unit.wifi_ssid)
        .bind(&unit.wifi_password)
        .bind(unit.created_at)
        .bind(unit.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            map_unique_violation(e, || DomainError::RoomUnitNumberTaken(unit.unit_number.clone()))
        })?;

        Ok(())
    }

    #[instrument(skip(self, unit), fields(room_unit_id = %unit.id))]
    async fn update(&self, unit: &RoomUnit) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE room_units
            SET unit_number = $2, floor = $3, access_code = $4, wifi_ssid = $5,
                wifi_password = $6, updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(unit.id)
        .bind(&unit.unit_number)
        .bind(unit.floor)
        .bind(&unit.access_code)
        .bind(&unit.wifi_ssid)
        .bind(&unit.wifi_password)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            map_unique_violation(e, || DomainError::RoomUnitNumberTaken(unit.unit_number.clone()))
        })?;

        if result.rows_affected() == 0 {
            return Err(room_unit_not_found(unit.id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> RepoResult<()> {
        let result = sqlx::query("DELETE FROM room_units WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(room_unit_not_found(id));
        }

        Ok(())
    }
}

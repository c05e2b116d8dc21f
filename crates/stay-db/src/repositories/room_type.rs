//! PostgreSQL implementation of RoomTypeRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use stay_core::entities::RoomType;
use stay_core::traits::{RepoResult, RoomTypeRepository};

use crate::models::RoomTypeModel;

use super::error::{map_db_error, room_type_not_found};

const ROOM_TYPE_COLUMNS: &str = r"
    id, property_id, name, description, max_guests, base_price, weekend_price,
    high_season_price, amenities, beds24_room_id, is_active, created_at, updated_at
";

/// PostgreSQL implementation of RoomTypeRepository
#[derive(Clone)]
pub struct PgRoomTypeRepository {
    pool: PgPool,
}

impl PgRoomTypeRepository {
    /// Create a new PgRoomTypeRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoomTypeRepository for PgRoomTypeRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<RoomType>> {
        let result = sqlx::query_as::<_, RoomTypeModel>(&format!(
            "SELECT {ROOM_TYPE_COLUMNS} FROM room_types WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(RoomType::from))
    }

    #[instrument(skip(self))]
    async fn find_by_beds24_id(&self, beds24_room_id: i64) -> RepoResult<Option<RoomType>> {
        let result = sqlx::query_as::<_, RoomTypeModel>(&format!(
            "SELECT {ROOM_TYPE_COLUMNS} FROM room_types WHERE beds24_room_id = $1 AND is_active"
        ))
        .bind(beds24_room_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(RoomType::from))
    }

    #[instrument(skip(self))]
    async fn list_by_property(
        &self,
        property_id: Uuid,
        include_inactive: bool,
    ) -> RepoResult<Vec<RoomType>> {
        let results = sqlx::query_as::<_, RoomTypeModel>(&format!(
            r"
            SELECT {ROOM_TYPE_COLUMNS}
            FROM room_types
            WHERE property_id = $1 AND ($2 OR is_active)
            ORDER BY name ASC
            "
        ))
        .bind(property_id)
        .bind(include_inactive)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(RoomType::from).collect())
    }

    #[instrument(skip(self, room_type), fields(room_type_id = %room_type.id))]
    async fn create(&self, room_type: &RoomType) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO room_types (
                id, property_id, name, description, max_guests, base_price, weekend_price,
                high_season_price, amenities, beds24_room_id, is_active, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            ",
        )
        .bind(room_type.id)
        .bind(room_type.property_id)
        .bind(&room_type.name)
        .bind(&room_type.description)
        .bind(room_type.max_guests)
        .bind(room_type.base_price)
        .bind(room_type.weekend_price)
        .bind(room_type.high_season_price)
        .bind(&room_type.amenities)
        .bind(room_type.beds24_room_id)
        .bind(room_type.is_active)
        .bind(room_type.created_at)
        .bind(room_type.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self, room_type), fields(room_type_id = %room_type.id))]
    async fn update(&self, room_type: &RoomType) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE room_types
            SET name = $2, description = $3, max_guests = $4, base_price = $5,
                weekend_price = $6, high_season_price = $7, amenities = $8,
                beds24_room_id = $9, is_active = $10, updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(room_type.id)
        .bind(&room_type.name)
        .bind(&room_type.description)
        .bind(room_type.max_guests)
        .bind(room_type.base_price)
        .bind(room_type.weekend_price)
        .bind(room_type.high_season_price)
        .bind(&room_type.amenities)
        .bind(room_type.beds24_room_id)
        .bind(room_type.is_active)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(room_type_not_found(room_type.id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn deactivate(&self, id: Uuid) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE room_types
            SET is_active = FALSE, updated_at = NOW()
            WHERE id = $1 AND is_active
            ",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(room_type_not_found(id));
        }

        Ok(())
    }
}

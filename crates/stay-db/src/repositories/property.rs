//! PostgreSQL implementation of PropertyRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use stay_core::entities::Property;
use stay_core::traits::{PageRequest, PropertyFilter, PropertyRepository, RepoResult};

use crate::models::PropertyModel;

use super::error::{map_db_error, property_not_found};

const PROPERTY_COLUMNS: &str = r"
    id, owner_id, name, address, description, amenities, wifi_ssid, wifi_password,
    check_in_time, access_time, departure_time, timezone, beds24_property_id,
    is_active, created_at, updated_at
";

/// PostgreSQL implementation of PropertyRepository
#[derive(Clone)]
pub struct PgPropertyRepository {
    pool: PgPool,
}

impl PgPropertyRepository {
    /// Create a new PgPropertyRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PropertyRepository for PgPropertyRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Property>> {
        let result = sqlx::query_as::<_, PropertyModel>(&format!(
            "SELECT {PROPERTY_COLUMNS} FROM properties WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Property::from))
    }

    #[instrument(skip(self))]
    async fn find_by_beds24_id(&self, beds24_property_id: i64) -> RepoResult<Option<Property>> {
        let result = sqlx::query_as::<_, PropertyModel>(&format!(
            "SELECT {PROPERTY_COLUMNS} FROM properties WHERE beds24_property_id = $1 AND is_active"
        ))
        .bind(beds24_property_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Property::from))
    }

    #[instrument(skip(self))]
    async fn list(&self, filter: &PropertyFilter, page: PageRequest) -> RepoResult<Vec<Property>> {
        let results = sqlx::query_as::<_, PropertyModel>(&format!(
            r"
            SELECT {PROPERTY_COLUMNS}
            FROM properties
            WHERE ($1::uuid IS NULL OR owner_id = $1)
              AND ($2 OR is_active)
            ORDER BY name ASC, created_at ASC
            LIMIT $3 OFFSET $4
            "
        ))
        .bind(filter.owner_id)
        .bind(filter.include_inactive)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Property::from).collect())
    }

    #[instrument(skip(self, property), fields(property_id = %property.id))]
    async fn create(&self, property: &Property) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO properties (
                id, owner_id, name, address, description, amenities, wifi_ssid, wifi_password,
                check_in_time, access_time, departure_time, timezone, beds24_property_id,
                is_active, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            ",
        )
        .bind(property.id)
        .bind(property.owner_id)
        .bind(&property.name)
        .bind(&property.address)
        .bind(&property.description)
        .bind(&property.amenities)
        .bind(&property.wifi_ssid)
        .bind(&property.wifi_password)
        .bind(property.check_in_time)
        .bind(property.access_time)
        .bind(property.departure_time)
        .bind(&property.timezone)
        .bind(property.beds24_property_id)
        .bind(property.is_active)
        .bind(property.created_at)
        .bind(property.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self, property), fields(property_id = %property.id))]
    async fn update(&self, property: &Property) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE properties
            SET owner_id = $2, name = $3, address = $4, description = $5, amenities = $6,
                wifi_ssid = $7, wifi_password = $8, check_in_time = $9, access_time = $10,
                departure_time = $11, timezone = $12, beds24_property_id = $13,
                is_active = $14, updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(property.id)
        .bind(property.owner_id)
        .bind(&property.name)
        .bind(&property.address)
        .bind(&property.description)
        .bind(&property.amenities)
        .bind(&property.wifi_ssid)
        .bind(&property.wifi_password)
        .bind(property.check_in_time)
        .bind(property.access_time)
        .bind(property.departure_time)
        .bind(&property.timezone)
        .bind(property.beds24_property_id)
        .bind(property.is_active)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(property_not_found(property.id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn deactivate(&self, id: Uuid) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE properties
            SET is_active = FALSE, updated_at = NOW()
            WHERE id = $1 AND is_active
            ",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(property_not_found(id));
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
        assert_send_sync::<PgPropertyRepository>();
    }
}

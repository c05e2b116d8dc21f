//! PostgreSQL implementation of UserRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use stay_core::entities::{UserProfile, UserRole};
use stay_core::error::DomainError;
use stay_core::traits::{PageRequest, RepoResult, UserRepository};

use crate::mappers::try_collect;
use crate::models::UserProfileModel;

use super::error::{map_db_error, map_unique_violation, user_not_found};

const USER_COLUMNS: &str =
    "id, email, full_name, phone, role, is_active, created_at, updated_at";

/// PostgreSQL implementation of UserRepository
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a new PgUserRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<UserProfile>> {
        let result = sqlx::query_as::<_, UserProfileModel>(&format!(
            "SELECT {USER_COLUMNS} FROM user_profiles WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(UserProfile::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<UserProfile>> {
        let result = sqlx::query_as::<_, UserProfileModel>(&format!(
            "SELECT {USER_COLUMNS} FROM user_profiles WHERE LOWER(email) = LOWER($1)"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(UserProfile::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn list(
        &self,
        role: Option<UserRole>,
        include_inactive: bool,
        page: PageRequest,
    ) -> RepoResult<Vec<UserProfile>> {
        let results = sqlx::query_as::<_, UserProfileModel>(&format!(
            r"
            SELECT {USER_COLUMNS}
            FROM user_profiles
            WHERE ($1::text IS NULL OR role = $1) AND ($2 OR is_active)
            ORDER BY email ASC
            LIMIT $3 OFFSET $4
            "
        ))
        .bind(role.map(UserRole::as_str))
        .bind(include_inactive)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        try_collect(results)
    }

    #[instrument(skip(self, user), fields(user_id = %user.id))]
    async fn create(&self, user: &UserProfile) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO user_profiles (id, email, full_name, phone, role, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ",
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.full_name)
        .bind(&user.phone)
        .bind(user.role.as_str())
        .bind(user.is_active)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::EmailAlreadyExists))?;

        Ok(())
    }

    #[instrument(skip(self, user), fields(user_id = %user.id))]
    async fn update(&self, user: &UserProfile) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE user_profiles
            SET email = $2, full_name = $3, phone = $4, role = $5, is_active = $6, updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.full_name)
        .bind(&user.phone)
        .bind(user.role.as_str())
        .bind(user.is_active)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::EmailAlreadyExists))?;

        if result.rows_affected() == 0 {
            return Err(user_not_found(user.id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn deactivate(&self, id: Uuid) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE user_profiles
            SET is_active = FALSE, updated_at = NOW()
            WHERE id = $1 AND is_active
            ",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(user_not_found(id));
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
        assert_send_sync::<PgUserRepository>();
    }
}

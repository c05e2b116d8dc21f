//! User profile service
//!
//! Accounts live with the hosted auth provider; this service manages the
//! profile row (role, contact details, active flag) keyed by the same id.

use chrono::Utc;
use stay_core::entities::UserProfile;
use stay_core::traits::PageRequest;
use stay_core::{Capabilities, DomainError};
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::dto::{CreateUserRequest, UpdateUserRequest, UserListQuery, UserResponse};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::permission::Actor;

/// User service
pub struct UserService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> UserService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    async fn load(&self, user_id: Uuid) -> ServiceResult<UserProfile> {
        self.ctx
            .user_repo()
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", user_id.to_string()))
    }

    async fn ensure_email_free(&self, email: &str, owner: Uuid) -> ServiceResult<()> {
        match self.ctx.user_repo().find_by_email(email).await? {
            Some(existing) if existing.id != owner => Err(DomainError::EmailAlreadyExists.into()),
            _ => Ok(()),
        }
    }

    /// The caller's own profile
    #[instrument(skip(self))]
    pub async fn me(&self, actor: &Actor) -> ServiceResult<UserResponse> {
        Ok(UserResponse::from(self.load(actor.user_id).await?))
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        actor: &Actor,
        query: UserListQuery,
        page: PageRequest,
    ) -> ServiceResult<Vec<UserResponse>> {
        actor.require(Capabilities::MANAGE_USERS)?;

        let users = self
            .ctx
            .user_repo()
            .list(query.role, query.include_inactive, page)
            .await?;
        Ok(users.iter().map(UserResponse::from).collect())
    }

    #[instrument(skip(self))]
    pub async fn get(&self, actor: &Actor, user_id: Uuid) -> ServiceResult<UserResponse> {
        if user_id != actor.user_id {
            actor.require(Capabilities::MANAGE_USERS)?;
        }
        Ok(UserResponse::from(self.load(user_id).await?))
    }

    /// Create the profile for an auth-provider account
    #[instrument(skip(self, request))]
    pub async fn create(
        &self,
        actor: &Actor,
        request: CreateUserRequest,
    ) -> ServiceResult<UserResponse> {
        actor.require(Capabilities::MANAGE_USERS)?;
        request.validate()?;

        if self.ctx.user_repo().find_by_id(request.id).await?.is_some() {
            return Err(ServiceError::conflict(format!(
                "profile already exists for {}",
                request.id
            )));
        }
        let email = request.email.trim().to_lowercase();
        self.ensure_email_free(&email, request.id).await?;

        let mut user = UserProfile::new(request.id, email, request.role);
        user.full_name = request.full_name;
        user.phone = request.phone;

        self.ctx.user_repo().create(&user).await?;

        info!(user_id = %user.id, role = %user.role, "User profile created");
        Ok(UserResponse::from(user))
    }

    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        actor: &Actor,
        user_id: Uuid,
        request: UpdateUserRequest,
    ) -> ServiceResult<UserResponse> {
        actor.require(Capabilities::MANAGE_USERS)?;
        request.validate()?;
        let mut user = self.load(user_id).await?;

        if let Some(email) = request.email {
            let email = email.trim().to_lowercase();
            self.ensure_email_free(&email, user_id).await?;
            user.email = email;
        }
        if let Some(full_name) = request.full_name {
            user.full_name = Some(full_name);
        }
        if let Some(phone) = request.phone {
            user.phone = Some(phone);
        }
        if let Some(role) = request.role {
            if user_id == actor.user_id && role != user.role {
                return Err(ServiceError::validation("cannot change your own role"));
            }
            user.role = role;
        }
        if let Some(active) = request.is_active {
            if user_id == actor.user_id && !active {
                return Err(ServiceError::validation("cannot deactivate yourself"));
            }
            user.is_active = active;
        }
        user.updated_at = Utc::now();

        self.ctx.user_repo().update(&user).await?;

        info!(user_id = %user_id, "User profile updated");
        Ok(UserResponse::from(user))
    }

    /// Soft delete
    #[instrument(skip(self))]
    pub async fn delete(&self, actor: &Actor, user_id: Uuid) -> ServiceResult<()> {
        actor.require(Capabilities::MANAGE_USERS)?;
        if user_id == actor.user_id {
            return Err(ServiceError::validation("cannot deactivate yourself"));
        }
        self.load(user_id).await?;
        self.ctx.user_repo().deactivate(user_id).await?;

        info!(user_id = %user_id, "User profile deactivated");
        Ok(())
    }
}

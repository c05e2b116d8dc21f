//! Permission service
//!
//! Resolves the staff user behind a bearer token and checks capabilities
//! and property ownership.

use stay_common::AppError;
use stay_core::entities::{Property, Reservation, UserProfile, UserRole};
use stay_core::{Capabilities, DomainError};
use tracing::{debug, instrument};
use uuid::Uuid;

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// An authenticated staff user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: Uuid,
    pub role: UserRole,
    pub capabilities: Capabilities,
}

impl Actor {
    pub fn from_profile(profile: &UserProfile) -> Self {
        Self {
            user_id: profile.id,
            role: profile.role,
            capabilities: profile.capabilities(),
        }
    }

    #[inline]
    pub fn can(&self, capability: Capabilities) -> bool {
        self.capabilities.has(capability)
    }

    /// Fail with `PermissionDenied` unless every flag in `capability` is held
    pub fn require(&self, capability: Capabilities) -> ServiceResult<()> {
        if self.can(capability) {
            Ok(())
        } else {
            Err(ServiceError::permission_denied(capability.list().join(", ")))
        }
    }

    /// Owner filter for list queries; `None` when every property is visible
    pub fn owner_scope(&self) -> Option<Uuid> {
        if self.can(Capabilities::ALL_PROPERTIES) {
            None
        } else {
            Some(self.user_id)
        }
    }

    /// Whether this actor may act on `property`
    pub fn can_access(&self, property: &Property) -> bool {
        self.can(Capabilities::ALL_PROPERTIES) || property.is_owned_by(self.user_id)
    }
}

/// Permission service for access control
pub struct PermissionService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> PermissionService<'a> {
    /// Create a new PermissionService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Verify a bearer token and load the user's profile
    #[instrument(skip(self, token))]
    pub async fn authenticate(&self, token: &str) -> ServiceResult<Actor> {
        let (user_id, _claims) = self.ctx.jwt_service().authenticate(token)?;

        let profile = self
            .ctx
            .user_repo()
            .find_by_id(user_id)
            .await?
            .ok_or(ServiceError::App(AppError::InsufficientPermissions))?;

        if !profile.is_active {
            debug!(user_id = %user_id, "Inactive user rejected");
            return Err(AppError::InsufficientPermissions.into());
        }

        Ok(Actor::from_profile(&profile))
    }

    /// Load a property the actor may act on
    #[instrument(skip(self))]
    pub async fn require_property(&self, actor: &Actor, property_id: Uuid) -> ServiceResult<Property> {
        let property = self
            .ctx
            .property_repo()
            .find_by_id(property_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Property", property_id.to_string()))?;

        if !actor.can_access(&property) {
            return Err(DomainError::NotPropertyOwner.into());
        }
        Ok(property)
    }

    /// Load a reservation and its property, checking property access
    #[instrument(skip(self))]
    pub async fn require_reservation(
        &self,
        actor: &Actor,
        reservation_id: Uuid,
    ) -> ServiceResult<(Reservation, Property)> {
        let reservation = self
            .ctx
            .reservation_repo()
            .find_by_id(reservation_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Reservation", reservation_id.to_string()))?;

        let property = self.require_property(actor, reservation.property_id).await?;
        Ok((reservation, property))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor(role: UserRole) -> Actor {
        Actor::from_profile(&UserProfile::new(
            Uuid::new_v4(),
            "staff@example.com".to_string(),
            role,
        ))
    }

    #[test]
    fn test_admin_sees_every_property() {
        let admin = actor(UserRole::Admin);
        let property = Property::new("Villa".to_string(), Some(Uuid::new_v4()), "Asia/Tokyo".to_string());
        assert!(admin.can_access(&property));
        assert_eq!(admin.owner_scope(), None);
    }

    #[test]
    fn test_owner_limited_to_own_properties() {
        let owner = actor(UserRole::Owner);
        let mine = Property::new("Mine".to_string(), Some(owner.user_id), "Asia/Tokyo".to_string());
        let theirs = Property::new("Theirs".to_string(), Some(Uuid::new_v4()), "Asia/Tokyo".to_string());

        assert!(owner.can_access(&mine));
        assert!(!owner.can_access(&theirs));
        assert_eq!(owner.owner_scope(), Some(owner.user_id));
    }

    #[test]
    fn test_require_reports_missing_capability() {
        let cleaner = actor(UserRole::Cleaner);
        assert!(cleaner.require(Capabilities::WORK_CLEANING).is_ok());

        let err = cleaner.require(Capabilities::MANAGE_PROPERTIES).unwrap_err();
        assert_eq!(err.status_code(), 403);
        assert!(err.to_string().contains("MANAGE_PROPERTIES"));
    }

    #[test]
    fn test_inactive_profile_has_no_capabilities() {
        let mut profile = UserProfile::new(Uuid::new_v4(), "x@example.com".to_string(), UserRole::Admin);
        profile.deactivate();
        let actor = Actor::from_profile(&profile);
        assert!(actor.require(Capabilities::MANAGE_USERS).is_err());
    }
}

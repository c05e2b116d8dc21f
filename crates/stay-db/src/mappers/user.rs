//! User profile mapper

use stay_core::entities::UserProfile;
use stay_core::DomainError;

use super::parse_column;
use crate::models::UserProfileModel;

impl TryFrom<UserProfileModel> for UserProfile {
    type Error = DomainError;

    fn try_from(model: UserProfileModel) -> Result<Self, Self::Error> {
        Ok(UserProfile {
            id: model.id,
            email: model.email,
            full_name: model.full_name,
            phone: model.phone,
            role: parse_column("user_profiles.role", &model.role)?,
            is_active: model.is_active,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

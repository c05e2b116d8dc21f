//! User profile entity

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;
use crate::value_objects::Capabilities;

/// Role of a user profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    Owner,
    Cleaner,
    #[default]
    Guest,
}

impl UserRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Owner => "owner",
            Self::Cleaner => "cleaner",
            Self::Guest => "guest",
        }
    }

    /// Capabilities granted by this role
    pub fn capabilities(self) -> Capabilities {
        match self {
            Self::Admin => Capabilities::ALL,
            Self::Owner => Capabilities::OWNER,
            Self::Cleaner => Capabilities::CLEANER,
            Self::Guest => Capabilities::empty(),
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "owner" => Ok(Self::Owner),
            "cleaner" => Ok(Self::Cleaner),
            "guest" => Ok(Self::Guest),
            other => Err(DomainError::ValidationError(format!("unknown role: {other}"))),
        }
    }
}

/// User profile entity
///
/// The id matches the subject of the access token issued by the hosted
/// auth provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub role: UserRole,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    pub fn new(id: Uuid, email: String, role: UserRole) -> Self {
        let now = Utc::now();
        Self {
            id,
            email,
            full_name: None,
            phone: None,
            role,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Name to show in the UI
    pub fn display_name(&self) -> &str {
        self.full_name.as_deref().unwrap_or(&self.email)
    }

    /// Inactive users hold no capabilities
    pub fn capabilities(&self) -> Capabilities {
        if self.is_active {
            self.role.capabilities()
        } else {
            Capabilities::empty()
        }
    }

    pub fn deactivate(&mut self) {
        self.is_active = false;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse() {
        assert_eq!("cleaner".parse::<UserRole>().unwrap(), UserRole::Cleaner);
        assert!("superuser".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_display_name() {
        let mut user = UserProfile::new(Uuid::new_v4(), "a@example.com".to_string(), UserRole::Owner);
        assert_eq!(user.display_name(), "a@example.com");
        user.full_name = Some("Aiko".to_string());
        assert_eq!(user.display_name(), "Aiko");
    }

    #[test]
    fn test_inactive_user_has_no_capabilities() {
        let mut user = UserProfile::new(Uuid::new_v4(), "a@example.com".to_string(), UserRole::Admin);
        assert!(user.capabilities().contains(Capabilities::MANAGE_USERS));
        user.deactivate();
        assert!(user.capabilities().is_empty());
    }
}

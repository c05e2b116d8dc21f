//! Property entity - a managed building or house

use chrono::{DateTime, NaiveTime, Utc};
use uuid::Uuid;

/// Default check-in time when a property does not configure one
pub const DEFAULT_CHECK_IN_TIME: (u32, u32) = (15, 0);

/// Default departure (check-out) time
pub const DEFAULT_DEPARTURE_TIME: (u32, u32) = (10, 0);

/// Property entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub id: Uuid,
    pub owner_id: Option<Uuid>,
    pub name: String,
    pub address: Option<String>,
    pub description: Option<String>,
    pub amenities: Vec<String>,
    pub wifi_ssid: Option<String>,
    pub wifi_password: Option<String>,
    pub check_in_time: NaiveTime,
    /// Time of day from which the room access code is revealed to guests.
    /// Falls back to `check_in_time` when unset.
    pub access_time: Option<NaiveTime>,
    pub departure_time: NaiveTime,
    /// IANA timezone name, e.g. `Asia/Tokyo`
    pub timezone: String,
    pub beds24_property_id: Option<i64>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Property {
    /// Create a new active property with default times
    pub fn new(name: String, owner_id: Option<Uuid>, timezone: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner_id,
            name,
            address: None,
            description: None,
            amenities: Vec::new(),
            wifi_ssid: None,
            wifi_password: None,
            check_in_time: default_check_in_time(),
            access_time: None,
            departure_time: default_departure_time(),
            timezone,
            beds24_property_id: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Time of day the access code unlocks
    #[inline]
    pub fn effective_access_time(&self) -> NaiveTime {
        self.access_time.unwrap_or(self.check_in_time)
    }

    /// Whether the given user owns this property
    #[inline]
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.owner_id == Some(user_id)
    }

    /// Soft delete
    pub fn deactivate(&mut self) {
        self.is_active = false;
        self.updated_at = Utc::now();
    }
}

/// 15:00
pub fn default_check_in_time() -> NaiveTime {
    NaiveTime::from_hms_opt(DEFAULT_CHECK_IN_TIME.0, DEFAULT_CHECK_IN_TIME.1, 0)
        .unwrap_or(NaiveTime::MIN)
}

/// 10:00
pub fn default_departure_time() -> NaiveTime {
    NaiveTime::from_hms_opt(DEFAULT_DEPARTURE_TIME.0, DEFAULT_DEPARTURE_TIME.1, 0)
        .unwrap_or(NaiveTime::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_defaults() {
        let property = Property::new("Sakura House".to_string(), None, "Asia/Tokyo".to_string());
        assert!(property.is_active);
        assert_eq!(property.check_in_time, NaiveTime::from_hms_opt(15, 0, 0).unwrap());
        assert_eq!(property.departure_time, NaiveTime::from_hms_opt(10, 0, 0).unwrap());
    }

    #[test]
    fn test_effective_access_time() {
        let mut property = Property::new("Sakura House".to_string(), None, "Asia/Tokyo".to_string());
        assert_eq!(property.effective_access_time(), property.check_in_time);

        property.access_time = NaiveTime::from_hms_opt(16, 30, 0);
        assert_eq!(
            property.effective_access_time(),
            NaiveTime::from_hms_opt(16, 30, 0).unwrap()
        );
    }

    #[test]
    fn test_ownership_and_deactivate() {
        let owner = Uuid::new_v4();
        let mut property = Property::new("Sakura House".to_string(), Some(owner), "UTC".to_string());
        assert!(property.is_owned_by(owner));
        assert!(!property.is_owned_by(Uuid::new_v4()));

        property.deactivate();
        assert!(!property.is_active);
    }
}

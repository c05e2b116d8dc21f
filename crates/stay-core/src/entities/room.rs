//! Room type and room unit entities

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::Property;

/// Room type entity - a sellable category of rooms within a property
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomType {
    pub id: Uuid,
    pub property_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub max_guests: i32,
    /// Nightly price in minor currency units
    pub base_price: Option<i64>,
    pub weekend_price: Option<i64>,
    pub high_season_price: Option<i64>,
    pub amenities: Vec<String>,
    pub beds24_room_id: Option<i64>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RoomType {
    /// Create a new active room type
    pub fn new(property_id: Uuid, name: String, max_guests: i32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            property_id,
            name,
            description: None,
            max_guests,
            base_price: None,
            weekend_price: None,
            high_season_price: None,
            amenities: Vec::new(),
            beds24_room_id: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check whether the party size fits
    #[inline]
    pub fn fits(&self, guests: i32) -> bool {
        guests > 0 && guests <= self.max_guests
    }

    /// Soft delete
    pub fn deactivate(&mut self) {
        self.is_active = false;
        self.updated_at = Utc::now();
    }
}

/// Room unit entity - a physical room with its own door code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomUnit {
    pub id: Uuid,
    pub room_type_id: Uuid,
    pub unit_number: String,
    pub floor: Option<i32>,
    pub access_code: Option<String>,
    pub wifi_ssid: Option<String>,
    pub wifi_password: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RoomUnit {
    pub fn new(room_type_id: Uuid, unit_number: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            room_type_id,
            unit_number,
            floor: None,
            access_code: None,
            wifi_ssid: None,
            wifi_password: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Wifi credentials shown to the guest: the unit override when set,
    /// otherwise the property-wide network.
    pub fn effective_wifi(&self, property: &Property) -> WifiCredentials {
        if self.wifi_ssid.is_some() {
            WifiCredentials {
                ssid: self.wifi_ssid.clone(),
                password: self.wifi_password.clone(),
            }
        } else {
            WifiCredentials {
                ssid: property.wifi_ssid.clone(),
                password: property.wifi_password.clone(),
            }
        }
    }
}

/// Resolved wifi network details
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WifiCredentials {
    pub ssid: Option<String>,
    pub password: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn property_with_wifi() -> Property {
        let mut property = Property::new("Maple".to_string(), None, "UTC".to_string());
        property.wifi_ssid = Some("maple-guest".to_string());
        property.wifi_password = Some("maplepass".to_string());
        property
    }

    #[test]
    fn test_room_type_fits() {
        let room_type = RoomType::new(Uuid::new_v4(), "Twin".to_string(), 2);
        assert!(room_type.fits(1));
        assert!(room_type.fits(2));
        assert!(!room_type.fits(3));
        assert!(!room_type.fits(0));
    }

    #[test]
    fn test_effective_wifi_falls_back_to_property() {
        let property = property_with_wifi();
        let unit = RoomUnit::new(Uuid::new_v4(), "101".to_string());

        let wifi = unit.effective_wifi(&property);
        assert_eq!(wifi.ssid.as_deref(), Some("maple-guest"));
        assert_eq!(wifi.password.as_deref(), Some("maplepass"));
    }

    #[test]
    fn test_effective_wifi_prefers_unit_override() {
        let property = property_with_wifi();
        let mut unit = RoomUnit::new(Uuid::new_v4(), "102".to_string());
        unit.wifi_ssid = Some("room-102".to_string());
        unit.wifi_password = Some("secret102".to_string());

        let wifi = unit.effective_wifi(&property);
        assert_eq!(wifi.ssid.as_deref(), Some("room-102"));
        assert_eq!(wifi.password.as_deref(), Some("secret102"));
    }
}

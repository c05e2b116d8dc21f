//! Property, room type and room unit mappers

use stay_core::entities::{Property, RoomType, RoomUnit};

use crate::models::{PropertyModel, RoomTypeModel, RoomUnitModel};

impl From<PropertyModel> for Property {
    fn from(model: PropertyModel) -> Self {
        Property {
            id: model.id,
            owner_id: model.owner_id,
            name: model.name,
            address: model.address,
            description: model.description,
            amenities: model.amenities,
            wifi_ssid: model.wifi_ssid,
            wifi_password: model.wifi_password,
            check_in_time: model.check_in_time,
            access_time: model.access_time,
            departure_time: model.departure_time,
            timezone: model.timezone,
            beds24_property_id: model.beds24_property_id,
            is_active: model.is_active,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<RoomTypeModel> for RoomType {
    fn from(model: RoomTypeModel) -> Self {
        RoomType {
            id: model.id,
            property_id: model.property_id,
            name: model.name,
            description: model.description,
            max_guests: model.max_guests,
            base_price: model.base_price,
            weekend_price: model.weekend_price,
            high_season_price: model.high_season_price,
            amenities: model.amenities,
            beds24_room_id: model.beds24_room_id,
            is_active: model.is_active,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<RoomUnitModel> for RoomUnit {
    fn from(model: RoomUnitModel) -> Self {
        RoomUnit {
            id: model.id,
            room_type_id: model.room_type_id,
            unit_number: model.unit_number,
            floor: model.floor,
            access_code: model.access_code,
            wifi_ssid: model.wifi_ssid,
            wifi_password: model.wifi_password,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

//! Room type and room unit services

use chrono::Utc;
use stay_core::entities::{Property, RoomType, RoomUnit};
use stay_core::Capabilities;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::dto::{
    CreateRoomTypeRequest, CreateRoomUnitRequest, RoomTypeResponse, RoomUnitResponse,
    UpdateRoomTypeRequest, UpdateRoomUnitRequest,
};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::permission::{Actor, PermissionService};

/// Room type service
pub struct RoomTypeService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> RoomTypeService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Load a room type with its property, checking property access
    pub(crate) async fn load(
        &self,
        actor: &Actor,
        room_type_id: Uuid,
    ) -> ServiceResult<(RoomType, Property)> {
        let room_type = self
            .ctx
            .room_type_repo()
            .find_by_id(room_type_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("RoomType", room_type_id.to_string()))?;
        let property = PermissionService::new(self.ctx)
            .require_property(actor, room_type.property_id)
            .await?;
        Ok((room_type, property))
    }

    #[instrument(skip(self))]
    pub async fn list_by_property(
        &self,
        actor: &Actor,
        property_id: Uuid,
        include_inactive: bool,
    ) -> ServiceResult<Vec<RoomTypeResponse>> {
        actor.require(Capabilities::MANAGE_PROPERTIES)?;
        PermissionService::new(self.ctx)
            .require_property(actor, property_id)
            .await?;

        let room_types = self
            .ctx
            .room_type_repo()
            .list_by_property(property_id, include_inactive)
            .await?;
        Ok(room_types.iter().map(RoomTypeResponse::from).collect())
    }

    #[instrument(skip(self))]
    pub async fn get(&self, actor: &Actor, room_type_id: Uuid) -> ServiceResult<RoomTypeResponse> {
        actor.require(Capabilities::MANAGE_PROPERTIES)?;
        let (room_type, _) = self.load(actor, room_type_id).await?;
        Ok(RoomTypeResponse::from(room_type))
    }

    #[instrument(skip(self, request))]
    pub async fn create(
        &self,
        actor: &Actor,
        property_id: Uuid,
        request: CreateRoomTypeRequest,
    ) -> ServiceResult<RoomTypeResponse> {
        actor.require(Capabilities::MANAGE_PROPERTIES)?;
        request.validate()?;
        PermissionService::new(self.ctx)
            .require_property(actor, property_id)
            .await?;

        let mut room_type = RoomType::new(property_id, request.name, request.max_guests);
        room_type.description = request.description;
        room_type.base_price = request.base_price;
        room_type.weekend_price = request.weekend_price;
        room_type.high_season_price = request.high_season_price;
        room_type.amenities = request.amenities;
        room_type.beds24_room_id = request.beds24_room_id;

        self.ctx.room_type_repo().create(&room_type).await?;

        info!(room_type_id = %room_type.id, property_id = %property_id, "Room type created");
        Ok(RoomTypeResponse::from(room_type))
    }

    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        actor: &Actor,
        room_type_id: Uuid,
        request: UpdateRoomTypeRequest,
    ) -> ServiceResult<RoomTypeResponse> {
        actor.require(Capabilities::MANAGE_PROPERTIES)?;
        request.validate()?;
        let (mut room_type, _) = self.load(actor, room_type_id).await?;

        if let Some(name) = request.name {
            room_type.name = name;
        }
        if let Some(description) = request.description {
            room_type.description = Some(description);
        }
        if let Some(max_guests) = request.max_guests {
            room_type.max_guests = max_guests;
        }
        if let Some(price) = request.base_price {
            room_type.base_price = Some(price);
        }
        if let Some(price) = request.weekend_price {
            room_type.weekend_price = Some(price);
        }
        if let Some(price) = request.high_season_price {
            room_type.high_season_price = Some(price);
        }
        if let Some(amenities) = request.amenities {
            room_type.amenities = amenities;
        }
        if let Some(beds24_id) = request.beds24_room_id {
            room_type.beds24_room_id = Some(beds24_id);
        }
        if let Some(active) = request.is_active {
            room_type.is_active = active;
        }
        room_type.updated_at = Utc::now();

        self.ctx.room_type_repo().update(&room_type).await?;

        info!(room_type_id = %room_type_id, "Room type updated");
        Ok(RoomTypeResponse::from(room_type))
    }

    /// Soft delete
    #[instrument(skip(self))]
    pub async fn delete(&self, actor: &Actor, room_type_id: Uuid) -> ServiceResult<()> {
        actor.require(Capabilities::MANAGE_PROPERTIES)?;
        self.load(actor, room_type_id).await?;
        self.ctx.room_type_repo().deactivate(room_type_id).await?;

        info!(room_type_id = %room_type_id, "Room type deactivated");
        Ok(())
    }
}

/// Room unit service
pub struct RoomUnitService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> RoomUnitService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    async fn load(&self, actor: &Actor, unit_id: Uuid) -> ServiceResult<RoomUnit> {
        let unit = self
            .ctx
            .room_unit_repo()
            .find_by_id(unit_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("RoomUnit", unit_id.to_string()))?;
        RoomTypeService::new(self.ctx)
            .load(actor, unit.room_type_id)
            .await?;
        Ok(unit)
    }

    #[instrument(skip(self))]
    pub async fn list_by_room_type(
        &self,
        actor: &Actor,
        room_type_id: Uuid,
    ) -> ServiceResult<Vec<RoomUnitResponse>> {
        actor.require(Capabilities::MANAGE_PROPERTIES)?;
        RoomTypeService::new(self.ctx).load(actor, room_type_id).await?;

        let units = self.ctx.room_unit_repo().list_by_room_type(room_type_id).await?;
        Ok(units.iter().map(RoomUnitResponse::from).collect())
    }

    #[instrument(skip(self))]
    pub async fn get(&self, actor: &Actor, unit_id: Uuid) -> ServiceResult<RoomUnitResponse> {
        actor.require(Capabilities::MANAGE_PROPERTIES)?;
        Ok(RoomUnitResponse::from(self.load(actor, unit_id).await?))
    }

    #[instrument(skip(self, request))]
    pub async fn create(
        &self,
        actor: &Actor,
        room_type_id: Uuid,
        request: CreateRoomUnitRequest,
    ) -> ServiceResult<RoomUnitResponse> {
        actor.require(Capabilities::MANAGE_PROPERTIES)?;
        request.validate()?;
        RoomTypeService::new(self.ctx).load(actor, room_type_id).await?;

        let mut unit = RoomUnit::new(room_type_id, request.unit_number);
        unit.floor = request.floor;
        unit.access_code = request.access_code;
        unit.wifi_ssid = request.wifi_ssid;
        unit.wifi_password = request.wifi_password;

        self.ctx.room_unit_repo().create(&unit).await?;

        info!(unit_id = %unit.id, room_type_id = %room_type_id, "Room unit created");
        Ok(RoomUnitResponse::from(unit))
    }

    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        actor: &Actor,
        unit_id: Uuid,
        request: UpdateRoomUnitRequest,
    ) -> ServiceResult<RoomUnitResponse> {
        actor.require(Capabilities::MANAGE_PROPERTIES)?;
        request.validate()?;
        let mut unit = self.load(actor, unit_id).await?;

        if let Some(number) = request.unit_number {
            unit.unit_number = number;
        }
        if let Some(floor) = request.floor {
            unit.floor = Some(floor);
        }
        if let Some(code) = request.access_code {
            unit.access_code = Some(code);
        }
        if let Some(ssid) = request.wifi_ssid {
            unit.wifi_ssid = Some(ssid);
        }
        if let Some(password) = request.wifi_password {
            unit.wifi_password = Some(password);
        }
        unit.updated_at = Utc::now();

        self.ctx.room_unit_repo().update(&unit).await?;

        info!(unit_id = %unit_id, "Room unit updated");
        Ok(RoomUnitResponse::from(unit))
    }

    /// Hard delete
    #[instrument(skip(self))]
    pub async fn delete(&self, actor: &Actor, unit_id: Uuid) -> ServiceResult<()> {
        actor.require(Capabilities::MANAGE_PROPERTIES)?;
        self.load(actor, unit_id).await?;
        self.ctx.room_unit_repo().delete(unit_id).await?;

        info!(unit_id = %unit_id, "Room unit deleted");
        Ok(())
    }
}

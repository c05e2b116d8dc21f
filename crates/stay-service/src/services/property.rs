//! Property service
//!
//! Handles property CRUD. Owners see their own properties; admins see all.

use chrono::Utc;
use stay_core::automation::parse_timezone;
use stay_core::entities::Property;
use stay_core::traits::{PageRequest, PropertyFilter};
use stay_core::Capabilities;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::dto::{
    parse_clock_time, CreatePropertyRequest, PropertyListQuery, PropertyResponse,
    UpdatePropertyRequest,
};

use super::context::ServiceContext;
use super::error::ServiceResult;
use super::permission::{Actor, PermissionService};

/// Property service
pub struct PropertyService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> PropertyService<'a> {
    /// Create a new PropertyService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// List properties visible to the actor
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        actor: &Actor,
        query: &PropertyListQuery,
        page: PageRequest,
    ) -> ServiceResult<Vec<PropertyResponse>> {
        actor.require(Capabilities::MANAGE_PROPERTIES)?;

        let filter = PropertyFilter {
            owner_id: actor.owner_scope(),
            include_inactive: query.include_inactive,
        };
        let properties = self.ctx.property_repo().list(&filter, page).await?;
        Ok(properties.iter().map(PropertyResponse::from).collect())
    }

    /// Get a property by ID
    #[instrument(skip(self))]
    pub async fn get(&self, actor: &Actor, property_id: Uuid) -> ServiceResult<PropertyResponse> {
        actor.require(Capabilities::MANAGE_PROPERTIES)?;
        let property = PermissionService::new(self.ctx)
            .require_property(actor, property_id)
            .await?;
        Ok(PropertyResponse::from(property))
    }

    /// Create a property. Admins may assign any owner; owners always own
    /// what they create.
    #[instrument(skip(self, request))]
    pub async fn create(
        &self,
        actor: &Actor,
        request: CreatePropertyRequest,
    ) -> ServiceResult<PropertyResponse> {
        actor.require(Capabilities::MANAGE_PROPERTIES)?;
        request.validate()?;

        let owner_id = if actor.can(Capabilities::ALL_PROPERTIES) {
            request.owner_id.or(Some(actor.user_id))
        } else {
            Some(actor.user_id)
        };

        let timezone = request
            .timezone
            .unwrap_or_else(|| self.ctx.portal().default_timezone.clone());
        parse_timezone(&timezone)?;

        let mut property = Property::new(request.name, owner_id, timezone);
        property.address = request.address;
        property.description = request.description;
        property.amenities = request.amenities;
        property.wifi_ssid = request.wifi_ssid;
        property.wifi_password = request.wifi_password;
        property.beds24_property_id = request.beds24_property_id;
        if let Some(t) = request.check_in_time.as_deref() {
            property.check_in_time = parse_clock_time("checkInTime", t)?;
        }
        if let Some(t) = request.access_time.as_deref() {
            property.access_time = Some(parse_clock_time("accessTime", t)?);
        }
        if let Some(t) = request.departure_time.as_deref() {
            property.departure_time = parse_clock_time("departureTime", t)?;
        }

        self.ctx.property_repo().create(&property).await?;

        info!(property_id = %property.id, owner_id = ?property.owner_id, "Property created");
        Ok(PropertyResponse::from(property))
    }

    /// Update a property
    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        actor: &Actor,
        property_id: Uuid,
        request: UpdatePropertyRequest,
    ) -> ServiceResult<PropertyResponse> {
        actor.require(Capabilities::MANAGE_PROPERTIES)?;
        request.validate()?;

        let mut property = PermissionService::new(self.ctx)
            .require_property(actor, property_id)
            .await?;

        if let Some(name) = request.name {
            property.name = name;
        }
        if let Some(address) = request.address {
            property.address = Some(address);
        }
        if let Some(description) = request.description {
            property.description = Some(description);
        }
        if let Some(amenities) = request.amenities {
            property.amenities = amenities;
        }
        if let Some(ssid) = request.wifi_ssid {
            property.wifi_ssid = Some(ssid);
        }
        if let Some(password) = request.wifi_password {
            property.wifi_password = Some(password);
        }
        if let Some(t) = request.check_in_time.as_deref() {
            property.check_in_time = parse_clock_time("checkInTime", t)?;
        }
        if let Some(t) = request.access_time.as_deref() {
            property.access_time = Some(parse_clock_time("accessTime", t)?);
        }
        if let Some(t) = request.departure_time.as_deref() {
            property.departure_time = parse_clock_time("departureTime", t)?;
        }
        if let Some(timezone) = request.timezone {
            parse_timezone(&timezone)?;
            property.timezone = timezone;
        }
        if let Some(beds24_id) = request.beds24_property_id {
            property.beds24_property_id = Some(beds24_id);
        }
        if let Some(active) = request.is_active {
            property.is_active = active;
        }
        property.updated_at = Utc::now();

        self.ctx.property_repo().update(&property).await?;

        info!(property_id = %property_id, "Property updated");
        Ok(PropertyResponse::from(property))
    }

    /// Soft delete a property
    #[instrument(skip(self))]
    pub async fn delete(&self, actor: &Actor, property_id: Uuid) -> ServiceResult<()> {
        actor.require(Capabilities::MANAGE_PROPERTIES)?;
        PermissionService::new(self.ctx)
            .require_property(actor, property_id)
            .await?;

        self.ctx.property_repo().deactivate(property_id).await?;

        info!(property_id = %property_id, "Property deactivated");
        Ok(())
    }
}

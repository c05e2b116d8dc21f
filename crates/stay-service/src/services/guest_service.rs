//! Add-on service catalog and per-reservation payment state

use chrono::Utc;
use stay_core::entities::{GuestService, Reservation, ReservationService};
use stay_core::Capabilities;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::dto::{
    AttachServiceRequest, CreateGuestServiceRequest, ExemptServiceRequest, GuestServiceResponse,
    MarkPaidRequest, ReservationServiceResponse, UpdateGuestServiceRequest,
};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::permission::{Actor, PermissionService};

/// Guest service catalog service
pub struct GuestServiceCatalogService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> GuestServiceCatalogService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    async fn load(&self, actor: &Actor, service_id: Uuid) -> ServiceResult<GuestService> {
        let service = self
            .ctx
            .guest_service_repo()
            .find_by_id(service_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("GuestService", service_id.to_string()))?;
        PermissionService::new(self.ctx)
            .require_property(actor, service.property_id)
            .await?;
        Ok(service)
    }

    async fn load_item(&self, actor: &Actor, item_id: Uuid) -> ServiceResult<ReservationService> {
        let item = self
            .ctx
            .reservation_service_repo()
            .find_by_id(item_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("ReservationService", item_id.to_string()))?;
        PermissionService::new(self.ctx)
            .require_reservation(actor, item.reservation_id)
            .await?;
        Ok(item)
    }

    // ========================================================================
    // Catalog
    // ========================================================================

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        actor: &Actor,
        property_id: Uuid,
        include_inactive: bool,
    ) -> ServiceResult<Vec<GuestServiceResponse>> {
        actor.require(Capabilities::MANAGE_RESERVATIONS)?;
        PermissionService::new(self.ctx)
            .require_property(actor, property_id)
            .await?;

        let services = self
            .ctx
            .guest_service_repo()
            .list_by_property(property_id, !include_inactive)
            .await?;
        Ok(services.iter().map(GuestServiceResponse::from).collect())
    }

    #[instrument(skip(self))]
    pub async fn get(&self, actor: &Actor, service_id: Uuid) -> ServiceResult<GuestServiceResponse> {
        actor.require(Capabilities::MANAGE_RESERVATIONS)?;
        Ok(GuestServiceResponse::from(self.load(actor, service_id).await?))
    }

    #[instrument(skip(self, request))]
    pub async fn create(
        &self,
        actor: &Actor,
        property_id: Uuid,
        request: CreateGuestServiceRequest,
    ) -> ServiceResult<GuestServiceResponse> {
        actor.require(Capabilities::MANAGE_RESERVATIONS)?;
        request.validate()?;
        PermissionService::new(self.ctx)
            .require_property(actor, property_id)
            .await?;

        let mut service =
            GuestService::new(property_id, request.name, request.price, request.is_mandatory);
        service.description = request.description;
        service.per_guest_night = request.per_guest_night;
        if let Some(currency) = request.currency {
            service.currency = currency;
        }

        self.ctx.guest_service_repo().create(&service).await?;

        info!(service_id = %service.id, mandatory = service.is_mandatory, "Guest service created");
        Ok(GuestServiceResponse::from(service))
    }

    /// Update a catalog entry. Reservations that already carry the service
    /// keep the amount they were charged.
    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        actor: &Actor,
        service_id: Uuid,
        request: UpdateGuestServiceRequest,
    ) -> ServiceResult<GuestServiceResponse> {
        actor.require(Capabilities::MANAGE_RESERVATIONS)?;
        request.validate()?;
        let mut service = self.load(actor, service_id).await?;

        if let Some(name) = request.name {
            service.name = name;
        }
        if let Some(description) = request.description {
            service.description = Some(description);
        }
        if let Some(price) = request.price {
            service.price = price;
        }
        if let Some(mandatory) = request.is_mandatory {
            service.is_mandatory = mandatory;
        }
        if let Some(per_guest_night) = request.per_guest_night {
            service.per_guest_night = per_guest_night;
        }
        if let Some(active) = request.is_active {
            service.is_active = active;
        }
        service.updated_at = Utc::now();

        self.ctx.guest_service_repo().update(&service).await?;

        info!(service_id = %service_id, "Guest service updated");
        Ok(GuestServiceResponse::from(service))
    }

    /// Soft delete
    #[instrument(skip(self))]
    pub async fn delete(&self, actor: &Actor, service_id: Uuid) -> ServiceResult<()> {
        actor.require(Capabilities::MANAGE_RESERVATIONS)?;
        self.load(actor, service_id).await?;
        self.ctx.guest_service_repo().deactivate(service_id).await?;

        info!(service_id = %service_id, "Guest service deactivated");
        Ok(())
    }

    // ========================================================================
    // Reservation services
    // ========================================================================

    #[instrument(skip(self))]
    pub async fn list_for_reservation(
        &self,
        actor: &Actor,
        reservation_id: Uuid,
    ) -> ServiceResult<Vec<ReservationServiceResponse>> {
        actor.require(Capabilities::MANAGE_RESERVATIONS)?;
        PermissionService::new(self.ctx)
            .require_reservation(actor, reservation_id)
            .await?;

        let items = self
            .ctx
            .reservation_service_repo()
            .list_by_reservation(reservation_id)
            .await?;
        Ok(items.iter().map(ReservationServiceResponse::from).collect())
    }

    /// Attach a catalog service of the reservation's property
    #[instrument(skip(self, request))]
    pub async fn attach(
        &self,
        actor: &Actor,
        reservation_id: Uuid,
        request: AttachServiceRequest,
    ) -> ServiceResult<ReservationServiceResponse> {
        actor.require(Capabilities::MANAGE_RESERVATIONS)?;
        let (reservation, _) = PermissionService::new(self.ctx)
            .require_reservation(actor, reservation_id)
            .await?;

        let service = self
            .ctx
            .guest_service_repo()
            .find_by_id(request.service_id)
            .await?
            .filter(|s| s.is_active)
            .ok_or_else(|| ServiceError::not_found("GuestService", request.service_id.to_string()))?;
        if service.property_id != reservation.property_id {
            return Err(ServiceError::validation(
                "service belongs to another property",
            ));
        }

        let item = ReservationService::from_catalog(
            reservation.id,
            &service,
            reservation.total_guests(),
            reservation.nights(),
        );
        if !self.ctx.reservation_service_repo().attach(&item).await? {
            return Err(ServiceError::conflict(format!(
                "{} is already attached to this reservation",
                service.name
            )));
        }

        info!(reservation_id = %reservation.id, service_id = %service.id, "Service attached");
        Ok(ReservationServiceResponse::from(item))
    }

    /// Attach every active mandatory service of the property. Services the
    /// reservation already carries are left untouched.
    #[instrument(skip(self, reservation), fields(reservation_id = %reservation.id))]
    pub async fn attach_mandatory(&self, reservation: &Reservation) -> ServiceResult<usize> {
        let services = self
            .ctx
            .guest_service_repo()
            .list_by_property(reservation.property_id, true)
            .await?;

        let mut attached = 0;
        for service in services.iter().filter(|s| s.is_mandatory) {
            let item = ReservationService::from_catalog(
                reservation.id,
                service,
                reservation.total_guests(),
                reservation.nights(),
            );
            if self.ctx.reservation_service_repo().attach(&item).await? {
                attached += 1;
            }
        }

        if attached > 0 {
            info!(attached, "Mandatory services attached");
        }
        Ok(attached)
    }

    #[instrument(skip(self, request))]
    pub async fn mark_paid(
        &self,
        actor: &Actor,
        item_id: Uuid,
        request: MarkPaidRequest,
    ) -> ServiceResult<ReservationServiceResponse> {
        actor.require(Capabilities::MANAGE_RESERVATIONS)?;
        request.validate()?;
        let mut item = self.load_item(actor, item_id).await?;

        item.mark_paid(request.payment_reference, Utc::now())?;
        self.ctx.reservation_service_repo().update(&item).await?;

        info!(item_id = %item_id, "Service marked paid");
        Ok(ReservationServiceResponse::from(item))
    }

    #[instrument(skip(self, request))]
    pub async fn exempt(
        &self,
        actor: &Actor,
        item_id: Uuid,
        request: ExemptServiceRequest,
    ) -> ServiceResult<ReservationServiceResponse> {
        actor.require(Capabilities::MANAGE_RESERVATIONS)?;
        request.validate()?;
        let mut item = self.load_item(actor, item_id).await?;

        if !item.is_mandatory {
            warn!(item_id = %item_id, "Exempting an optional service");
        }
        item.exempt(request.reason, Utc::now())?;
        self.ctx.reservation_service_repo().update(&item).await?;

        info!(item_id = %item_id, "Service exempted");
        Ok(ReservationServiceResponse::from(item))
    }
}

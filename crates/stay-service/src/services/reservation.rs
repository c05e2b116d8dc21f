//! Reservation service
//!
//! Admin-side reservation CRUD. Creating or re-dating a reservation plans
//! its automated messages; cancelling it cancels what is still pending.

use chrono::Utc;
use stay_common::generate_guest_token;
use stay_core::entities::{Property, Reservation, ReservationStatus};
use stay_core::traits::{PageRequest, ReservationFilter};
use stay_core::{Capabilities, DomainError};
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::dto::{
    CreateReservationRequest, PaginatedResponse, ReservationListQuery, ReservationResponse,
    UpdateReservationRequest, UpdateReservationStatusRequest,
};

use super::automation::AutomationService;
use super::cleaning_task::CleaningTaskService;
use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::guest_service::GuestServiceCatalogService;
use super::permission::{Actor, PermissionService};

/// Reservation service
pub struct ReservationService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ReservationService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    fn respond(&self, reservation: &Reservation) -> ReservationResponse {
        ReservationResponse::from(reservation)
            .with_portal_url(self.ctx.portal().guest_url(&reservation.guest_token))
    }

    /// Check the room assignment against the property and party size.
    ///
    /// A unit without a room type takes the unit's type.
    async fn resolve_room(
        &self,
        property: &Property,
        reservation: &mut Reservation,
    ) -> ServiceResult<()> {
        if let Some(unit_id) = reservation.room_unit_id {
            let unit = self
                .ctx
                .room_unit_repo()
                .find_by_id(unit_id)
                .await?
                .ok_or(DomainError::RoomUnitNotFound(unit_id))?;
            match reservation.room_type_id {
                Some(type_id) if type_id != unit.room_type_id => {
                    return Err(ServiceError::validation(
                        "room unit does not belong to the room type",
                    ));
                }
                _ => reservation.room_type_id = Some(unit.room_type_id),
            }
        }

        if let Some(type_id) = reservation.room_type_id {
            let room_type = self
                .ctx
                .room_type_repo()
                .find_by_id(type_id)
                .await?
                .ok_or(DomainError::RoomTypeNotFound(type_id))?;
            if room_type.property_id != property.id {
                return Err(ServiceError::validation(
                    "room type belongs to another property",
                ));
            }
            if !room_type.fits(reservation.total_guests()) {
                return Err(DomainError::TooManyGuests {
                    max: room_type.max_guests,
                }
                .into());
            }
        }
        Ok(())
    }

    /// List reservations visible to the actor
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        actor: &Actor,
        query: ReservationListQuery,
        page: PageRequest,
    ) -> ServiceResult<PaginatedResponse<ReservationResponse>> {
        actor.require(Capabilities::MANAGE_RESERVATIONS)?;

        let filter = ReservationFilter {
            property_id: query.property_id,
            owner_id: actor.owner_scope(),
            status: query.status,
            arrival_from: query.arrival_from,
            arrival_to: query.arrival_to,
            search: query.search.filter(|s| !s.trim().is_empty()),
        };

        let repo = self.ctx.reservation_repo();
        let rows = repo.list(&filter, page).await?;
        let total = repo.count(&filter).await?;

        let data = rows
            .iter()
            .map(|details| {
                ReservationResponse::from(details).with_portal_url(
                    self.ctx
                        .portal()
                        .guest_url(&details.reservation.guest_token),
                )
            })
            .collect();
        Ok(PaginatedResponse::new(data, page.limit, page.offset, Some(total)))
    }

    #[instrument(skip(self))]
    pub async fn get(&self, actor: &Actor, reservation_id: Uuid) -> ServiceResult<ReservationResponse> {
        actor.require(Capabilities::MANAGE_RESERVATIONS)?;
        let (reservation, _) = PermissionService::new(self.ctx)
            .require_reservation(actor, reservation_id)
            .await?;
        Ok(self.respond(&reservation))
    }

    /// Create a reservation, attach mandatory services and plan messages
    #[instrument(skip(self, request))]
    pub async fn create(
        &self,
        actor: &Actor,
        request: CreateReservationRequest,
    ) -> ServiceResult<ReservationResponse> {
        actor.require(Capabilities::MANAGE_RESERVATIONS)?;
        request.validate()?;
        let property = PermissionService::new(self.ctx)
            .require_property(actor, request.property_id)
            .await?;

        let mut reservation = Reservation::new(
            property.id,
            request.booking_name,
            request.check_in_date,
            request.check_out_date,
            generate_guest_token(),
        );
        reservation.room_type_id = request.room_type_id;
        reservation.room_unit_id = request.room_unit_id;
        reservation.booking_email = request.booking_email;
        reservation.booking_phone = request.booking_phone;
        reservation.num_adults = request.num_adults;
        reservation.num_children = request.num_children;
        reservation.total_amount = request.total_amount;
        reservation.notes = request.notes;
        if let Some(currency) = request.currency {
            reservation.currency = currency;
        }
        reservation.validate_dates()?;
        if let Some(status) = request.status {
            reservation.transition_to(status)?;
        }
        self.resolve_room(&property, &mut reservation).await?;

        self.ctx.reservation_repo().create(&reservation).await?;
        info!(reservation_id = %reservation.id, property_id = %property.id, "Reservation created");

        GuestServiceCatalogService::new(self.ctx)
            .attach_mandatory(&reservation)
            .await?;
        AutomationService::new(self.ctx)
            .replan(&reservation, &property)
            .await?;

        Ok(self.respond(&reservation))
    }

    /// Update booking fields. Changing dates or the room re-plans messages.
    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        actor: &Actor,
        reservation_id: Uuid,
        request: UpdateReservationRequest,
    ) -> ServiceResult<ReservationResponse> {
        actor.require(Capabilities::MANAGE_RESERVATIONS)?;
        request.validate()?;
        let (mut reservation, property) = PermissionService::new(self.ctx)
            .require_reservation(actor, reservation_id)
            .await?;

        let before = (
            reservation.check_in_date,
            reservation.check_out_date,
            reservation.room_unit_id,
        );

        if let Some(room_type_id) = request.room_type_id {
            reservation.room_type_id = Some(room_type_id);
        }
        if let Some(room_unit_id) = request.room_unit_id {
            reservation.room_unit_id = Some(room_unit_id);
        }
        if let Some(name) = request.booking_name {
            reservation.booking_name = name;
        }
        if let Some(email) = request.booking_email {
            reservation.booking_email = Some(email);
        }
        if let Some(phone) = request.booking_phone {
            reservation.booking_phone = Some(phone);
        }
        if let Some(date) = request.check_in_date {
            reservation.check_in_date = date;
        }
        if let Some(date) = request.check_out_date {
            reservation.check_out_date = date;
        }
        if let Some(adults) = request.num_adults {
            reservation.num_adults = adults;
        }
        if let Some(children) = request.num_children {
            reservation.num_children = children;
        }
        if let Some(amount) = request.total_amount {
            reservation.total_amount = Some(amount);
        }
        if let Some(notes) = request.notes {
            reservation.notes = Some(notes);
        }
        reservation.validate_dates()?;
        self.resolve_room(&property, &mut reservation).await?;
        reservation.updated_at = Utc::now();

        self.ctx.reservation_repo().update(&reservation).await?;
        info!(reservation_id = %reservation_id, "Reservation updated");

        let after = (
            reservation.check_in_date,
            reservation.check_out_date,
            reservation.room_unit_id,
        );
        if before != after && !reservation.status.is_terminal() {
            AutomationService::new(self.ctx)
                .replan(&reservation, &property)
                .await?;
        }

        Ok(self.respond(&reservation))
    }

    /// Move the reservation through its status graph
    #[instrument(skip(self, request))]
    pub async fn update_status(
        &self,
        actor: &Actor,
        reservation_id: Uuid,
        request: UpdateReservationStatusRequest,
    ) -> ServiceResult<ReservationResponse> {
        actor.require(Capabilities::MANAGE_RESERVATIONS)?;
        let (mut reservation, property) = PermissionService::new(self.ctx)
            .require_reservation(actor, reservation_id)
            .await?;

        let previous = reservation.status;
        reservation.transition_to(request.status)?;
        if previous == reservation.status {
            return Ok(self.respond(&reservation));
        }
        if reservation.status == ReservationStatus::CheckedIn && reservation.checked_in_at.is_none()
        {
            reservation.checked_in_at = Some(Utc::now());
        }

        self.ctx.reservation_repo().update(&reservation).await?;
        info!(
            reservation_id = %reservation_id,
            from = %previous,
            to = %reservation.status,
            "Reservation status changed"
        );

        match reservation.status {
            ReservationStatus::Cancelled | ReservationStatus::NoShow => {
                let cancelled = self
                    .ctx
                    .scheduled_message_repo()
                    .cancel_pending_for_reservation(reservation_id)
                    .await?;
                info!(reservation_id = %reservation_id, cancelled, "Pending messages cancelled");
            }
            // AFTER_CHECKIN_HOURS anchors on the actual check-in time
            ReservationStatus::CheckedIn => {
                AutomationService::new(self.ctx)
                    .replan(&reservation, &property)
                    .await?;
            }
            ReservationStatus::CheckedOut => {
                CleaningTaskService::new(self.ctx)
                    .ensure_turnover_task(&reservation)
                    .await?;
            }
            _ => {}
        }

        Ok(self.respond(&reservation))
    }

    /// Cancel a reservation
    #[instrument(skip(self))]
    pub async fn cancel(&self, actor: &Actor, reservation_id: Uuid) -> ServiceResult<ReservationResponse> {
        self.update_status(
            actor,
            reservation_id,
            UpdateReservationStatusRequest {
                status: ReservationStatus::Cancelled,
            },
        )
        .await
    }

    /// Reservations are never hard-deleted; delete cancels
    #[instrument(skip(self))]
    pub async fn delete(&self, actor: &Actor, reservation_id: Uuid) -> ServiceResult<()> {
        actor.require(Capabilities::MANAGE_RESERVATIONS)?;
        let (reservation, _) = PermissionService::new(self.ctx)
            .require_reservation(actor, reservation_id)
            .await?;
        if reservation.status.is_terminal() {
            warn!(reservation_id = %reservation_id, status = %reservation.status, "Reservation already closed");
            return Ok(());
        }
        self.cancel(actor, reservation_id).await.map(|_| ())
    }
}

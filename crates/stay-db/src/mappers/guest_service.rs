//! Add-on service mappers

use stay_core::entities::{GuestService, ReservationService};
use stay_core::DomainError;

use super::parse_column;
use crate::models::{GuestServiceModel, ReservationServiceModel};

impl From<GuestServiceModel> for GuestService {
    fn from(model: GuestServiceModel) -> Self {
        GuestService {
            id: model.id,
            property_id: model.property_id,
            name: model.name,
            description: model.description,
            price: model.price,
            currency: model.currency,
            is_mandatory: model.is_mandatory,
            per_guest_night: model.per_guest_night,
            is_active: model.is_active,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl TryFrom<ReservationServiceModel> for ReservationService {
    type Error = DomainError;

    fn try_from(model: ReservationServiceModel) -> Result<Self, Self::Error> {
        Ok(ReservationService {
            id: model.id,
            reservation_id: model.reservation_id,
            service_id: model.service_id,
            name: model.name,
            amount: model.amount,
            currency: model.currency,
            is_mandatory: model.is_mandatory,
            status: parse_column("reservation_services.status", &model.status)?,
            payment_reference: model.payment_reference,
            exempt_reason: model.exempt_reason,
            paid_at: model.paid_at,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

//! Reservation mappers

use stay_core::entities::{GuestRegistration, Reservation, ReservationDetails};
use stay_core::DomainError;

use super::parse_column;
use crate::models::{ReservationDetailsModel, ReservationModel};

/// Columns bound for the flattened guest register, in table order:
/// full name, nationality, address, phone, occupation, passport number
pub fn registration_columns(
    registration: Option<&GuestRegistration>,
) -> [Option<&str>; 6] {
    match registration {
        Some(r) => [
            Some(r.full_name.as_str()),
            Some(r.nationality.as_str()),
            Some(r.address.as_str()),
            r.phone.as_deref(),
            r.occupation.as_deref(),
            r.passport_number.as_deref(),
        ],
        None => [None; 6],
    }
}

impl TryFrom<ReservationModel> for Reservation {
    type Error = DomainError;

    fn try_from(model: ReservationModel) -> Result<Self, Self::Error> {
        // A register row always has a name; the other fields follow it.
        let registration = model.guest_full_name.map(|full_name| GuestRegistration {
            full_name,
            nationality: model.guest_nationality.unwrap_or_default(),
            address: model.guest_address.unwrap_or_default(),
            phone: model.guest_phone,
            occupation: model.guest_occupation,
            passport_number: model.guest_passport_number,
        });

        Ok(Reservation {
            id: model.id,
            property_id: model.property_id,
            room_type_id: model.room_type_id,
            room_unit_id: model.room_unit_id,
            beds24_booking_id: model.beds24_booking_id,
            booking_name: model.booking_name,
            booking_email: model.booking_email,
            booking_phone: model.booking_phone,
            check_in_date: model.check_in_date,
            check_out_date: model.check_out_date,
            num_adults: model.num_adults,
            num_children: model.num_children,
            total_amount: model.total_amount,
            currency: model.currency,
            status: parse_column("reservations.status", &model.status)?,
            guest_token: model.guest_token,
            registration,
            checked_in_at: model.checked_in_at,
            notes: model.notes,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

impl TryFrom<ReservationDetailsModel> for ReservationDetails {
    type Error = DomainError;

    fn try_from(model: ReservationDetailsModel) -> Result<Self, Self::Error> {
        Ok(ReservationDetails {
            reservation: Reservation::try_from(model.reservation)?,
            property_name: model.property_name,
            room_type_name: model.room_type_name,
            room_unit_number: model.room_unit_number,
        })
    }
}

//! Beds24 booking webhook
//!
//! Beds24 is the channel manager; its booking id is the idempotency key for
//! reservations it creates. Delivering the same webhook twice leaves one
//! reservation row.

use stay_common::generate_guest_token;
use stay_core::entities::{Reservation, ReservationStatus};
use tracing::{debug, info, instrument, warn};

use crate::dto::{Beds24Booking, Beds24WebhookPayload, Beds24WebhookResponse};

use super::automation::AutomationService;
use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::guest_service::GuestServiceCatalogService;

/// Reservation status for a webhook event.
///
/// `CANCEL` wins over the booking's own status. Numeric codes follow Beds24:
/// 0 cancelled, 1 confirmed, 2 new, 3 request.
pub fn map_booking_status(event: Option<&str>, status: Option<&str>) -> ReservationStatus {
    if event.is_some_and(|e| e.eq_ignore_ascii_case("cancel")) {
        return ReservationStatus::Cancelled;
    }

    match status.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
        Some("0" | "cancelled" | "canceled") => ReservationStatus::Cancelled,
        Some("3" | "request" | "inquiry") => ReservationStatus::Pending,
        Some("black" | "noshow" | "no_show") => ReservationStatus::NoShow,
        _ => ReservationStatus::Confirmed,
    }
}

/// Guest name from the booking, falling back to the booking id
pub fn booking_name(booking: &Beds24Booking, booking_id: i64) -> String {
    let name = [booking.first_name.as_deref(), booking.last_name.as_deref()]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    if name.is_empty() {
        format!("Beds24 #{booking_id}")
    } else {
        name
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Beds24 webhook service
pub struct Beds24Service<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> Beds24Service<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Upsert the booking, attach mandatory services and re-plan messages
    #[instrument(skip(self, payload), fields(event = ?payload.event, booking_id = ?payload.booking.id))]
    pub async fn handle_webhook(
        &self,
        payload: Beds24WebhookPayload,
    ) -> ServiceResult<Beds24WebhookResponse> {
        let booking = &payload.booking;
        let booking_id = booking
            .id
            .ok_or_else(|| ServiceError::validation("booking.id is required"))?;
        let beds24_property_id = booking
            .property_id
            .ok_or_else(|| ServiceError::validation("booking.propertyId is required"))?;

        let property = self
            .ctx
            .property_repo()
            .find_by_beds24_id(beds24_property_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Property", format!("beds24:{beds24_property_id}")))?;

        let room_type_id = match booking.room_id {
            Some(room_id) => match self.ctx.room_type_repo().find_by_beds24_id(room_id).await? {
                Some(rt) if rt.property_id == property.id => Some(rt.id),
                Some(_) => {
                    warn!(room_id, "Beds24 room belongs to another property, ignored");
                    None
                }
                None => {
                    debug!(room_id, "No room type mapped to Beds24 room");
                    None
                }
            },
            None => None,
        };

        let mut incoming = Reservation::new(
            property.id,
            booking_name(booking, booking_id),
            booking.arrival,
            booking.departure,
            generate_guest_token(),
        );
        incoming.beds24_booking_id = Some(booking_id);
        incoming.room_type_id = room_type_id;
        incoming.booking_email = non_empty(&booking.email);
        incoming.booking_phone = non_empty(&booking.phone);
        incoming.num_adults = booking.num_adult.unwrap_or(1).max(1);
        incoming.num_children = booking.num_child.unwrap_or(0).max(0);
        incoming.total_amount = booking.price.map(|p| p.round() as i64);
        incoming.notes = non_empty(&booking.notes);
        incoming.status = map_booking_status(payload.event.as_deref(), booking.status.as_deref());
        incoming.validate_dates()?;

        let repo = self.ctx.reservation_repo();
        let previous = repo.find_by_beds24_id(booking_id).await?;
        let upserted = repo.upsert_by_beds24_id(&incoming).await?;
        let reservation = upserted.value;

        info!(
            reservation_id = %reservation.id,
            created = upserted.created,
            status = %reservation.status,
            "Beds24 booking stored"
        );

        let services_attached = if reservation.status.is_terminal() {
            0
        } else {
            GuestServiceCatalogService::new(self.ctx)
                .attach_mandatory(&reservation)
                .await?
        };

        let modified = payload
            .event
            .as_deref()
            .is_some_and(|e| e.eq_ignore_ascii_case("modify"));
        let changed = previous.as_ref().is_none_or(|p| {
            p.check_in_date != reservation.check_in_date
                || p.check_out_date != reservation.check_out_date
                || p.status != reservation.status
        });

        let plan = if changed || modified {
            Some(
                AutomationService::new(self.ctx)
                    .replan(&reservation, &property)
                    .await?,
            )
        } else {
            debug!("Booking unchanged, messages left as planned");
            None
        };

        Ok(Beds24WebhookResponse {
            reservation_id: reservation.id,
            created: upserted.created,
            status: reservation.status,
            services_attached,
            plan,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn booking() -> Beds24Booking {
        Beds24Booking {
            id: Some(12345),
            property_id: Some(678),
            room_id: None,
            arrival: NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
            departure: NaiveDate::from_ymd_opt(2024, 3, 8).unwrap(),
            first_name: Some(" Anna ".to_string()),
            last_name: Some("Smith".to_string()),
            email: None,
            phone: None,
            num_adult: Some(2),
            num_child: None,
            price: Some(36000.0),
            status: Some("1".to_string()),
            notes: None,
        }
    }

    #[test]
    fn test_cancel_event_wins() {
        assert_eq!(
            map_booking_status(Some("CANCEL"), Some("1")),
            ReservationStatus::Cancelled
        );
    }

    #[test]
    fn test_numeric_status_codes() {
        assert_eq!(map_booking_status(None, Some("0")), ReservationStatus::Cancelled);
        assert_eq!(map_booking_status(None, Some("1")), ReservationStatus::Confirmed);
        assert_eq!(map_booking_status(None, Some("2")), ReservationStatus::Confirmed);
        assert_eq!(map_booking_status(None, Some("3")), ReservationStatus::Pending);
        assert_eq!(map_booking_status(Some("NEW"), None), ReservationStatus::Confirmed);
    }

    #[test]
    fn test_text_status() {
        assert_eq!(
            map_booking_status(Some("MODIFY"), Some("Cancelled")),
            ReservationStatus::Cancelled
        );
        assert_eq!(map_booking_status(None, Some("request")), ReservationStatus::Pending);
    }

    #[test]
    fn test_booking_name() {
        assert_eq!(booking_name(&booking(), 12345), "Anna Smith");

        let mut anonymous = booking();
        anonymous.first_name = None;
        anonymous.last_name = Some("  ".to_string());
        assert_eq!(booking_name(&anonymous, 12345), "Beds24 #12345");
    }
}

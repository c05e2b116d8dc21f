//! Access unlock evaluation
//!
//! The door code becomes visible once the guest has checked in online,
//! every mandatory service is paid or exempted, and the property's access
//! time on the arrival day has been reached.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use crate::automation::local_instant;
use crate::entities::{Property, Reservation, ReservationService, ReservationStatus};
use crate::error::DomainError;

/// Why access is still locked
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum LockReason {
    CheckInIncomplete,
    UnpaidMandatoryServices { count: usize },
    BeforeAccessTime { unlocks_at: DateTime<Utc> },
    ReservationInactive { status: ReservationStatus },
}

/// Result of evaluating the gate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessState {
    Unlocked,
    Locked(Vec<LockReason>),
}

impl AccessState {
    #[inline]
    pub fn is_unlocked(&self) -> bool {
        matches!(self, Self::Unlocked)
    }

    pub fn reasons(&self) -> &[LockReason] {
        match self {
            Self::Unlocked => &[],
            Self::Locked(reasons) => reasons,
        }
    }
}

/// Inputs to the access decision
#[derive(Debug, Clone, Copy)]
pub struct AccessGate<'a> {
    pub reservation: &'a Reservation,
    pub services: &'a [ReservationService],
    pub unlocks_at: DateTime<Utc>,
}

impl<'a> AccessGate<'a> {
    /// Build the gate from the property's access time in its timezone
    pub fn for_property(
        reservation: &'a Reservation,
        services: &'a [ReservationService],
        property: &Property,
        tz: Tz,
    ) -> Result<Self, DomainError> {
        let unlocks_at = local_instant(
            tz,
            reservation.check_in_date,
            property.effective_access_time(),
        )?;
        Ok(Self {
            reservation,
            services,
            unlocks_at,
        })
    }

    /// Evaluate every condition; all failing ones are reported
    pub fn evaluate(&self, now: DateTime<Utc>) -> AccessState {
        let mut reasons = Vec::new();

        if matches!(
            self.reservation.status,
            ReservationStatus::Cancelled | ReservationStatus::NoShow | ReservationStatus::CheckedOut
        ) {
            reasons.push(LockReason::ReservationInactive {
                status: self.reservation.status,
            });
        }

        if !self.reservation.is_checkin_complete() {
            reasons.push(LockReason::CheckInIncomplete);
        }

        let unpaid = self
            .services
            .iter()
            .filter(|s| s.is_mandatory && !s.is_settled())
            .count();
        if unpaid > 0 {
            reasons.push(LockReason::UnpaidMandatoryServices { count: unpaid });
        }

        if now < self.unlocks_at {
            reasons.push(LockReason::BeforeAccessTime {
                unlocks_at: self.unlocks_at,
            });
        }

        if reasons.is_empty() {
            AccessState::Unlocked
        } else {
            AccessState::Locked(reasons)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automation::parse_timezone;
    use crate::entities::{GuestRegistration, GuestService};
    use chrono::{NaiveDate, TimeZone};

    fn property() -> Property {
        Property::new("Sakura House".to_string(), None, "Asia/Tokyo".to_string())
    }

    fn checked_in_reservation(property: &Property) -> Reservation {
        let mut r = Reservation::new(
            property.id,
            "Mina".to_string(),
            NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 7).unwrap(),
            "tok".to_string(),
        );
        r.status = ReservationStatus::Confirmed;
        r.complete_check_in(
            GuestRegistration {
                full_name: "Mina".to_string(),
                nationality: "JP".to_string(),
                address: "Kyoto".to_string(),
                ..GuestRegistration::default()
            },
            Utc.with_ymd_and_hms(2024, 3, 4, 0, 0, 0).unwrap(),
        )
        .unwrap();
        r
    }

    fn tax(reservation: &Reservation) -> ReservationService {
        let service = GuestService::new(reservation.property_id, "Tax".to_string(), 200, true);
        ReservationService::from_catalog(reservation.id, &service, 1, 2)
    }

    #[test]
    fn test_unlocked_when_all_conditions_hold() {
        let property = property();
        let reservation = checked_in_reservation(&property);
        let mut item = tax(&reservation);
        item.mark_paid(None, Utc::now()).unwrap();
        let services = vec![item];

        let gate =
            AccessGate::for_property(&reservation, &services, &property, parse_timezone("Asia/Tokyo").unwrap())
                .unwrap();
        // 15:00 JST on arrival day is 06:00 UTC
        assert_eq!(gate.unlocks_at, Utc.with_ymd_and_hms(2024, 3, 5, 6, 0, 0).unwrap());

        let now = Utc.with_ymd_and_hms(2024, 3, 5, 6, 0, 0).unwrap();
        assert!(gate.evaluate(now).is_unlocked());
    }

    #[test]
    fn test_locked_reports_every_reason() {
        let property = property();
        let mut reservation = checked_in_reservation(&property);
        reservation.checked_in_at = None;
        let services = vec![tax(&reservation)];

        let gate =
            AccessGate::for_property(&reservation, &services, &property, parse_timezone("Asia/Tokyo").unwrap())
                .unwrap();
        let state = gate.evaluate(Utc.with_ymd_and_hms(2024, 3, 5, 5, 0, 0).unwrap());

        let reasons = state.reasons();
        assert_eq!(reasons.len(), 3);
        assert!(reasons.contains(&LockReason::CheckInIncomplete));
        assert!(reasons.contains(&LockReason::UnpaidMandatoryServices { count: 1 }));
        assert!(matches!(reasons[2], LockReason::BeforeAccessTime { .. }));
    }

    #[test]
    fn test_exempted_and_optional_services_do_not_block() {
        let property = property();
        let reservation = checked_in_reservation(&property);
        let mut exempted = tax(&reservation);
        exempted.exempt("child".to_string(), Utc::now()).unwrap();
        let optional = ReservationService::from_catalog(
            reservation.id,
            &GuestService::new(property.id, "Breakfast".to_string(), 1500, false),
            1,
            1,
        );
        let services = vec![exempted, optional];

        let gate = AccessGate {
            reservation: &reservation,
            services: &services,
            unlocks_at: Utc.with_ymd_and_hms(2024, 3, 5, 6, 0, 0).unwrap(),
        };
        assert!(gate
            .evaluate(Utc.with_ymd_and_hms(2024, 3, 5, 7, 0, 0).unwrap())
            .is_unlocked());
    }

    #[test]
    fn test_custom_access_time() {
        let mut property = property();
        property.access_time = chrono::NaiveTime::from_hms_opt(16, 0, 0);
        let reservation = checked_in_reservation(&property);
        let gate = AccessGate::for_property(&reservation, &[], &property, parse_timezone("Asia/Tokyo").unwrap())
            .unwrap();
        assert_eq!(gate.unlocks_at, Utc.with_ymd_and_hms(2024, 3, 5, 7, 0, 0).unwrap());
    }

    #[test]
    fn test_cancelled_reservation_stays_locked() {
        let property = property();
        let mut reservation = checked_in_reservation(&property);
        reservation.status = ReservationStatus::Cancelled;
        let gate = AccessGate {
            reservation: &reservation,
            services: &[],
            unlocks_at: Utc.with_ymd_and_hms(2024, 3, 5, 6, 0, 0).unwrap(),
        };
        let state = gate.evaluate(Utc.with_ymd_and_hms(2024, 3, 6, 0, 0, 0).unwrap());
        assert!(matches!(
            state.reasons()[0],
            LockReason::ReservationInactive { .. }
        ));
    }
}

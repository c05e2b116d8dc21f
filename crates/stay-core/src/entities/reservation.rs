//! Reservation entity - a booking plus the guest's online check-in data

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Reservation lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    #[default]
    Pending,
    Confirmed,
    CheckedIn,
    CheckedOut,
    Cancelled,
    NoShow,
}

impl ReservationStatus {
    /// Storage representation
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::CheckedIn => "checked_in",
            Self::CheckedOut => "checked_out",
            Self::Cancelled => "cancelled",
            Self::NoShow => "no_show",
        }
    }

    /// Terminal statuses accept no further transitions
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::CheckedOut | Self::Cancelled | Self::NoShow)
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReservationStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "checked_in" => Ok(Self::CheckedIn),
            "checked_out" => Ok(Self::CheckedOut),
            "cancelled" => Ok(Self::Cancelled),
            "no_show" => Ok(Self::NoShow),
            other => Err(DomainError::ValidationError(format!(
                "unknown reservation status: {other}"
            ))),
        }
    }
}

/// Guest-submitted check-in form (guest register)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GuestRegistration {
    pub full_name: String,
    pub nationality: String,
    pub address: String,
    pub phone: Option<String>,
    pub occupation: Option<String>,
    /// Required for guests without a domestic address
    pub passport_number: Option<String>,
}

impl GuestRegistration {
    /// Nationality code treated as domestic
    pub const DOMESTIC_NATIONALITY: &'static str = "JP";

    /// Check the register fields required by the lodging-business rules
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.full_name.trim().is_empty() {
            return Err(DomainError::ValidationError("full name is required".to_string()));
        }
        if self.address.trim().is_empty() {
            return Err(DomainError::ValidationError("address is required".to_string()));
        }
        if self.nationality.trim().is_empty() {
            return Err(DomainError::ValidationError("nationality is required".to_string()));
        }
        if self.is_foreign()
            && self
                .passport_number
                .as_deref()
                .is_none_or(|p| p.trim().is_empty())
        {
            return Err(DomainError::PassportRequired);
        }
        Ok(())
    }

    #[inline]
    pub fn is_foreign(&self) -> bool {
        !self
            .nationality
            .trim()
            .eq_ignore_ascii_case(Self::DOMESTIC_NATIONALITY)
    }
}

/// Reservation entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reservation {
    pub id: Uuid,
    pub property_id: Uuid,
    pub room_type_id: Option<Uuid>,
    pub room_unit_id: Option<Uuid>,
    pub beds24_booking_id: Option<i64>,
    pub booking_name: String,
    pub booking_email: Option<String>,
    pub booking_phone: Option<String>,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub num_adults: i32,
    pub num_children: i32,
    /// Total price in minor currency units
    pub total_amount: Option<i64>,
    pub currency: String,
    pub status: ReservationStatus,
    /// Opaque token embedded in the guest portal URL
    pub guest_token: String,
    pub registration: Option<GuestRegistration>,
    pub checked_in_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Reservation {
    /// Create a new pending reservation
    pub fn new(
        property_id: Uuid,
        booking_name: String,
        check_in_date: NaiveDate,
        check_out_date: NaiveDate,
        guest_token: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            property_id,
            room_type_id: None,
            room_unit_id: None,
            beds24_booking_id: None,
            booking_name,
            booking_email: None,
            booking_phone: None,
            check_in_date,
            check_out_date,
            num_adults: 1,
            num_children: 0,
            total_amount: None,
            currency: "JPY".to_string(),
            status: ReservationStatus::Pending,
            guest_token,
            registration: None,
            checked_in_at: None,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Departure must be after arrival
    pub fn validate_dates(&self) -> Result<(), DomainError> {
        if self.check_out_date <= self.check_in_date {
            return Err(DomainError::InvalidStayDates {
                check_in: self.check_in_date,
                check_out: self.check_out_date,
            });
        }
        Ok(())
    }

    /// Number of nights booked
    #[inline]
    pub fn nights(&self) -> i64 {
        (self.check_out_date - self.check_in_date).num_days()
    }

    #[inline]
    pub fn total_guests(&self) -> i32 {
        self.num_adults + self.num_children
    }

    /// Online check-in has been submitted
    #[inline]
    pub fn is_checkin_complete(&self) -> bool {
        self.checked_in_at.is_some()
    }

    /// Check if moving to `next` is a legal transition
    pub fn can_transition_to(&self, next: ReservationStatus) -> bool {
        use ReservationStatus as S;
        match (self.status, next) {
            (a, b) if a == b => true,
            (S::Pending, S::Confirmed | S::CheckedIn | S::Cancelled) => true,
            (S::Confirmed, S::CheckedIn | S::Cancelled | S::NoShow) => true,
            (S::CheckedIn, S::CheckedOut) => true,
            _ => false,
        }
    }

    /// Move to a new status, rejecting illegal transitions
    pub fn transition_to(&mut self, next: ReservationStatus) -> Result<(), DomainError> {
        if !self.can_transition_to(next) {
            return Err(DomainError::InvalidStatusTransition {
                from: self.status.to_string(),
                to: next.to_string(),
            });
        }
        self.status = next;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Record the guest's online check-in
    pub fn complete_check_in(
        &mut self,
        registration: GuestRegistration,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        if self.is_checkin_complete() {
            return Err(DomainError::CheckInAlreadyCompleted);
        }
        if self.status.is_terminal() {
            return Err(DomainError::ReservationNotActive(self.status.to_string()));
        }
        registration.validate()?;

        self.registration = Some(registration);
        self.checked_in_at = Some(now);
        self.status = ReservationStatus::CheckedIn;
        self.updated_at = now;
        Ok(())
    }
}

/// Reservation joined with the names shown in admin lists
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationDetails {
    pub reservation: Reservation,
    pub property_name: String,
    pub room_type_name: Option<String>,
    pub room_unit_number: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reservation() -> Reservation {
        Reservation::new(
            Uuid::new_v4(),
            "Alex Kim".to_string(),
            NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 8).unwrap(),
            "token".to_string(),
        )
    }

    fn registration(nationality: &str, passport: Option<&str>) -> GuestRegistration {
        GuestRegistration {
            full_name: "Alex Kim".to_string(),
            nationality: nationality.to_string(),
            address: "1-2-3 Shibuya, Tokyo".to_string(),
            phone: None,
            occupation: None,
            passport_number: passport.map(str::to_string),
        }
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            ReservationStatus::Pending,
            ReservationStatus::Confirmed,
            ReservationStatus::CheckedIn,
            ReservationStatus::CheckedOut,
            ReservationStatus::Cancelled,
            ReservationStatus::NoShow,
        ] {
            assert_eq!(status.as_str().parse::<ReservationStatus>().unwrap(), status);
        }
        assert!("archived".parse::<ReservationStatus>().is_err());
    }

    #[test]
    fn test_nights_and_dates() {
        let mut r = reservation();
        assert_eq!(r.nights(), 3);
        assert!(r.validate_dates().is_ok());

        r.check_out_date = r.check_in_date;
        assert!(matches!(
            r.validate_dates(),
            Err(DomainError::InvalidStayDates { .. })
        ));
    }

    #[test]
    fn test_transitions() {
        let mut r = reservation();
        assert!(r.transition_to(ReservationStatus::Confirmed).is_ok());
        assert!(r.transition_to(ReservationStatus::CheckedOut).is_err());
        assert!(r.transition_to(ReservationStatus::Cancelled).is_ok());
        assert!(r.transition_to(ReservationStatus::Confirmed).is_err());
    }

    #[test]
    fn test_complete_check_in() {
        let mut r = reservation();
        r.status = ReservationStatus::Confirmed;
        let now = Utc::now();

        r.complete_check_in(registration("JP", None), now).unwrap();
        assert_eq!(r.status, ReservationStatus::CheckedIn);
        assert_eq!(r.checked_in_at, Some(now));

        let again = r.complete_check_in(registration("JP", None), now);
        assert!(matches!(again, Err(DomainError::CheckInAlreadyCompleted)));
    }

    #[test]
    fn test_foreign_guest_needs_passport() {
        let mut r = reservation();
        let err = r
            .complete_check_in(registration("US", None), Utc::now())
            .unwrap_err();
        assert!(matches!(err, DomainError::PassportRequired));
        assert!(r.checked_in_at.is_none());

        r.complete_check_in(registration("us", Some("X1234567")), Utc::now())
            .unwrap();
        assert!(r.is_checkin_complete());
    }

    #[test]
    fn test_cancelled_reservation_cannot_check_in() {
        let mut r = reservation();
        r.status = ReservationStatus::Cancelled;
        let err = r
            .complete_check_in(registration("JP", None), Utc::now())
            .unwrap_err();
        assert!(matches!(err, DomainError::ReservationNotActive(_)));
    }
}

//! Add-on services: the per-property catalog and what a reservation owes

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Catalog entry, e.g. accommodation tax or late checkout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuestService {
    pub id: Uuid,
    pub property_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// Price in minor currency units
    pub price: i64,
    pub currency: String,
    /// Must be paid or exempted before room access unlocks
    pub is_mandatory: bool,
    /// Charged per guest per night instead of once
    pub per_guest_night: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GuestService {
    pub fn new(property_id: Uuid, name: String, price: i64, is_mandatory: bool) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            property_id,
            name,
            description: None,
            price,
            currency: "JPY".to_string(),
            is_mandatory,
            per_guest_night: false,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Amount owed for a stay
    pub fn amount_for(&self, guests: i32, nights: i64) -> i64 {
        if self.per_guest_night {
            self.price * i64::from(guests.max(1)) * nights.max(1)
        } else {
            self.price
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ServicePaymentStatus {
    #[default]
    Pending,
    Paid,
    Exempted,
    Refunded,
}

impl ServicePaymentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Exempted => "exempted",
            Self::Refunded => "refunded",
        }
    }
}

impl fmt::Display for ServicePaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServicePaymentStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            "exempted" => Ok(Self::Exempted),
            "refunded" => Ok(Self::Refunded),
            other => Err(DomainError::ValidationError(format!(
                "unknown payment status: {other}"
            ))),
        }
    }
}

/// A service attached to a reservation with its payment state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationService {
    pub id: Uuid,
    pub reservation_id: Uuid,
    pub service_id: Option<Uuid>,
    pub name: String,
    pub amount: i64,
    pub currency: String,
    pub is_mandatory: bool,
    pub status: ServicePaymentStatus,
    pub payment_reference: Option<String>,
    pub exempt_reason: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ReservationService {
    /// Attach a catalog service to a reservation
    pub fn from_catalog(reservation_id: Uuid, service: &GuestService, guests: i32, nights: i64) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            reservation_id,
            service_id: Some(service.id),
            name: service.name.clone(),
            amount: service.amount_for(guests, nights),
            currency: service.currency.clone(),
            is_mandatory: service.is_mandatory,
            status: ServicePaymentStatus::Pending,
            payment_reference: None,
            exempt_reason: None,
            paid_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Paid or exempted
    #[inline]
    pub fn is_settled(&self) -> bool {
        matches!(
            self.status,
            ServicePaymentStatus::Paid | ServicePaymentStatus::Exempted
        )
    }

    /// Record a payment; paying twice is a no-op
    pub fn mark_paid(
        &mut self,
        reference: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        match self.status {
            ServicePaymentStatus::Paid => Ok(()),
            ServicePaymentStatus::Pending => {
                self.status = ServicePaymentStatus::Paid;
                self.payment_reference = reference;
                self.paid_at = Some(now);
                self.updated_at = now;
                Ok(())
            }
            other => Err(DomainError::InvalidStatusTransition {
                from: other.to_string(),
                to: ServicePaymentStatus::Paid.to_string(),
            }),
        }
    }

    /// Waive a pending charge
    pub fn exempt(&mut self, reason: String, now: DateTime<Utc>) -> Result<(), DomainError> {
        if self.status != ServicePaymentStatus::Pending {
            return Err(DomainError::InvalidStatusTransition {
                from: self.status.to_string(),
                to: ServicePaymentStatus::Exempted.to_string(),
            });
        }
        self.status = ServicePaymentStatus::Exempted;
        self.exempt_reason = Some(reason);
        self.updated_at = now;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tax() -> GuestService {
        let mut service = GuestService::new(Uuid::new_v4(), "Accommodation tax".to_string(), 200, true);
        service.per_guest_night = true;
        service
    }

    #[test]
    fn test_amount_for() {
        assert_eq!(tax().amount_for(2, 3), 1200);
        let flat = GuestService::new(Uuid::new_v4(), "Late checkout".to_string(), 3000, false);
        assert_eq!(flat.amount_for(2, 3), 3000);
    }

    #[test]
    fn test_mark_paid_is_idempotent() {
        let mut item = ReservationService::from_catalog(Uuid::new_v4(), &tax(), 1, 1);
        assert!(!item.is_settled());

        let now = Utc::now();
        item.mark_paid(Some("pi_123".to_string()), now).unwrap();
        assert!(item.is_settled());
        item.mark_paid(None, now).unwrap();
        assert_eq!(item.payment_reference.as_deref(), Some("pi_123"));
    }

    #[test]
    fn test_exempt() {
        let mut item = ReservationService::from_catalog(Uuid::new_v4(), &tax(), 1, 1);
        item.exempt("school trip".to_string(), Utc::now()).unwrap();
        assert_eq!(item.status, ServicePaymentStatus::Exempted);
        assert!(item.is_settled());

        assert!(item.mark_paid(None, Utc::now()).is_err());
    }
}

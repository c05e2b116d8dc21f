//! Entity to DTO mappers
//!
//! Implements `From` conversions from domain entities to response DTOs.

use stay_core::entities::{
    CleaningTask, GuestRegistration, GuestService, MessageDelivery, MessageRule, MessageTemplate,
    MessageThread, Property, Reservation, ReservationDetails, ReservationService, RoomType,
    RoomUnit, ScheduledMessage, UserProfile,
};

use super::responses::{
    CleaningTaskResponse, GuestPropertyView, GuestRegistrationResponse, GuestReservationView,
    GuestServiceResponse, MessageDeliveryResponse, MessageRuleResponse, MessageTemplateResponse,
    PropertyResponse, ReservationResponse, ReservationServiceResponse, RoomTypeResponse,
    RoomUnitResponse, ScheduledMessageResponse, ThreadResponse, UserResponse,
};

// ============================================================================
// Property Mappers
// ============================================================================

impl From<&Property> for PropertyResponse {
    fn from(p: &Property) -> Self {
        Self {
            id: p.id,
            owner_id: p.owner_id,
            name: p.name.clone(),
            address: p.address.clone(),
            description: p.description.clone(),
            amenities: p.amenities.clone(),
            wifi_ssid: p.wifi_ssid.clone(),
            wifi_password: p.wifi_password.clone(),
            check_in_time: p.check_in_time,
            access_time: p.access_time,
            departure_time: p.departure_time,
            timezone: p.timezone.clone(),
            beds24_property_id: p.beds24_property_id,
            is_active: p.is_active,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

impl From<Property> for PropertyResponse {
    fn from(p: Property) -> Self {
        Self::from(&p)
    }
}

impl From<&Property> for GuestPropertyView {
    fn from(p: &Property) -> Self {
        Self {
            name: p.name.clone(),
            address: p.address.clone(),
            description: p.description.clone(),
            amenities: p.amenities.clone(),
            check_in_time: p.check_in_time,
            departure_time: p.departure_time,
            timezone: p.timezone.clone(),
        }
    }
}

impl From<&RoomType> for RoomTypeResponse {
    fn from(r: &RoomType) -> Self {
        Self {
            id: r.id,
            property_id: r.property_id,
            name: r.name.clone(),
            description: r.description.clone(),
            max_guests: r.max_guests,
            base_price: r.base_price,
            weekend_price: r.weekend_price,
            high_season_price: r.high_season_price,
            amenities: r.amenities.clone(),
            beds24_room_id: r.beds24_room_id,
            is_active: r.is_active,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

impl From<RoomType> for RoomTypeResponse {
    fn from(r: RoomType) -> Self {
        Self::from(&r)
    }
}

impl From<&RoomUnit> for RoomUnitResponse {
    fn from(u: &RoomUnit) -> Self {
        Self {
            id: u.id,
            room_type_id: u.room_type_id,
            unit_number: u.unit_number.clone(),
            floor: u.floor,
            access_code: u.access_code.clone(),
            wifi_ssid: u.wifi_ssid.clone(),
            wifi_password: u.wifi_password.clone(),
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

impl From<RoomUnit> for RoomUnitResponse {
    fn from(u: RoomUnit) -> Self {
        Self::from(&u)
    }
}

// ============================================================================
// Reservation Mappers
// ============================================================================

impl From<&GuestRegistration> for GuestRegistrationResponse {
    fn from(g: &GuestRegistration) -> Self {
        Self {
            full_name: g.full_name.clone(),
            nationality: g.nationality.clone(),
            address: g.address.clone(),
            phone: g.phone.clone(),
            occupation: g.occupation.clone(),
            passport_number: g.passport_number.clone(),
        }
    }
}

impl From<&Reservation> for ReservationResponse {
    fn from(r: &Reservation) -> Self {
        Self {
            id: r.id,
            property_id: r.property_id,
            room_type_id: r.room_type_id,
            room_unit_id: r.room_unit_id,
            beds24_booking_id: r.beds24_booking_id,
            booking_name: r.booking_name.clone(),
            booking_email: r.booking_email.clone(),
            booking_phone: r.booking_phone.clone(),
            check_in_date: r.check_in_date,
            check_out_date: r.check_out_date,
            nights: r.nights(),
            num_adults: r.num_adults,
            num_children: r.num_children,
            total_amount: r.total_amount,
            currency: r.currency.clone(),
            status: r.status,
            guest_token: r.guest_token.clone(),
            portal_url: None,
            registration: r.registration.as_ref().map(GuestRegistrationResponse::from),
            checked_in_at: r.checked_in_at,
            notes: r.notes.clone(),
            property_name: None,
            room_type_name: None,
            room_unit_number: None,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

impl From<Reservation> for ReservationResponse {
    fn from(r: Reservation) -> Self {
        Self::from(&r)
    }
}

impl From<&ReservationDetails> for ReservationResponse {
    fn from(d: &ReservationDetails) -> Self {
        let mut response = Self::from(&d.reservation);
        response.property_name = Some(d.property_name.clone());
        response.room_type_name.clone_from(&d.room_type_name);
        response.room_unit_number.clone_from(&d.room_unit_number);
        response
    }
}

impl From<&Reservation> for GuestReservationView {
    fn from(r: &Reservation) -> Self {
        Self {
            id: r.id,
            booking_name: r.booking_name.clone(),
            check_in_date: r.check_in_date,
            check_out_date: r.check_out_date,
            nights: r.nights(),
            num_adults: r.num_adults,
            num_children: r.num_children,
            status: r.status,
            check_in_completed: r.is_checkin_complete(),
            checked_in_at: r.checked_in_at,
        }
    }
}

// ============================================================================
// Cleaning / User Mappers
// ============================================================================

impl From<&CleaningTask> for CleaningTaskResponse {
    fn from(t: &CleaningTask) -> Self {
        Self {
            id: t.id,
            property_id: t.property_id,
            room_unit_id: t.room_unit_id,
            reservation_id: t.reservation_id,
            cleaner_id: t.cleaner_id,
            scheduled_date: t.scheduled_date,
            status: t.status,
            notes: t.notes.clone(),
            assigned_at: t.assigned_at,
            started_at: t.started_at,
            completed_at: t.completed_at,
            created_at: t.created_at,
            updated_at: t.updated_at,
        }
    }
}

impl From<CleaningTask> for CleaningTaskResponse {
    fn from(t: CleaningTask) -> Self {
        Self::from(&t)
    }
}

impl From<&UserProfile> for UserResponse {
    fn from(u: &UserProfile) -> Self {
        Self {
            id: u.id,
            email: u.email.clone(),
            full_name: u.full_name.clone(),
            display_name: u.display_name().to_string(),
            phone: u.phone.clone(),
            role: u.role,
            capabilities: u.capabilities().list(),
            is_active: u.is_active,
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

impl From<UserProfile> for UserResponse {
    fn from(u: UserProfile) -> Self {
        Self::from(&u)
    }
}

// ============================================================================
// Automation Mappers
// ============================================================================

impl From<&MessageRule> for MessageRuleResponse {
    fn from(r: &MessageRule) -> Self {
        Self {
            id: r.id,
            property_id: r.property_id,
            template_id: r.template_id,
            name: r.name.clone(),
            rule_type: r.rule_type,
            delay_minutes: r.delay_minutes,
            days: r.days,
            hours: r.hours,
            at_time: r.at_time.map(|t| t.format("%H:%M").to_string()),
            backfill: r.backfill,
            timezone: r.timezone.clone(),
            is_active: r.is_active,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

impl From<MessageRule> for MessageRuleResponse {
    fn from(r: MessageRule) -> Self {
        Self::from(&r)
    }
}

impl From<&MessageTemplate> for MessageTemplateResponse {
    fn from(t: &MessageTemplate) -> Self {
        Self {
            id: t.id,
            property_id: t.property_id,
            name: t.name.clone(),
            subject: t.subject.clone(),
            body: t.body.clone(),
            language: t.language.clone(),
            is_active: t.is_active,
            created_at: t.created_at,
            updated_at: t.updated_at,
        }
    }
}

impl From<MessageTemplate> for MessageTemplateResponse {
    fn from(t: MessageTemplate) -> Self {
        Self::from(&t)
    }
}

impl From<&ScheduledMessage> for ScheduledMessageResponse {
    fn from(s: &ScheduledMessage) -> Self {
        Self {
            id: s.id,
            reservation_id: s.reservation_id,
            rule_id: s.rule_id,
            template_id: s.template_id,
            run_at: s.run_at,
            status: s.status,
            attempts: s.attempts,
            last_error: s.last_error.clone(),
            sent_at: s.sent_at,
            message_id: s.message_id,
            created_at: s.created_at,
        }
    }
}

// ============================================================================
// Chat Mappers
// ============================================================================

impl From<&MessageThread> for ThreadResponse {
    fn from(t: &MessageThread) -> Self {
        Self {
            id: t.id,
            reservation_id: t.reservation_id,
            property_id: t.property_id,
            last_message_at: t.last_message_at,
            created_at: t.created_at,
        }
    }
}

impl From<MessageThread> for ThreadResponse {
    fn from(t: MessageThread) -> Self {
        Self::from(&t)
    }
}

impl From<&MessageDelivery> for MessageDeliveryResponse {
    fn from(d: &MessageDelivery) -> Self {
        Self {
            id: d.id,
            message_id: d.message_id,
            channel: d.channel,
            status: d.status,
            error: d.error.clone(),
            attempted_at: d.attempted_at,
            delivered_at: d.delivered_at,
        }
    }
}

// ============================================================================
// Guest Service Mappers
// ============================================================================

impl From<&GuestService> for GuestServiceResponse {
    fn from(s: &GuestService) -> Self {
        Self {
            id: s.id,
            property_id: s.property_id,
            name: s.name.clone(),
            description: s.description.clone(),
            price: s.price,
            currency: s.currency.clone(),
            is_mandatory: s.is_mandatory,
            per_guest_night: s.per_guest_night,
            is_active: s.is_active,
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

impl From<GuestService> for GuestServiceResponse {
    fn from(s: GuestService) -> Self {
        Self::from(&s)
    }
}

impl From<&ReservationService> for ReservationServiceResponse {
    fn from(s: &ReservationService) -> Self {
        Self {
            id: s.id,
            reservation_id: s.reservation_id,
            service_id: s.service_id,
            name: s.name.clone(),
            amount: s.amount,
            currency: s.currency.clone(),
            is_mandatory: s.is_mandatory,
            status: s.status,
            is_settled: s.is_settled(),
            payment_reference: s.payment_reference.clone(),
            exempt_reason: s.exempt_reason.clone(),
            paid_at: s.paid_at,
            created_at: s.created_at,
        }
    }
}

impl From<ReservationService> for ReservationServiceResponse {
    fn from(s: ReservationService) -> Self {
        Self::from(&s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use stay_core::entities::RuleType;
    use uuid::Uuid;

    #[test]
    fn test_reservation_response_is_camel_case() {
        let reservation = Reservation::new(
            Uuid::new_v4(),
            "Taro Yamada".to_string(),
            NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 8).unwrap(),
            "token-abcdefghijklmnop".to_string(),
        );

        let response = ReservationResponse::from(&reservation)
            .with_portal_url("https://stay.example.com/guest/token".to_string());
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["bookingName"], "Taro Yamada");
        assert_eq!(json["checkInDate"], "2024-03-05");
        assert_eq!(json["nights"], 3);
        assert_eq!(json["status"], "pending");
        assert_eq!(json["portalUrl"], "https://stay.example.com/guest/token");
        assert!(json.get("propertyName").is_none());
    }

    #[test]
    fn test_details_carry_joined_names() {
        let reservation = Reservation::new(
            Uuid::new_v4(),
            "Guest".to_string(),
            NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 6).unwrap(),
            "token-abcdefghijklmnop".to_string(),
        );
        let details = ReservationDetails {
            reservation,
            property_name: "Villa Sakura".to_string(),
            room_type_name: Some("Twin".to_string()),
            room_unit_number: None,
        };

        let response = ReservationResponse::from(&details);
        assert_eq!(response.property_name.as_deref(), Some("Villa Sakura"));
        assert_eq!(response.room_type_name.as_deref(), Some("Twin"));
    }

    #[test]
    fn test_rule_response_formats_time_and_type() {
        let mut rule = MessageRule::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "Reminder".to_string(),
            RuleType::BeforeArrivalDaysAtTime,
        );
        rule.days = Some(1);
        rule.at_time = NaiveTime::from_hms_opt(10, 0, 0);

        let json = serde_json::to_value(MessageRuleResponse::from(&rule)).unwrap();
        assert_eq!(json["type"], "BEFORE_ARRIVAL_DAYS_AT_TIME");
        assert_eq!(json["atTime"], "10:00");
        assert_eq!(json["backfill"], "none");
    }
}

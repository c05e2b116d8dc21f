//! Guest portal
//!
//! Everything a guest reaches through the token in their portal link:
//! the stay overview, online check-in, add-on services, room access and
//! the chat with the host. No account is involved; the token is the
//! credential.

use chrono::{DateTime, Utc};
use stay_core::automation::parse_timezone;
use stay_core::entities::{
    GuestRegistration, Property, Reservation, ReservationService, RoomUnit, SenderRole,
    WifiCredentials,
};
use stay_core::{AccessGate, AccessState, DomainError, GuestToken};
use tracing::{info, instrument};
use validator::Validate;

use crate::dto::{
    AccessResponse, CheckInRequest, GuestPortalResponse, GuestPropertyView, GuestReservationView,
    MarkReadResponse, MessageListQuery, MessageResponse, PostMessageRequest,
    ReservationServiceResponse,
};

use super::automation::AutomationService;
use super::context::ServiceContext;
use super::error::ServiceResult;
use super::messaging::MessagingService;

/// Reservation and property resolved from a portal token
#[derive(Debug, Clone)]
pub struct GuestStay {
    pub reservation: Reservation,
    pub property: Property,
}

/// Why a check-in that passed on the read copy was refused by the store
pub fn check_in_conflict(current: &Reservation) -> DomainError {
    if current.is_checkin_complete() {
        DomainError::CheckInAlreadyCompleted
    } else {
        DomainError::ReservationNotActive(current.status.to_string())
    }
}

/// Access response for a gate decision; secrets only when unlocked
pub fn access_response(
    state: &AccessState,
    unlocks_at: DateTime<Utc>,
    property: &Property,
    unit: Option<&RoomUnit>,
) -> AccessResponse {
    let unlocked = state.is_unlocked();
    let wifi = if unlocked {
        match unit {
            Some(unit) => unit.effective_wifi(property),
            None => WifiCredentials {
                ssid: property.wifi_ssid.clone(),
                password: property.wifi_password.clone(),
            },
        }
    } else {
        WifiCredentials::default()
    };

    AccessResponse {
        unlocked,
        unlocks_at,
        reasons: state.reasons().to_vec(),
        room_number: unit.map(|u| u.unit_number.clone()),
        access_code: unit
            .filter(|_| unlocked)
            .and_then(|u| u.access_code.clone()),
        wifi_ssid: wifi.ssid,
        wifi_password: wifi.password,
    }
}

/// Guest portal service
pub struct GuestPortalService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> GuestPortalService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Resolve a portal token
    #[instrument(skip(self, token))]
    pub async fn resolve(&self, token: &str) -> ServiceResult<GuestStay> {
        let token = GuestToken::parse(token)?;
        let reservation = self
            .ctx
            .reservation_repo()
            .find_by_guest_token(token.as_str())
            .await?
            .ok_or(DomainError::GuestTokenNotFound)?;
        let property = self
            .ctx
            .property_repo()
            .find_by_id(reservation.property_id)
            .await?
            .ok_or(DomainError::PropertyNotFound(reservation.property_id))?;

        Ok(GuestStay {
            reservation,
            property,
        })
    }

    async fn services_of(&self, reservation: &Reservation) -> ServiceResult<Vec<ReservationService>> {
        Ok(self
            .ctx
            .reservation_service_repo()
            .list_by_reservation(reservation.id)
            .await?)
    }

    async fn access_for(
        &self,
        stay: &GuestStay,
        services: &[ReservationService],
    ) -> ServiceResult<AccessResponse> {
        let tz = parse_timezone(&stay.property.timezone)?;
        let gate = AccessGate::for_property(&stay.reservation, services, &stay.property, tz)?;
        let state = gate.evaluate(Utc::now());

        let unit = match stay.reservation.room_unit_id {
            Some(unit_id) => self.ctx.room_unit_repo().find_by_id(unit_id).await?,
            None => None,
        };
        Ok(access_response(
            &state,
            gate.unlocks_at,
            &stay.property,
            unit.as_ref(),
        ))
    }

    async fn overview_of(&self, stay: &GuestStay) -> ServiceResult<GuestPortalResponse> {
        let services = self.services_of(&stay.reservation).await?;
        let access = self.access_for(stay, &services).await?;

        let room_type_name = match stay.reservation.room_type_id {
            Some(id) => self
                .ctx
                .room_type_repo()
                .find_by_id(id)
                .await?
                .map(|rt| rt.name),
            None => None,
        };
        let thread = MessagingService::new(self.ctx)
            .thread_for(&stay.reservation)
            .await?;

        Ok(GuestPortalResponse {
            reservation: GuestReservationView::from(&stay.reservation),
            property: GuestPropertyView::from(&stay.property),
            room_type_name,
            thread_id: thread.id,
            services: services
                .iter()
                .map(ReservationServiceResponse::from)
                .collect(),
            access,
        })
    }

    /// Portal landing page
    #[instrument(skip(self, token))]
    pub async fn overview(&self, token: &str) -> ServiceResult<GuestPortalResponse> {
        let stay = self.resolve(token).await?;
        self.overview_of(&stay).await
    }

    /// Submit the online check-in form
    #[instrument(skip(self, token, request))]
    pub async fn check_in(
        &self,
        token: &str,
        request: CheckInRequest,
    ) -> ServiceResult<GuestPortalResponse> {
        request.validate()?;
        let mut stay = self.resolve(token).await?;

        let registration = GuestRegistration {
            full_name: request.full_name,
            nationality: request.nationality.to_uppercase(),
            address: request.address,
            phone: request.phone,
            occupation: request.occupation,
            passport_number: request.passport_number,
        };
        stay.reservation
            .complete_check_in(registration, Utc::now())?;

        // Only the check-in columns are written, so a booking change that
        // arrived since `resolve` is kept.
        let repo = self.ctx.reservation_repo();
        stay.reservation = match repo.record_check_in(&stay.reservation).await? {
            Some(stored) => stored,
            None => {
                let current = repo
                    .find_by_id(stay.reservation.id)
                    .await?
                    .ok_or(DomainError::ReservationNotFound(stay.reservation.id))?;
                return Err(check_in_conflict(&current).into());
            }
        };

        info!(reservation_id = %stay.reservation.id, "Online check-in completed");

        AutomationService::new(self.ctx)
            .replan(&stay.reservation, &stay.property)
            .await?;

        self.overview_of(&stay).await
    }

    #[instrument(skip(self, token))]
    pub async fn services(&self, token: &str) -> ServiceResult<Vec<ReservationServiceResponse>> {
        let stay = self.resolve(token).await?;
        let services = self.services_of(&stay.reservation).await?;
        Ok(services
            .iter()
            .map(ReservationServiceResponse::from)
            .collect())
    }

    #[instrument(skip(self, token))]
    pub async fn access(&self, token: &str) -> ServiceResult<AccessResponse> {
        let stay = self.resolve(token).await?;
        let services = self.services_of(&stay.reservation).await?;
        self.access_for(&stay, &services).await
    }

    // ========================================================================
    // Chat
    // ========================================================================

    #[instrument(skip(self, token))]
    pub async fn messages(
        &self,
        token: &str,
        query: MessageListQuery,
    ) -> ServiceResult<Vec<MessageResponse>> {
        let stay = self.resolve(token).await?;
        let messaging = MessagingService::new(self.ctx);
        let thread = messaging.thread_for(&stay.reservation).await?;
        messaging.history(&thread, &query).await
    }

    #[instrument(skip(self, token, request))]
    pub async fn post_message(
        &self,
        token: &str,
        request: PostMessageRequest,
    ) -> ServiceResult<MessageResponse> {
        let stay = self.resolve(token).await?;
        MessagingService::new(self.ctx)
            .post_as_guest(&stay.reservation, request)
            .await
    }

    #[instrument(skip(self, token))]
    pub async fn mark_read(&self, token: &str) -> ServiceResult<MarkReadResponse> {
        let stay = self.resolve(token).await?;
        let messaging = MessagingService::new(self.ctx);
        let thread = messaging.thread_for(&stay.reservation).await?;
        messaging.mark_read(&thread, SenderRole::Guest).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stay_core::LockReason;
    use uuid::Uuid;

    fn property() -> Property {
        let mut property = Property::new("Villa Sakura".to_string(), None, "Asia/Tokyo".to_string());
        property.wifi_ssid = Some("sakura-guest".to_string());
        property.wifi_password = Some("welcome".to_string());
        property
    }

    fn unit() -> RoomUnit {
        let mut unit = RoomUnit::new(Uuid::new_v4(), "101".to_string());
        unit.access_code = Some("4821".to_string());
        unit
    }

    #[test]
    fn test_check_in_conflict_reports_current_state() {
        let mut reservation = Reservation::new(
            Uuid::new_v4(),
            "Alex Kim".to_string(),
            chrono::NaiveDate::from_ymd_opt(2030, 4, 1).unwrap(),
            chrono::NaiveDate::from_ymd_opt(2030, 4, 4).unwrap(),
            stay_common::generate_guest_token(),
        );
        reservation.status = stay_core::entities::ReservationStatus::Cancelled;
        assert!(matches!(
            check_in_conflict(&reservation),
            DomainError::ReservationNotActive(_)
        ));

        reservation.checked_in_at = Some(Utc::now());
        assert!(matches!(
            check_in_conflict(&reservation),
            DomainError::CheckInAlreadyCompleted
        ));
    }

    #[test]
    fn test_locked_access_hides_secrets() {
        let state = AccessState::Locked(vec![LockReason::CheckInIncomplete]);
        let response = access_response(&state, Utc::now(), &property(), Some(&unit()));

        assert!(!response.unlocked);
        assert_eq!(response.room_number.as_deref(), Some("101"));
        assert!(response.access_code.is_none());
        assert!(response.wifi_ssid.is_none());
        assert!(response.wifi_password.is_none());
        assert_eq!(response.reasons, vec![LockReason::CheckInIncomplete]);
    }

    #[test]
    fn test_unlocked_access_reveals_code_and_wifi() {
        let response = access_response(&AccessState::Unlocked, Utc::now(), &property(), Some(&unit()));

        assert!(response.unlocked);
        assert_eq!(response.access_code.as_deref(), Some("4821"));
        assert_eq!(response.wifi_ssid.as_deref(), Some("sakura-guest"));
        assert!(response.reasons.is_empty());
    }

    #[test]
    fn test_unlocked_without_unit_uses_property_wifi() {
        let response = access_response(&AccessState::Unlocked, Utc::now(), &property(), None);

        assert!(response.access_code.is_none());
        assert!(response.room_number.is_none());
        assert_eq!(response.wifi_password.as_deref(), Some("welcome"));
    }
}

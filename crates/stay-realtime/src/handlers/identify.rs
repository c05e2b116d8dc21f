//! Identify handler (op 2)
//!
//! Staff present their bearer token, guests the token from their portal
//! link. A guest session is confined to the reservation's thread and is
//! subscribed to it right away.

use super::{send_event, HandlerError, HandlerResult, SubscribeHandler};
use crate::connection::{Connection, Identity};
use crate::events::{GatewayEventType, ReadyEvent, SessionRole};
use crate::protocol::{CloseCode, Credential, IdentifyPayload};
use crate::server::GatewayState;
use stay_service::services::{GuestPortalService, MessagingService, PermissionService};
use std::sync::Arc;

pub struct IdentifyHandler;

impl IdentifyHandler {
    pub async fn handle(
        state: &GatewayState,
        connection: &Arc<Connection>,
        payload: IdentifyPayload,
    ) -> HandlerResult<Option<CloseCode>> {
        if connection.is_authenticated().await {
            tracing::warn!(
                session_id = %connection.session_id(),
                "Client sent Identify while already authenticated"
            );
            return Ok(Some(CloseCode::AlreadyAuthenticated));
        }

        let credential = payload.credential().ok_or_else(|| {
            HandlerError::InvalidPayload("Identify needs exactly one of token, guestToken".to_string())
        })?;

        let identity = match credential {
            Credential::Staff(token) => Self::identify_staff(state, token).await?,
            Credential::Guest(token) => Self::identify_guest(state, token).await?,
        };

        let session_id = connection.session_id();
        state
            .connection_manager()
            .authenticate_connection(session_id, identity)
            .await;

        let ready = match identity {
            Identity::Guest {
                reservation_id,
                thread_id,
            } => ReadyEvent {
                v: ReadyEvent::VERSION,
                session_id: session_id.to_string(),
                role: SessionRole::Guest,
                user_id: None,
                reservation_id: Some(reservation_id),
                thread_id: Some(thread_id),
            },
            Identity::Staff(actor) => ReadyEvent {
                v: ReadyEvent::VERSION,
                session_id: session_id.to_string(),
                role: SessionRole::Staff,
                user_id: Some(actor.user_id),
                reservation_id: None,
                thread_id: None,
            },
        };
        send_event(connection, GatewayEventType::Ready, &ready).await?;

        tracing::info!(session_id = %session_id, role = ?ready.role, "Client identified");

        if let Some(thread_id) = identity.guest_thread() {
            SubscribeHandler::attach(state, connection, thread_id).await?;
        }

        Ok(None)
    }

    async fn identify_staff(state: &GatewayState, token: &str) -> HandlerResult<Identity> {
        let actor = PermissionService::new(state.service_context())
            .authenticate(token)
            .await
            .map_err(|e| HandlerError::from_service(e, HandlerError::AuthenticationFailed))?;
        Ok(Identity::Staff(actor))
    }

    async fn identify_guest(state: &GatewayState, token: &str) -> HandlerResult<Identity> {
        let ctx = state.service_context();
        let stay = GuestPortalService::new(ctx)
            .resolve(token)
            .await
            .map_err(|e| HandlerError::from_service(e, HandlerError::AuthenticationFailed))?;
        let thread = MessagingService::new(ctx)
            .thread_for(&stay.reservation)
            .await?;

        Ok(Identity::Guest {
            reservation_id: stay.reservation.id,
            thread_id: thread.id,
        })
    }
}

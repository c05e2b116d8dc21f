//! Subscribe (op 3) and Unsubscribe (op 4) handlers

use super::{send_event, HandlerError, HandlerResult};
use crate::connection::{Connection, Identity};
use crate::events::GatewayEventType;
use crate::protocol::{CloseCode, ThreadPayload};
use crate::server::GatewayState;
use stay_service::services::MessagingService;
use std::sync::Arc;
use uuid::Uuid;

pub struct SubscribeHandler;

impl SubscribeHandler {
    pub async fn subscribe(
        state: &GatewayState,
        connection: &Arc<Connection>,
        payload: ThreadPayload,
    ) -> HandlerResult<Option<CloseCode>> {
        let identity = connection
            .identity()
            .await
            .ok_or(HandlerError::NotAuthenticated)?;
        let thread_id = payload.thread_id;

        match identity {
            Identity::Guest {
                thread_id: own_thread,
                ..
            } => {
                if own_thread != thread_id {
                    return Err(HandlerError::ThreadForbidden(thread_id));
                }
            }
            Identity::Staff(actor) => {
                MessagingService::new(state.service_context())
                    .load_thread(&actor, thread_id)
                    .await
                    .map_err(|e| HandlerError::from_service(e, |_| HandlerError::ThreadForbidden(thread_id)))?;
            }
        }

        Self::attach(state, connection, thread_id).await?;
        Ok(None)
    }

    pub async fn unsubscribe(
        state: &GatewayState,
        connection: &Arc<Connection>,
        payload: ThreadPayload,
    ) -> HandlerResult<Option<CloseCode>> {
        if !connection.is_authenticated().await {
            return Err(HandlerError::NotAuthenticated);
        }

        let thread_id = payload.thread_id;
        let emptied = state
            .connection_manager()
            .unsubscribe_from_thread(connection.session_id(), thread_id)
            .await;
        if emptied {
            state.event_dispatcher().release_threads(&[thread_id]).await;
        }

        send_event(connection, GatewayEventType::Unsubscribed, &payload).await?;
        Ok(None)
    }

    /// Subscribe an authorized connection and confirm with `SUBSCRIBED`
    pub(crate) async fn attach(
        state: &GatewayState,
        connection: &Arc<Connection>,
        thread_id: Uuid,
    ) -> HandlerResult<()> {
        let first = state
            .connection_manager()
            .subscribe_to_thread(connection.session_id(), thread_id)
            .await
            .ok_or_else(|| HandlerError::Internal("Connection is not registered".to_string()))?;

        if first {
            state.event_dispatcher().subscribe_thread(thread_id).await?;
        }

        tracing::debug!(
            session_id = %connection.session_id(),
            thread_id = %thread_id,
            "Thread subscribed"
        );
        send_event(connection, GatewayEventType::Subscribed, &ThreadPayload { thread_id }).await
    }
}

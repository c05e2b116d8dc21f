//! Op code handlers

mod error;
mod heartbeat;
mod identify;
mod subscribe;

pub use error::{HandlerError, HandlerResult};
pub use heartbeat::HeartbeatHandler;
pub use identify::IdentifyHandler;
pub use subscribe::SubscribeHandler;

use crate::connection::Connection;
use crate::events::GatewayEventType;
use crate::protocol::{CloseCode, GatewayMessage, OpCode};
use crate::server::GatewayState;
use serde::Serialize;
use std::sync::Arc;

/// Routes client frames to their handler
pub struct OpDispatcher;

impl OpDispatcher {
    /// Handle one client frame; `Some` closes the connection
    pub async fn dispatch(
        state: &GatewayState,
        connection: &Arc<Connection>,
        message: GatewayMessage,
    ) -> HandlerResult<Option<CloseCode>> {
        if !message.op.is_client_op() {
            tracing::warn!(
                session_id = %connection.session_id(),
                op = %message.op,
                "Received server-only op code from client"
            );
            return Ok(Some(CloseCode::UnknownOpcode));
        }

        match message.op {
            OpCode::Heartbeat => {
                let seq = message.as_heartbeat_seq().ok_or_else(|| {
                    HandlerError::InvalidPayload("Invalid Heartbeat payload".to_string())
                })?;
                HeartbeatHandler::handle(connection, seq).await
            }
            OpCode::Identify => {
                let payload = message.as_identify().ok_or_else(|| {
                    HandlerError::InvalidPayload("Invalid Identify payload".to_string())
                })?;
                IdentifyHandler::handle(state, connection, payload).await
            }
            OpCode::Subscribe => {
                let payload = message.as_subscribe().ok_or_else(|| {
                    HandlerError::InvalidPayload("Invalid Subscribe payload".to_string())
                })?;
                SubscribeHandler::subscribe(state, connection, payload).await
            }
            OpCode::Unsubscribe => {
                let payload = message.as_unsubscribe().ok_or_else(|| {
                    HandlerError::InvalidPayload("Invalid Unsubscribe payload".to_string())
                })?;
                SubscribeHandler::unsubscribe(state, connection, payload).await
            }
            // Server ops were rejected above
            OpCode::Dispatch | OpCode::Hello | OpCode::HeartbeatAck => {
                Ok(Some(CloseCode::UnknownOpcode))
            }
        }
    }
}

/// Send a dispatch frame with the connection's next sequence number
pub(crate) async fn send_event(
    connection: &Connection,
    event_type: GatewayEventType,
    data: &impl Serialize,
) -> HandlerResult<()> {
    let data = serde_json::to_value(data)
        .map_err(|e| HandlerError::Internal(format!("Failed to encode {event_type}: {e}")))?;
    let seq = connection.next_sequence();

    connection
        .send(GatewayMessage::dispatch(event_type.as_str(), seq, data))
        .await
        .map_err(|e| HandlerError::Internal(format!("Failed to send {event_type}: {e}")))
}

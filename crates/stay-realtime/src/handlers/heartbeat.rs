//! Heartbeat handler (op 1)

use super::{HandlerError, HandlerResult};
use crate::connection::Connection;
use crate::protocol::{CloseCode, GatewayMessage};
use std::sync::Arc;

pub struct HeartbeatHandler;

impl HeartbeatHandler {
    /// `last_sequence` is the last dispatch sequence the client received
    pub async fn handle(
        connection: &Arc<Connection>,
        last_sequence: Option<u64>,
    ) -> HandlerResult<Option<CloseCode>> {
        connection.record_heartbeat().await;

        tracing::trace!(
            session_id = %connection.session_id(),
            client_seq = ?last_sequence,
            server_seq = connection.current_sequence(),
            "Heartbeat received"
        );

        connection
            .send(GatewayMessage::heartbeat_ack())
            .await
            .map_err(|_| HandlerError::Internal("Failed to send heartbeat ACK".to_string()))?;

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::OpCode;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn test_heartbeat_is_acked() {
        let (tx, mut rx) = mpsc::channel(1);
        let conn = Connection::new("s".to_string(), tx);

        let result = HeartbeatHandler::handle(&conn, Some(3)).await.unwrap();
        assert!(result.is_none());
        assert_eq!(rx.recv().await.unwrap().op, OpCode::HeartbeatAck);
    }

    #[tokio::test]
    async fn test_heartbeat_on_closed_socket_fails() {
        let (tx, rx) = mpsc::channel(1);
        let conn = Connection::new("s".to_string(), tx);
        drop(rx);

        let err = HeartbeatHandler::handle(&conn, None).await.unwrap_err();
        assert_eq!(err.to_close_code(), CloseCode::UnknownError);
    }
}

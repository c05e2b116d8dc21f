//! WebSocket handler
//!
//! Per socket: a receive loop feeding the op handlers, a send loop draining
//! the connection's outgoing buffer, and a heartbeat watchdog. Whichever
//! ends first tears the others down.

use crate::connection::{generate_session_id, Connection, ConnectionState};
use crate::handlers::OpDispatcher;
use crate::protocol::{CloseCode, GatewayMessage, HelloPayload};
use crate::server::GatewayState;
use axum::extract::ws::{CloseFrame, Message, WebSocket};
use axum::{
    extract::{State, WebSocketUpgrade},
    response::IntoResponse,
};
use futures::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::interval;

/// Heartbeat interval announced in Hello
pub const HEARTBEAT_INTERVAL_MS: u64 = HelloPayload::DEFAULT_HEARTBEAT_INTERVAL;

/// Silence after which the connection is considered dead
pub const HEARTBEAT_TIMEOUT_MS: u64 = HEARTBEAT_INTERVAL_MS * 2;

/// Outgoing frames buffered per connection
const MESSAGE_BUFFER_SIZE: usize = 100;

/// How long the send loop gets to flush the close frame
const CLOSE_TIMEOUT: Duration = Duration::from_secs(5);

/// WebSocket gateway handler
pub async fn gateway_handler(
    State(state): State<GatewayState>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(state, socket))
}

async fn handle_socket(state: GatewayState, socket: WebSocket) {
    let session_id = generate_session_id();
    let (tx, rx) = mpsc::channel::<GatewayMessage>(MESSAGE_BUFFER_SIZE);
    let connection = state
        .connection_manager()
        .add_connection(session_id.clone(), tx);

    tracing::info!(session_id = %session_id, "WebSocket connection established");

    let (mut ws_sink, mut ws_stream) = socket.split();

    let hello = GatewayMessage::hello(HelloPayload::with_interval(HEARTBEAT_INTERVAL_MS));
    if let Ok(json) = hello.to_json() {
        if ws_sink.send(Message::Text(json)).await.is_err() {
            tracing::warn!(session_id = %session_id, "Failed to send Hello message");
            cleanup_connection(&state, &connection).await;
            return;
        }
    }

    let (close_tx, close_rx) = oneshot::channel::<CloseCode>();
    let mut send_task = tokio::spawn(send_loop(ws_sink, rx, close_rx, session_id.clone()));

    let state_recv = state.clone();
    let connection_recv = connection.clone();
    let mut recv_task = tokio::spawn(async move {
        let session_id = connection_recv.session_id().to_string();
        while let Some(msg) = ws_stream.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    if let Err(close_code) =
                        handle_text_message(&state_recv, &connection_recv, &text).await
                    {
                        return Some(close_code);
                    }
                }
                Ok(Message::Binary(_)) => {
                    tracing::debug!(session_id = %session_id, "Binary messages not supported");
                    return Some(CloseCode::DecodeError);
                }
                // Pings are answered by axum
                Ok(Message::Ping(_) | Message::Pong(_)) => {}
                Ok(Message::Close(_)) => {
                    tracing::info!(session_id = %session_id, "Client closed connection");
                    return None;
                }
                Err(e) => {
                    tracing::warn!(session_id = %session_id, error = %e, "WebSocket error");
                    return None;
                }
            }
        }
        None
    });

    let connection_hb = connection.clone();
    let mut heartbeat_task = tokio::spawn(async move {
        let timeout = Duration::from_millis(HEARTBEAT_TIMEOUT_MS);
        let mut check_interval = interval(Duration::from_millis(HEARTBEAT_INTERVAL_MS / 2));
        loop {
            check_interval.tick().await;
            let since = connection_hb.time_since_heartbeat().await;
            if since > timeout {
                tracing::warn!(
                    session_id = %connection_hb.session_id(),
                    time_since_ms = since.as_millis(),
                    "Connection timed out (no heartbeat)"
                );
                return CloseCode::SessionTimeout;
            }
        }
    });

    let (close_code, send_done) = tokio::select! {
        result = &mut recv_task => (result.ok().flatten(), false),
        result = &mut heartbeat_task => (result.ok(), false),
        _ = &mut send_task => (None, true),
    };
    recv_task.abort();
    heartbeat_task.abort();

    if !send_done {
        if let Some(code) = close_code {
            tracing::debug!(session_id = %session_id, close_code = %code, "Closing connection");
            let _ = close_tx.send(code);
        } else {
            drop(close_tx);
        }
        if tokio::time::timeout(CLOSE_TIMEOUT, &mut send_task).await.is_err() {
            send_task.abort();
        }
    }

    cleanup_connection(&state, &connection).await;
}

/// Drain outgoing frames until the connection closes
async fn send_loop(
    mut sink: SplitSink<WebSocket, Message>,
    mut rx: mpsc::Receiver<GatewayMessage>,
    mut close_rx: oneshot::Receiver<CloseCode>,
    session_id: String,
) {
    loop {
        tokio::select! {
            msg = rx.recv() => {
                let Some(msg) = msg else { break };
                match msg.to_json() {
                    Ok(json) => {
                        if sink.send(Message::Text(json)).await.is_err() {
                            tracing::warn!(session_id = %session_id, "Failed to send message to WebSocket");
                            return;
                        }
                    }
                    Err(e) => {
                        tracing::error!(session_id = %session_id, error = %e, "Failed to encode frame");
                    }
                }
            }
            code = &mut close_rx => {
                let frame = code.ok().map(|code| {
                    let (code, reason) = GatewayMessage::close_frame(code);
                    CloseFrame { code, reason: reason.into() }
                });
                let _ = sink.send(Message::Close(frame)).await;
                break;
            }
        }
    }
    let _ = sink.close().await;
}

async fn handle_text_message(
    state: &GatewayState,
    connection: &Arc<Connection>,
    text: &str,
) -> Result<(), CloseCode> {
    let message = GatewayMessage::from_json(text).map_err(|e| {
        tracing::debug!(session_id = %connection.session_id(), error = %e, "Failed to parse message");
        CloseCode::DecodeError
    })?;

    tracing::trace!(session_id = %connection.session_id(), op = %message.op, "Received message");

    match OpDispatcher::dispatch(state, connection, message).await {
        Ok(Some(close_code)) => Err(close_code),
        Ok(None) => Ok(()),
        Err(e) => {
            tracing::warn!(session_id = %connection.session_id(), error = %e, "Handler error");
            Err(e.to_close_code())
        }
    }
}

async fn cleanup_connection(state: &GatewayState, connection: &Arc<Connection>) {
    tracing::info!(
        session_id = %connection.session_id(),
        age_ms = connection.age().as_millis(),
        "Cleaning up connection"
    );

    connection.set_state(ConnectionState::Disconnected).await;
    let emptied = state
        .connection_manager()
        .remove_connection(connection.session_id())
        .await;
    state.event_dispatcher().release_threads(&emptied).await;
}

//! Guest-side chat client

use chrono::Utc;
use futures_util::{SinkExt, StreamExt};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use stay_core::chat::{Applied, ChatSession, ConnectionState};
use stay_core::entities::SenderRole;
use stay_core::{MessageEvent, MessageRecord};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::{interval, Interval, MissedTickBehavior};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use uuid::Uuid;

use super::{ClientError, ClientResult};
use crate::events::GatewayEventType;
use crate::protocol::{CloseCode, GatewayMessage, IdentifyPayload, OpCode, ThreadPayload};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Where the client connects and as whom
#[derive(Debug, Clone)]
pub struct ChatClientConfig {
    /// REST API base, e.g. `http://localhost:8080`
    pub api_base_url: String,
    /// Gateway socket URL, e.g. `ws://localhost:8081/ws`
    pub gateway_url: String,
    /// Token from the guest portal link
    pub guest_token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PortalSummary {
    thread_id: Uuid,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: String,
    message: String,
}

/// Merge one gateway frame into `session`
///
/// Returns what the session did with a message event, `None` for frames
/// that carry none.
pub fn apply_frame(
    session: &mut ChatSession,
    frame: &GatewayMessage,
) -> ClientResult<Option<Applied>> {
    if frame.op != OpCode::Dispatch {
        return Ok(None);
    }
    let event_type = frame.t.as_deref().and_then(GatewayEventType::parse);
    let data = || {
        frame
            .d
            .clone()
            .ok_or_else(|| ClientError::Protocol("Dispatch without data".to_string()))
    };

    match event_type {
        Some(GatewayEventType::Insert) => {
            let record: MessageRecord = serde_json::from_value(data()?)?;
            Ok(Some(session.apply(&MessageEvent::Insert(record))))
        }
        Some(GatewayEventType::Update) => {
            let record: MessageRecord = serde_json::from_value(data()?)?;
            Ok(Some(session.apply(&MessageEvent::Update(record))))
        }
        Some(GatewayEventType::Subscribed) => {
            let payload: ThreadPayload = serde_json::from_value(data()?)?;
            if payload.thread_id == session.thread_id() {
                session.mark_subscribed();
            }
            Ok(None)
        }
        Some(GatewayEventType::Unsubscribed) => {
            let payload: ThreadPayload = serde_json::from_value(data()?)?;
            if payload.thread_id == session.thread_id() {
                session.mark_disconnected();
            }
            Ok(None)
        }
        Some(GatewayEventType::Ready) | None => Ok(None),
    }
}

/// Chat client for one guest thread
pub struct ChatClient {
    http: reqwest::Client,
    config: ChatClientConfig,
    session: ChatSession,
    socket: Option<WsStream>,
    heartbeat: Option<Interval>,
    last_sequence: Option<u64>,
}

impl ChatClient {
    /// Resolve the guest's thread, load its history and subscribe
    pub async fn connect(config: ChatClientConfig) -> ClientResult<Self> {
        let http = reqwest::Client::new();
        let summary: PortalSummary = Self::get_json(&http, &Self::portal_url(&config, "")).await?;

        let mut client = Self {
            http,
            config,
            session: ChatSession::new(summary.thread_id, SenderRole::Guest),
            socket: None,
            heartbeat: None,
            last_sequence: None,
        };
        client.reconnect().await?;
        Ok(client)
    }

    pub fn session(&self) -> &ChatSession {
        &self.session
    }

    pub fn thread_id(&self) -> Uuid {
        self.session.thread_id()
    }

    pub fn is_subscribed(&self) -> bool {
        self.session.connection_state() == ConnectionState::Subscribed
    }

    fn portal_url(config: &ChatClientConfig, path: &str) -> String {
        format!(
            "{}/api/guest/{}{}",
            config.api_base_url.trim_end_matches('/'),
            config.guest_token,
            path
        )
    }

    async fn check(response: reqwest::Response) -> ClientResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let (code, message) = match response.json::<ErrorEnvelope>().await {
            Ok(envelope) => (envelope.error.code, envelope.error.message),
            Err(_) => (
                "UNKNOWN".to_string(),
                status.canonical_reason().unwrap_or("").to_string(),
            ),
        };
        Err(ClientError::Api {
            status: status.as_u16(),
            code,
            message,
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        http: &reqwest::Client,
        url: &str,
    ) -> ClientResult<T> {
        let response = Self::check(http.get(url).send().await?).await?;
        Ok(response.json().await?)
    }

    /// Refetch history and open a fresh gateway connection
    ///
    /// Optimistic messages still in flight survive the reload.
    pub async fn reconnect(&mut self) -> ClientResult<()> {
        if let Some(mut socket) = self.socket.take() {
            let _ = socket.close(None).await;
        }
        self.session.mark_disconnected();

        let history: Vec<MessageRecord> =
            Self::get_json(&self.http, &Self::portal_url(&self.config, "/messages")).await?;
        self.session.load_history(&history);

        if !self.session.begin_connect() {
            return Err(ClientError::Protocol("Already connecting".to_string()));
        }
        match self.open_socket().await {
            Ok(()) => Ok(()),
            Err(e) => {
                self.session.mark_disconnected();
                self.socket = None;
                Err(e)
            }
        }
    }

    async fn open_socket(&mut self) -> ClientResult<()> {
        let (mut socket, _) = connect_async(self.config.gateway_url.as_str()).await?;

        let hello = Self::read_frame(&mut socket).await?;
        let hello = hello
            .as_hello()
            .ok_or_else(|| ClientError::Protocol(format!("Expected Hello, got {hello}")))?;

        let identify = GatewayMessage::identify(&IdentifyPayload::guest(&self.config.guest_token));
        socket.send(Message::Text(identify.to_json()?)).await?;

        let mut heartbeat = interval(Duration::from_millis(hello.heartbeat_interval.max(1)));
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);
        heartbeat.tick().await;

        self.last_sequence = None;
        self.heartbeat = Some(heartbeat);
        self.socket = Some(socket);

        // READY, then SUBSCRIBED for the guest's thread
        while !self.is_subscribed() {
            self.next_event().await?;
        }
        Ok(())
    }

    async fn read_frame(socket: &mut WsStream) -> ClientResult<GatewayMessage> {
        loop {
            match socket.next().await {
                Some(Ok(Message::Text(text))) => return Ok(GatewayMessage::from_json(&text)?),
                Some(Ok(Message::Close(frame))) => {
                    let code = frame.and_then(|f| CloseCode::from_u16(u16::from(f.code)));
                    return Err(ClientError::Closed(code));
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e.into()),
                None => return Err(ClientError::Closed(None)),
            }
        }
    }

    /// Wait for the next message event, sending heartbeats meanwhile
    ///
    /// Frames that carry no message event are consumed silently.
    pub async fn next_event(&mut self) -> ClientResult<Applied> {
        loop {
            let (Some(socket), Some(heartbeat)) = (self.socket.as_mut(), self.heartbeat.as_mut())
            else {
                return Err(ClientError::NotConnected);
            };

            let frame = tokio::select! {
                _ = heartbeat.tick() => {
                    let beat = GatewayMessage::heartbeat(self.last_sequence);
                    socket.send(Message::Text(beat.to_json()?)).await?;
                    continue;
                }
                frame = Self::read_frame(socket) => frame,
            };

            let frame = match frame {
                Ok(frame) => frame,
                Err(e) => {
                    self.socket = None;
                    self.heartbeat = None;
                    self.session.mark_disconnected();
                    return Err(e);
                }
            };

            if let Some(seq) = frame.s {
                self.last_sequence = Some(seq);
            }
            if let Some(applied) = apply_frame(&mut self.session, &frame)? {
                return Ok(applied);
            }
        }
    }

    /// Echo locally, post, and confirm or fail the optimistic entry
    pub async fn send(&mut self, content: &str) -> ClientResult<MessageRecord> {
        let local_id = self.session.send_optimistic(content, Utc::now());

        let result = async {
            let response = self
                .http
                .post(Self::portal_url(&self.config, "/messages"))
                .json(&json!({ "content": content }))
                .send()
                .await?;
            let response = Self::check(response).await?;
            if response.status() != StatusCode::CREATED {
                tracing::debug!(status = %response.status(), "Unexpected status for posted message");
            }
            Ok::<MessageRecord, ClientError>(response.json().await?)
        }
        .await;

        match result {
            Ok(record) => {
                self.session.confirm_sent(&local_id, &record);
                Ok(record)
            }
            Err(e) => {
                self.session.fail_send(&local_id);
                Err(e)
            }
        }
    }

    /// Mark host messages as read; returns how many were updated
    pub async fn mark_read(&self) -> ClientResult<usize> {
        #[derive(Deserialize)]
        struct Updated {
            updated: usize,
        }

        let response = self
            .http
            .post(Self::portal_url(&self.config, "/messages/read"))
            .send()
            .await?;
        let body: Updated = Self::check(response).await?.json().await?;
        Ok(body.updated)
    }

    pub async fn close(mut self) -> ClientResult<()> {
        if let Some(mut socket) = self.socket.take() {
            socket.close(None).await?;
        }
        self.session.mark_disconnected();
        Ok(())
    }
}

impl std::fmt::Debug for ChatClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatClient")
            .field("thread_id", &self.session.thread_id())
            .field("state", &self.session.connection_state())
            .field("connected", &self.socket.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stay_core::chat::EntryStatus;
    use stay_core::Message as ChatMessage;

    fn dispatch(event: GatewayEventType, data: serde_json::Value) -> GatewayMessage {
        GatewayMessage::dispatch(event.as_str(), 1, data)
    }

    #[test]
    fn test_subscribed_marks_session() {
        let thread_id = Uuid::new_v4();
        let mut session = ChatSession::new(thread_id, SenderRole::Guest);
        assert!(session.begin_connect());

        let other = dispatch(GatewayEventType::Subscribed, json!({ "threadId": Uuid::new_v4() }));
        apply_frame(&mut session, &other).unwrap();
        assert_eq!(session.connection_state(), ConnectionState::Connecting);

        let own = dispatch(GatewayEventType::Subscribed, json!({ "threadId": thread_id }));
        assert!(apply_frame(&mut session, &own).unwrap().is_none());
        assert_eq!(session.connection_state(), ConnectionState::Subscribed);
    }

    #[test]
    fn test_realtime_insert_confirms_optimistic_message() {
        let thread_id = Uuid::new_v4();
        let mut session = ChatSession::new(thread_id, SenderRole::Guest);
        session.send_optimistic("Where is the key box?", Utc::now());

        let stored = ChatMessage::new(thread_id, SenderRole::Guest, None, "Where is the key box?".to_string());
        let frame = dispatch(
            GatewayEventType::Insert,
            serde_json::to_value(MessageRecord::from(&stored)).unwrap(),
        );

        let applied = apply_frame(&mut session, &frame).unwrap();
        assert_eq!(applied, Some(Applied::Replaced { local_id: "temp-1".to_string() }));
        assert_eq!(session.messages().len(), 1);
        assert_eq!(session.messages()[0].status, EntryStatus::Confirmed);
        assert_eq!(session.pending_count(), 0);
    }

    #[test]
    fn test_non_message_frames_are_skipped() {
        let mut session = ChatSession::new(Uuid::new_v4(), SenderRole::Guest);
        assert!(apply_frame(&mut session, &GatewayMessage::heartbeat_ack()).unwrap().is_none());

        let ready = dispatch(GatewayEventType::Ready, json!({ "v": 1 }));
        assert!(apply_frame(&mut session, &ready).unwrap().is_none());
    }

    #[test]
    fn test_malformed_insert_is_an_error() {
        let mut session = ChatSession::new(Uuid::new_v4(), SenderRole::Guest);
        let frame = dispatch(GatewayEventType::Insert, json!({ "content": "missing fields" }));
        assert!(matches!(apply_frame(&mut session, &frame), Err(ClientError::Json(_))));
    }
}

//! A single WebSocket connection

use crate::protocol::GatewayMessage;
use serde::{Deserialize, Serialize};
use stay_service::services::Actor;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

/// Connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionState {
    /// Waiting for Identify
    Connecting,
    /// Identified
    Connected,
    Disconnected,
}

/// Who a connection identified as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Identity {
    /// Portal guest; may only follow the reservation's thread
    Guest { reservation_id: Uuid, thread_id: Uuid },
    /// Dashboard user
    Staff(Actor),
}

impl Identity {
    /// Thread a guest is confined to; `None` for staff
    #[must_use]
    pub fn guest_thread(&self) -> Option<Uuid> {
        match self {
            Self::Guest { thread_id, .. } => Some(*thread_id),
            Self::Staff(_) => None,
        }
    }
}

/// New random session id
#[must_use]
pub fn generate_session_id() -> String {
    Uuid::new_v4().to_string()
}

/// A single WebSocket connection
pub struct Connection {
    session_id: String,

    /// Set by Identify
    identity: RwLock<Option<Identity>>,

    state: RwLock<ConnectionState>,

    /// Outgoing frames, drained by the socket's send task
    sender: mpsc::Sender<GatewayMessage>,

    /// Last dispatch sequence number sent
    sequence: AtomicU64,

    last_heartbeat: RwLock<Instant>,

    threads: RwLock<HashSet<Uuid>>,

    created_at: Instant,
}

impl Connection {
    pub fn new(session_id: String, sender: mpsc::Sender<GatewayMessage>) -> Arc<Self> {
        Arc::new(Self {
            session_id,
            identity: RwLock::new(None),
            state: RwLock::new(ConnectionState::Connecting),
            sender,
            sequence: AtomicU64::new(0),
            last_heartbeat: RwLock::new(Instant::now()),
            threads: RwLock::new(HashSet::new()),
            created_at: Instant::now(),
        })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub async fn identity(&self) -> Option<Identity> {
        *self.identity.read().await
    }

    pub async fn set_identity(&self, identity: Identity) {
        *self.identity.write().await = Some(identity);
    }

    pub async fn is_authenticated(&self) -> bool {
        self.identity.read().await.is_some()
    }

    pub async fn state(&self) -> ConnectionState {
        *self.state.read().await
    }

    pub async fn set_state(&self, state: ConnectionState) {
        *self.state.write().await = state;
    }

    /// Next dispatch sequence number
    pub fn next_sequence(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn current_sequence(&self) -> u64 {
        self.sequence.load(Ordering::SeqCst)
    }

    pub async fn record_heartbeat(&self) {
        *self.last_heartbeat.write().await = Instant::now();
    }

    pub async fn time_since_heartbeat(&self) -> Duration {
        self.last_heartbeat.read().await.elapsed()
    }

    /// Returns false when already subscribed
    pub async fn subscribe_thread(&self, thread_id: Uuid) -> bool {
        self.threads.write().await.insert(thread_id)
    }

    /// Returns false when not subscribed
    pub async fn unsubscribe_thread(&self, thread_id: Uuid) -> bool {
        self.threads.write().await.remove(&thread_id)
    }

    pub async fn threads(&self) -> Vec<Uuid> {
        self.threads.read().await.iter().copied().collect()
    }

    pub async fn is_subscribed_to(&self, thread_id: Uuid) -> bool {
        self.threads.read().await.contains(&thread_id)
    }

    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }

    /// Queue a frame, waiting for buffer space
    pub async fn send(
        &self,
        message: GatewayMessage,
    ) -> Result<(), mpsc::error::SendError<GatewayMessage>> {
        self.sender.send(message).await
    }

    /// Queue a frame without waiting
    pub fn try_send(
        &self,
        message: GatewayMessage,
    ) -> Result<(), mpsc::error::TrySendError<GatewayMessage>> {
        self.sender.try_send(message)
    }

    /// Queue a dispatch with this connection's next sequence number
    pub fn try_dispatch(
        &self,
        event_type: &str,
        data: serde_json::Value,
    ) -> Result<(), mpsc::error::TrySendError<GatewayMessage>> {
        let seq = self.next_sequence();
        self.try_send(GatewayMessage::dispatch(event_type, seq, data))
    }

    /// Whether the socket's send task has gone away
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("session_id", &self.session_id)
            .field("sequence", &self.sequence.load(Ordering::SeqCst))
            .field("created_at", &self.created_at)
            .finish()
    }
}

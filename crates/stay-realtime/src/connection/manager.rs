//! Connection manager
//!
//! All live connections and the thread subscription index, in `DashMap`s.

use super::{Connection, ConnectionState, Identity};
use crate::protocol::GatewayMessage;
use dashmap::DashMap;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Manages all active WebSocket connections
#[derive(Debug, Default)]
pub struct ConnectionManager {
    /// Active connections by session ID
    connections: DashMap<String, Arc<Connection>>,

    /// Thread ID to subscribed session IDs
    thread_connections: DashMap<Uuid, HashSet<String>>,
}

impl ConnectionManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Register a new connection
    pub fn add_connection(
        &self,
        session_id: String,
        sender: mpsc::Sender<GatewayMessage>,
    ) -> Arc<Connection> {
        let connection = Connection::new(session_id.clone(), sender);
        self.connections.insert(session_id.clone(), connection.clone());

        tracing::debug!(session_id = %session_id, "Connection added");

        connection
    }

    /// Remove a connection
    ///
    /// Returns the threads left without any local subscriber.
    pub async fn remove_connection(&self, session_id: &str) -> Vec<Uuid> {
        let Some((_, connection)) = self.connections.remove(session_id) else {
            return Vec::new();
        };

        let mut emptied = Vec::new();
        for thread_id in connection.threads().await {
            if self.detach(session_id, thread_id) {
                emptied.push(thread_id);
            }
        }

        tracing::debug!(session_id = %session_id, "Connection removed");
        emptied
    }

    pub fn get_connection(&self, session_id: &str) -> Option<Arc<Connection>> {
        self.connections.get(session_id).map(|r| r.clone())
    }

    /// Record who a connection identified as
    pub async fn authenticate_connection(&self, session_id: &str, identity: Identity) -> bool {
        let Some(connection) = self.get_connection(session_id) else {
            return false;
        };
        connection.set_identity(identity).await;
        connection.set_state(ConnectionState::Connected).await;

        tracing::debug!(session_id = %session_id, identity = ?identity, "Connection authenticated");
        true
    }

    /// Subscribe a connection to a thread
    ///
    /// `Some(true)` when it is the first local subscriber of the thread,
    /// `None` when the session is unknown.
    pub async fn subscribe_to_thread(&self, session_id: &str, thread_id: Uuid) -> Option<bool> {
        let connection = self.get_connection(session_id)?;
        connection.subscribe_thread(thread_id).await;

        let first = {
            let mut sessions = self.thread_connections.entry(thread_id).or_default();
            let first = sessions.is_empty();
            sessions.insert(session_id.to_string());
            first
        };

        tracing::trace!(session_id = %session_id, thread_id = %thread_id, "Subscribed to thread");
        Some(first)
    }

    /// Unsubscribe a connection from a thread
    ///
    /// Returns true when the thread has no local subscriber left.
    pub async fn unsubscribe_from_thread(&self, session_id: &str, thread_id: Uuid) -> bool {
        let Some(connection) = self.get_connection(session_id) else {
            return false;
        };
        if !connection.unsubscribe_thread(thread_id).await {
            return false;
        }

        tracing::trace!(session_id = %session_id, thread_id = %thread_id, "Unsubscribed from thread");
        self.detach(session_id, thread_id)
    }

    /// Drop `session_id` from a thread's set; true if the set was removed
    fn detach(&self, session_id: &str, thread_id: Uuid) -> bool {
        let now_empty = match self.thread_connections.get_mut(&thread_id) {
            Some(mut sessions) => {
                sessions.remove(session_id);
                sessions.is_empty()
            }
            None => false,
        };

        now_empty
            && self
                .thread_connections
                .remove_if(&thread_id, |_, sessions| sessions.is_empty())
                .is_some()
    }

    /// All connections subscribed to a thread
    pub fn get_thread_connections(&self, thread_id: Uuid) -> Vec<Arc<Connection>> {
        self.thread_connections
            .get(&thread_id)
            .map(|sessions| {
                sessions
                    .iter()
                    .filter_map(|sid| self.connections.get(sid).map(|c| c.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Dispatch an event to every subscriber of a thread
    ///
    /// A subscriber whose buffer is full misses the event; its sequence
    /// numbers show the gap.
    pub fn send_to_thread(&self, thread_id: Uuid, event_type: &str, data: &serde_json::Value) -> usize {
        let mut sent = 0;

        for conn in self.get_thread_connections(thread_id) {
            match conn.try_dispatch(event_type, data.clone()) {
                Ok(()) => sent += 1,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    tracing::warn!(
                        session_id = %conn.session_id(),
                        thread_id = %thread_id,
                        "Outgoing buffer full, event dropped"
                    );
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {}
            }
        }

        tracing::trace!(thread_id = %thread_id, sent = sent, "Event sent to thread subscribers");
        sent
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Number of threads with at least one subscriber
    pub fn thread_count(&self) -> usize {
        self.thread_connections.len()
    }

    pub fn has_session(&self, session_id: &str) -> bool {
        self.connections.contains_key(session_id)
    }

    /// Remove connections whose socket task has ended
    ///
    /// Returns the threads left without any local subscriber.
    pub async fn cleanup_closed_connections(&self) -> Vec<Uuid> {
        let closed: Vec<String> = self
            .connections
            .iter()
            .filter(|r| r.is_closed())
            .map(|r| r.key().clone())
            .collect();

        let mut emptied = Vec::new();
        for session_id in &closed {
            emptied.extend(self.remove_connection(session_id).await);
        }

        if !closed.is_empty() {
            tracing::debug!(count = closed.len(), "Cleaned up closed connections");
        }
        emptied
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add(manager: &ConnectionManager, id: &str) -> (Arc<Connection>, mpsc::Receiver<GatewayMessage>) {
        let (tx, rx) = mpsc::channel(4);
        (manager.add_connection(id.to_string(), tx), rx)
    }

    #[tokio::test]
    async fn test_first_and_last_subscriber() {
        let manager = ConnectionManager::new();
        let thread = Uuid::new_v4();
        let _a = add(&manager, "a");
        let _b = add(&manager, "b");

        assert_eq!(manager.subscribe_to_thread("a", thread).await, Some(true));
        assert_eq!(manager.subscribe_to_thread("b", thread).await, Some(false));
        assert_eq!(manager.subscribe_to_thread("missing", thread).await, None);
        assert_eq!(manager.thread_count(), 1);

        assert!(!manager.unsubscribe_from_thread("a", thread).await);
        assert!(manager.unsubscribe_from_thread("b", thread).await);
        assert_eq!(manager.thread_count(), 0);

        // Not subscribed any more
        assert!(!manager.unsubscribe_from_thread("b", thread).await);
    }

    #[tokio::test]
    async fn test_remove_connection_reports_emptied_threads() {
        let manager = ConnectionManager::new();
        let shared = Uuid::new_v4();
        let own = Uuid::new_v4();
        let _a = add(&manager, "a");
        let _b = add(&manager, "b");

        manager.subscribe_to_thread("a", shared).await;
        manager.subscribe_to_thread("b", shared).await;
        manager.subscribe_to_thread("a", own).await;

        let emptied = manager.remove_connection("a").await;
        assert_eq!(emptied, vec![own]);
        assert!(!manager.has_session("a"));
        assert_eq!(manager.get_thread_connections(shared).len(), 1);
        assert!(manager.remove_connection("a").await.is_empty());
    }

    #[tokio::test]
    async fn test_send_to_thread_only_reaches_subscribers() {
        let manager = ConnectionManager::new();
        let thread = Uuid::new_v4();
        let (_a, mut rx_a) = add(&manager, "a");
        let (_b, mut rx_b) = add(&manager, "b");
        manager.subscribe_to_thread("a", thread).await;

        let data = serde_json::json!({ "threadId": thread });
        assert_eq!(manager.send_to_thread(thread, "INSERT", &data), 1);

        let frame = rx_a.recv().await.unwrap();
        assert_eq!(frame.t.as_deref(), Some("INSERT"));
        assert_eq!(frame.s, Some(1));
        assert!(rx_b.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_full_buffer_is_not_counted() {
        let manager = ConnectionManager::new();
        let thread = Uuid::new_v4();
        let (_a, _rx) = add(&manager, "a");
        manager.subscribe_to_thread("a", thread).await;

        let data = serde_json::json!({});
        let delivered: usize = (0..6).map(|_| manager.send_to_thread(thread, "INSERT", &data)).sum();
        assert_eq!(delivered, 4);
    }

    #[tokio::test]
    async fn test_cleanup_closed_connections() {
        let manager = ConnectionManager::new();
        let thread = Uuid::new_v4();
        let (_a, rx_a) = add(&manager, "a");
        let (_b, _rx_b) = add(&manager, "b");
        manager.subscribe_to_thread("a", thread).await;

        drop(rx_a);
        assert_eq!(manager.cleanup_closed_connections().await, vec![thread]);
        assert_eq!(manager.connection_count(), 1);
    }
}

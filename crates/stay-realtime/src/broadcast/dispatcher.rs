//! Event dispatcher
//!
//! The gateway holds one Redis subscription per thread that has at least
//! one local subscriber. Every event received on `thread:{id}` is sent to
//! the sockets following that thread.

use crate::connection::ConnectionManager;
use crate::events::GatewayEventType;
use stay_cache::{PubSubChannel, ReceivedMessage, Subscriber, SubscriberBuilder, SubscriberError};
use stay_common::RedisConfig;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Configuration for the event dispatcher
#[derive(Debug, Clone)]
pub struct EventDispatcherConfig {
    pub redis_url: String,
    /// Local fan-out buffer between the Redis listener and the dispatcher
    pub broadcast_buffer: usize,
    pub reconnect_delay_ms: u64,
}

impl Default for EventDispatcherConfig {
    fn default() -> Self {
        Self {
            redis_url: "redis://127.0.0.1:6379".to_string(),
            broadcast_buffer: 1024,
            reconnect_delay_ms: 1000,
        }
    }
}

impl From<&RedisConfig> for EventDispatcherConfig {
    fn from(config: &RedisConfig) -> Self {
        Self {
            redis_url: config.url.clone(),
            ..Self::default()
        }
    }
}

/// Route one Pub/Sub message to the sockets following its thread
///
/// Returns how many sockets the event was queued on.
pub fn route_message(manager: &ConnectionManager, msg: &ReceivedMessage) -> usize {
    let &PubSubChannel::Thread(thread_id) = &msg.channel else {
        tracing::debug!(channel = ?msg.channel, "Event on non-thread channel ignored");
        return 0;
    };

    let Some(event) = &msg.event else {
        tracing::debug!(thread_id = %thread_id, "Non-event payload ignored");
        return 0;
    };

    match GatewayEventType::parse(&event.event_type) {
        Some(event_type) if event_type.is_message_change() => {
            manager.send_to_thread(thread_id, event_type.as_str(), &event.data)
        }
        _ => {
            tracing::debug!(
                thread_id = %thread_id,
                event_type = %event.event_type,
                "Unknown event type ignored"
            );
            0
        }
    }
}

/// Routes Redis Pub/Sub messages to WebSocket connections
pub struct EventDispatcher {
    connection_manager: Arc<ConnectionManager>,
    subscriber: Subscriber,
    running: Arc<AtomicBool>,
}

impl EventDispatcher {
    pub async fn new(
        config: EventDispatcherConfig,
        connection_manager: Arc<ConnectionManager>,
    ) -> Result<Self, SubscriberError> {
        let subscriber = SubscriberBuilder::new()
            .redis_url(&config.redis_url)
            .broadcast_buffer(config.broadcast_buffer)
            .reconnect_delay_ms(config.reconnect_delay_ms)
            .build()
            .await?;

        Ok(Self {
            connection_manager,
            subscriber,
            running: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Start receiving a thread's events
    pub async fn subscribe_thread(&self, thread_id: Uuid) -> Result<(), SubscriberError> {
        self.subscriber
            .subscribe(&[PubSubChannel::thread(thread_id)])
            .await
    }

    /// Stop receiving a thread's events
    pub async fn unsubscribe_thread(&self, thread_id: Uuid) -> Result<(), SubscriberError> {
        self.subscriber
            .unsubscribe(&[PubSubChannel::thread(thread_id)])
            .await
    }

    /// Drop the Redis subscriptions of threads nobody follows any more
    pub async fn release_threads(&self, thread_ids: &[Uuid]) {
        // A thread may have gained a subscriber since it was emptied
        let channels: Vec<PubSubChannel> = thread_ids
            .iter()
            .copied()
            .filter(|id| self.connection_manager.get_thread_connections(*id).is_empty())
            .map(PubSubChannel::thread)
            .collect();
        if channels.is_empty() {
            return;
        }
        if let Err(e) = self.subscriber.unsubscribe(&channels).await {
            tracing::warn!(error = %e, threads = thread_ids.len(), "Failed to release thread channels");
        }
    }

    /// Spawn the dispatch loop
    pub fn start(self: Arc<Self>) {
        if self.running.swap(true, Ordering::SeqCst) {
            tracing::warn!("Event dispatcher is already running");
            return;
        }

        let dispatcher = self.clone();
        tokio::spawn(async move {
            dispatcher.run().await;
        });

        tracing::info!("Event dispatcher started");
    }

    pub async fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.subscriber.shutdown().await.ok();
        tracing::info!("Event dispatcher stopped");
    }

    async fn run(&self) {
        let mut receiver = self.subscriber.receiver();

        while self.running.load(Ordering::SeqCst) {
            match receiver.recv().await {
                Ok(msg) => {
                    route_message(&self.connection_manager, &msg);
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(lagged = n, "Event dispatcher lagged behind");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::warn!("Event dispatcher channel closed");
                    break;
                }
            }
        }

        self.running.store(false, Ordering::SeqCst);
        tracing::info!("Event dispatcher loop ended");
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl Drop for EventDispatcher {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stay_cache::PubSubEvent;
    use stay_core::{Message, MessageEvent, SenderRole};
    use tokio::sync::mpsc;

    fn received(channel: PubSubChannel, event: Option<PubSubEvent>) -> ReceivedMessage {
        ReceivedMessage {
            channel,
            payload: event
                .as_ref()
                .and_then(|e| e.to_json().ok())
                .unwrap_or_default(),
            event,
        }
    }

    #[tokio::test]
    async fn test_message_event_reaches_thread_subscribers() {
        let manager = ConnectionManager::new();
        let (tx, mut rx) = mpsc::channel(4);
        manager.add_connection("s".to_string(), tx);

        let message = Message::new(Uuid::new_v4(), SenderRole::Host, None, "Welcome".to_string());
        manager.subscribe_to_thread("s", message.thread_id).await;

        let event = PubSubEvent::from_message_event(&MessageEvent::inserted(&message)).unwrap();
        let sent = route_message(&manager, &received(PubSubChannel::thread(message.thread_id), Some(event)));
        assert_eq!(sent, 1);

        let frame = rx.recv().await.unwrap();
        assert_eq!(frame.t.as_deref(), Some("INSERT"));
        let data = frame.d.unwrap();
        assert_eq!(data["content"], "Welcome");
        assert_eq!(data["senderRole"], "host");
    }

    #[tokio::test]
    async fn test_other_channels_and_payloads_are_ignored() {
        let manager = ConnectionManager::new();
        let (tx, _rx) = mpsc::channel(4);
        manager.add_connection("s".to_string(), tx);
        let thread_id = Uuid::new_v4();
        manager.subscribe_to_thread("s", thread_id).await;

        let unknown = PubSubEvent::new("DELETE", serde_json::json!({}));
        assert_eq!(
            route_message(&manager, &received(PubSubChannel::thread(thread_id), Some(unknown))),
            0
        );
        assert_eq!(
            route_message(&manager, &received(PubSubChannel::thread(thread_id), None)),
            0
        );

        let insert = PubSubEvent::new("INSERT", serde_json::json!({}));
        assert_eq!(
            route_message(&manager, &received(PubSubChannel::property(thread_id), Some(insert))),
            0
        );
    }
}

//! Redis Pub/Sub subscriber.
//!
//! One background task owns the Redis Pub/Sub connection. Callers change the
//! channel set through a command queue and read events from a broadcast
//! receiver. When the connection drops the task waits `reconnect_delay_ms`,
//! reconnects and joins every channel it held before.

use crate::pool::redis_pool::redact_url;
use crate::pubsub::{PubSubChannel, PubSubEvent};
use futures_util::StreamExt;
use redis::aio::PubSub;
use redis::Client;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, RwLock};

#[derive(Debug, thiserror::Error)]
pub enum SubscriberError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Subscriber task has stopped")]
    ChannelClosed,
}

pub type SubscriberResult<T> = Result<T, SubscriberError>;

/// A message delivered on one of the subscribed channels
#[derive(Debug, Clone)]
pub struct ReceivedMessage {
    pub channel: PubSubChannel,
    /// `None` when the payload is not a `PubSubEvent`
    pub event: Option<PubSubEvent>,
    pub payload: String,
}

impl ReceivedMessage {
    fn from_redis(channel_name: &str, payload: String) -> Self {
        Self {
            channel: PubSubChannel::parse(channel_name),
            event: serde_json::from_str(&payload).ok(),
            payload,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SubscriberConfig {
    pub redis_url: String,
    /// Capacity of the fan-out channel; slow receivers lag past this
    pub broadcast_buffer: usize,
    pub reconnect_delay_ms: u64,
}

impl Default for SubscriberConfig {
    fn default() -> Self {
        Self {
            redis_url: "redis://127.0.0.1:6379".to_string(),
            broadcast_buffer: 1024,
            reconnect_delay_ms: 1000,
        }
    }
}

#[derive(Debug)]
enum Command {
    Join(Vec<String>),
    Leave(Vec<String>),
    Stop,
}

/// Why a connection session ended
enum SessionEnd {
    Stopped,
    Disconnected,
}

/// Handle to the background Pub/Sub task
pub struct Subscriber {
    channels: Arc<RwLock<HashSet<String>>>,
    events: broadcast::Sender<ReceivedMessage>,
    commands: mpsc::Sender<Command>,
}

impl Subscriber {
    /// Spawn the background task. The first connection attempt happens there,
    /// so this never fails.
    pub fn new(config: SubscriberConfig) -> Self {
        let (events, _) = broadcast::channel(config.broadcast_buffer);
        let (commands, command_rx) = mpsc::channel(32);
        let channels = Arc::new(RwLock::new(HashSet::new()));

        let task = ListenerTask {
            config,
            channels: channels.clone(),
            events: events.clone(),
            commands: command_rx,
        };
        tokio::spawn(task.run());

        Self {
            channels,
            events,
            commands,
        }
    }

    pub async fn subscribe(&self, channels: &[PubSubChannel]) -> SubscriberResult<()> {
        self.send(Command::Join(channels.iter().map(PubSubChannel::name).collect()))
            .await
    }

    pub async fn unsubscribe(&self, channels: &[PubSubChannel]) -> SubscriberResult<()> {
        self.send(Command::Leave(channels.iter().map(PubSubChannel::name).collect()))
            .await
    }

    #[must_use]
    pub fn receiver(&self) -> broadcast::Receiver<ReceivedMessage> {
        self.events.subscribe()
    }

    /// Channels joined on the current (or most recent) connection
    pub async fn subscribed_channels(&self) -> Vec<String> {
        self.channels.read().await.iter().cloned().collect()
    }

    pub async fn shutdown(&self) -> SubscriberResult<()> {
        self.send(Command::Stop).await
    }

    async fn send(&self, command: Command) -> SubscriberResult<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| SubscriberError::ChannelClosed)
    }
}

struct ListenerTask {
    config: SubscriberConfig,
    channels: Arc<RwLock<HashSet<String>>>,
    events: broadcast::Sender<ReceivedMessage>,
    commands: mpsc::Receiver<Command>,
}

impl ListenerTask {
    async fn run(mut self) {
        let delay = Duration::from_millis(self.config.reconnect_delay_ms);
        loop {
            match self.session().await {
                Ok(SessionEnd::Stopped) => {
                    tracing::info!("Subscriber shutting down");
                    return;
                }
                Ok(SessionEnd::Disconnected) => {
                    tracing::warn!("Pub/Sub connection closed, reconnecting");
                }
                Err(e) => {
                    tracing::error!(error = %e, "Pub/Sub connection failed, reconnecting");
                }
            }
            tokio::time::sleep(delay).await;
        }
    }

    /// Serve one Redis connection
    async fn session(&mut self) -> SubscriberResult<SessionEnd> {
        let client = Client::open(self.config.redis_url.as_str())?;
        let mut pubsub = client.get_async_pubsub().await?;

        let rejoin: Vec<String> = self.channels.read().await.iter().cloned().collect();
        for channel in &rejoin {
            pubsub.subscribe(channel).await?;
        }
        tracing::info!(
            url = %redact_url(&self.config.redis_url),
            channels = rejoin.len(),
            "Subscriber connected to Redis"
        );

        loop {
            // The message stream borrows the connection, so it is rebuilt
            // after every command that changes the channel set.
            let command = {
                let mut stream = pubsub.on_message();
                loop {
                    tokio::select! {
                        msg = stream.next() => {
                            let Some(msg) = msg else {
                                return Ok(SessionEnd::Disconnected);
                            };
                            let channel = msg.get_channel_name().to_string();
                            let payload: String = msg.get_payload().unwrap_or_default();
                            tracing::trace!(channel = %channel, "Pub/Sub message");
                            // Nobody listening locally is fine
                            let _ = self.events.send(ReceivedMessage::from_redis(&channel, payload));
                        }
                        cmd = self.commands.recv() => break cmd,
                    }
                }
            };

            match command {
                Some(Command::Join(names)) => self.join(&mut pubsub, names).await,
                Some(Command::Leave(names)) => self.leave(&mut pubsub, names).await,
                Some(Command::Stop) | None => return Ok(SessionEnd::Stopped),
            }
        }
    }

    async fn join(&self, pubsub: &mut PubSub, names: Vec<String>) {
        for name in names {
            match pubsub.subscribe(&name).await {
                Ok(()) => {
                    tracing::debug!(channel = %name, "Joined channel");
                    self.channels.write().await.insert(name);
                }
                Err(e) => tracing::error!(channel = %name, error = %e, "Failed to join channel"),
            }
        }
    }

    async fn leave(&self, pubsub: &mut PubSub, names: Vec<String>) {
        for name in names {
            match pubsub.unsubscribe(&name).await {
                Ok(()) => {
                    tracing::debug!(channel = %name, "Left channel");
                    self.channels.write().await.remove(&name);
                }
                Err(e) => tracing::error!(channel = %name, error = %e, "Failed to leave channel"),
            }
        }
    }
}

/// Builds a [`Subscriber`] that starts with a set of channels
#[derive(Default)]
pub struct SubscriberBuilder {
    config: SubscriberConfig,
    initial_channels: Vec<PubSubChannel>,
}

impl SubscriberBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn redis_url(mut self, url: impl Into<String>) -> Self {
        self.config.redis_url = url.into();
        self
    }

    #[must_use]
    pub fn broadcast_buffer(mut self, size: usize) -> Self {
        self.config.broadcast_buffer = size;
        self
    }

    #[must_use]
    pub fn reconnect_delay_ms(mut self, delay: u64) -> Self {
        self.config.reconnect_delay_ms = delay;
        self
    }

    #[must_use]
    pub fn subscribe(mut self, channel: PubSubChannel) -> Self {
        self.initial_channels.push(channel);
        self
    }

    pub async fn build(self) -> SubscriberResult<Subscriber> {
        let subscriber = Subscriber::new(self.config);
        if !self.initial_channels.is_empty() {
            subscriber.subscribe(&self.initial_channels).await?;
        }
        Ok(subscriber)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_thread_event_is_decoded() {
        let thread_id = Uuid::new_v4();
        let payload = r#"{"event_type":"INSERT","data":{}}"#.to_string();
        let msg = ReceivedMessage::from_redis(&format!("thread:{thread_id}"), payload.clone());

        assert_eq!(msg.channel, PubSubChannel::Thread(thread_id));
        assert_eq!(msg.event.map(|e| e.event_type), Some("INSERT".to_string()));
        assert_eq!(msg.payload, payload);
    }

    #[test]
    fn test_undecodable_payload_is_kept_raw() {
        let msg = ReceivedMessage::from_redis("broadcast", "invalid".to_string());

        assert_eq!(msg.channel, PubSubChannel::Broadcast);
        assert!(msg.event.is_none());
        assert_eq!(msg.payload, "invalid");
    }

    #[test]
    fn test_builder_overrides_defaults() {
        let defaults = SubscriberConfig::default();
        assert_eq!(defaults.broadcast_buffer, 1024);
        assert_eq!(defaults.reconnect_delay_ms, 1000);

        let property = Uuid::new_v4();
        let builder = SubscriberBuilder::new()
            .redis_url("redis://localhost:6380")
            .broadcast_buffer(2048)
            .reconnect_delay_ms(500)
            .subscribe(PubSubChannel::property(property));

        assert_eq!(builder.config.redis_url, "redis://localhost:6380");
        assert_eq!(builder.config.broadcast_buffer, 2048);
        assert_eq!(builder.config.reconnect_delay_ms, 500);
        assert_eq!(builder.initial_channels, vec![PubSubChannel::Property(property)]);
    }
}

//! Redis Pub/Sub module.
//!
//! Provides publish/subscribe functionality for realtime message fan-out between the API and the gateway.

mod channels;
mod publisher;
mod subscriber;

pub use channels::{PubSubChannel, BROADCAST_CHANNEL, PROPERTY_CHANNEL_PREFIX, THREAD_CHANNEL_PREFIX};
pub use publisher::{PubSubEvent, Publisher};
pub use subscriber::{
    ReceivedMessage, Subscriber, SubscriberBuilder, SubscriberConfig, SubscriberError,
    SubscriberResult,
};

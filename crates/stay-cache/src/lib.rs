//! # stay-cache
//!
//! Redis layer for distributing chat events between the API processes and
//! the realtime gateway.
//!
//! ## Features
//!
//! - **Connection Pool**: Managed Redis connection pool with deadpool
//! - **Pub/Sub**: `thread:{id}` and `property:{id}` channels carrying
//!   message `INSERT`/`UPDATE` events
//!
//! ## Example
//!
//! ```ignore
//! use stay_cache::{Publisher, RedisPool, RedisPoolConfig};
//! use stay_core::MessageEvent;
//!
//! let pool = RedisPool::new(RedisPoolConfig::default())?;
//! let publisher = Publisher::new(pool);
//!
//! publisher
//!     .publish_message_event(property_id, &MessageEvent::inserted(&message))
//!     .await?;
//! ```

pub mod pool;
pub mod pubsub;

// Re-export pool types
pub use pool::{RedisPool, RedisPoolConfig, RedisPoolError, RedisResult};

// Re-export pubsub types
pub use pubsub::{
    PubSubChannel, PubSubEvent, Publisher, ReceivedMessage, Subscriber, SubscriberBuilder,
    SubscriberConfig, SubscriberError, SubscriberResult, BROADCAST_CHANNEL,
    PROPERTY_CHANNEL_PREFIX, THREAD_CHANNEL_PREFIX,
};

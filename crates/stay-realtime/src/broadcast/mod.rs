//! Event broadcasting
//!
//! Forwards message events from Redis Pub/Sub to subscribed sockets.

mod dispatcher;

pub use dispatcher::{route_message, EventDispatcher, EventDispatcherConfig};

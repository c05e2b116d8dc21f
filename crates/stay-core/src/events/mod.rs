//! Realtime change events

mod message_event;

pub use message_event::{MessageEvent, MessageRecord};

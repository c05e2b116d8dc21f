//! Gateway events
//!
//! Dispatch events sent by the gateway to clients.

mod event_types;
mod payloads;

pub use event_types::GatewayEventType;
pub use payloads::{ReadyEvent, SessionRole};

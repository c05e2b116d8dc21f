//! # stay-realtime
//!
//! WebSocket gateway for guest chat. Clients identify with a portal token
//! or a staff bearer token, subscribe to message threads and receive every
//! message `INSERT`/`UPDATE` published to Redis for those threads.
//!
//! [`client::ChatClient`] is the matching client: it drives a
//! [`stay_core::chat::ChatSession`] over this gateway and the REST API.

pub mod broadcast;
pub mod client;
pub mod connection;
pub mod events;
pub mod handlers;
pub mod protocol;
pub mod server;

pub use server::{create_app, create_gateway_state, run, GatewayState};

//! Connection management
//!
//! Tracks live sockets, who they belong to and which threads they follow.

mod connection;
mod manager;

pub use connection::{generate_session_id, Connection, ConnectionState, Identity};
pub use manager::ConnectionManager;

//! Guest chat client
//!
//! Loads history and posts over the REST API, receives confirmations and
//! host messages over the gateway, and reconciles both streams in a
//! [`ChatSession`](stay_core::chat::ChatSession).

mod chat_client;
mod error;

pub use chat_client::{apply_frame, ChatClient, ChatClientConfig};
pub use error::{ClientError, ClientResult};

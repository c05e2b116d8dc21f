//! Guest chat reconciliation
//!
//! Client-side view of a thread: optimistic local echo for outgoing
//! messages merged with rows confirmed by the REST response or pushed by
//! the realtime channel, whichever arrives first.

mod session;

pub use session::{
    Applied, ChatEntry, ChatSession, ConnectionState, EntryStatus, DEFAULT_MATCH_WINDOW_SECS,
};

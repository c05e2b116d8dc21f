//! Dispatch event payloads

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who is on the other end of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionRole {
    Guest,
    Staff,
}

/// READY event payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadyEvent {
    /// Gateway protocol version
    pub v: u32,
    pub session_id: String,
    pub role: SessionRole,
    /// Staff user id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
    /// Guest reservation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reservation_id: Option<Uuid>,
    /// Guest thread; guests are subscribed to it on Identify
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<Uuid>,
}

impl ReadyEvent {
    pub const VERSION: u32 = 1;
}

//! Route handlers
//!
//! HTTP handlers grouped by area: the admin dashboard API, the guest portal
//! and inbound webhooks.

pub mod automation;
pub mod chat;
pub mod cleaning;
pub mod guest;
pub mod health;
pub mod properties;
pub mod reservations;
pub mod rooms;
pub mod services;
pub mod users;
pub mod webhooks;

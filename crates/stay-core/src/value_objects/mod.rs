//! Value objects - small validated types shared across entities

mod capabilities;
mod guest_token;

pub use capabilities::Capabilities;
pub use guest_token::{GuestToken, MAX_TOKEN_LEN, MIN_TOKEN_LEN};

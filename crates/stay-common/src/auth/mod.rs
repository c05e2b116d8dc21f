//! Authentication utilities

mod jwt;
mod tokens;

pub use jwt::{Claims, JwtService};
pub use tokens::{generate_guest_token, secrets_match, GUEST_TOKEN_BYTES};

//! Axum extractors for request handling
//!
//! Custom extractors for authentication, guest tokens, validation and
//! pagination. Every rejection is an [`ApiError`](crate::response::ApiError).

mod auth;
mod guest;
mod pagination;
mod path;
mod validated;

pub use auth::AdminUser;
pub use guest::GuestTokenPath;
pub use pagination::{Pagination, PaginationParams, QueryParams};
pub use path::IdPath;
pub use validated::{JsonBody, ValidatedJson};

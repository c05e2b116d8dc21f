//! # stay-api
//!
//! REST API server built with Axum: the admin dashboard API, the token-based
//! guest portal and the Beds24 booking webhook. The process also runs the
//! scheduled-message dispatcher.

pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod server;
pub mod state;

pub use server::{create_app, create_app_state, run};
pub use state::AppState;

//! Integration test utilities for the stay platform
//!
//! Helpers for running end-to-end tests against the REST API and the
//! realtime gateway.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;

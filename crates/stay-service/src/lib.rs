//! # stay-service
//!
//! Application layer containing business logic, services, DTOs and the
//! background message dispatcher.

pub mod dto;
pub mod services;
pub mod workers;

pub use services::{ServiceContext, ServiceContextBuilder, ServiceError, ServiceResult};
pub use workers::MessageDispatcher;

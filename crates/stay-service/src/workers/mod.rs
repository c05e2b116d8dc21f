//! Background workers

pub mod dispatcher;

pub use dispatcher::{DispatchSummary, MessageDispatcher};

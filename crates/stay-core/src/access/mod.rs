//! Room access unlock gate for the guest portal

mod gate;

pub use gate::{AccessGate, AccessState, LockReason};

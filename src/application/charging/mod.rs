//! Charging sessions

pub mod service;

pub use service::{ChargingService, ClosedSession};

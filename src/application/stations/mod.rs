//! Station and charger use-cases

pub mod service;

pub use service::{ConsumptionReport, StationAvailability, StationService};

//! Maintenance scheduling

pub mod service;

pub use service::{MaintenanceService, ScheduleMaintenance};

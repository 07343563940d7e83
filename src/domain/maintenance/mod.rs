//! Maintenance aggregate

pub mod model;
pub mod repository;

pub use model::{MaintenanceKind, MaintenanceRecord, MaintenanceStatus};
pub use repository::MaintenanceRepository;

//! Domain layer: entities, pricing rules and repository interfaces

pub mod billing;
pub mod charger;
pub mod maintenance;
pub mod repositories;
pub mod session;
pub mod station;
pub mod user;

pub use billing::SessionCharge;
pub use charger::{Charger, ChargerStatus, ChargerType};
pub use maintenance::{MaintenanceKind, MaintenanceRecord, MaintenanceStatus};
pub use repositories::RepositoryProvider;
pub use session::ChargingSession;
pub use station::Station;
pub use user::{User, UserRole};

pub use crate::shared::{DomainError, DomainResult};

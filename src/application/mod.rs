//! Application layer: use-case services over the domain repositories

pub mod authorization;
pub mod charging;
pub mod identity;
pub mod maintenance;
pub mod stations;

pub use authorization::{authorize, Action, Authenticator, Principal};
pub use charging::{ChargingService, ClosedSession};
pub use identity::{AccountPolicy, AuthResult, Recharge, Registration, UserService};
pub use maintenance::{MaintenanceService, ScheduleMaintenance};
pub use stations::{ConsumptionReport, StationAvailability, StationService};

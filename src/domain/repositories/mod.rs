//! Repository access for the domain layer
//!
//! Services depend on `RepositoryProvider` and ask it for the one
//! aggregate repository they need:
//!
//! ```ignore
//! async fn handle(repos: &dyn RepositoryProvider) {
//!     let station = repos.stations().find_by_id(1).await?;
//!     let open = repos.sessions().find_open_by_user(user_id).await?;
//! }
//! ```

use super::charger::ChargerRepository;
use super::maintenance::MaintenanceRepository;
use super::session::SessionRepository;
use super::station::StationRepository;
use super::user::UserRepository;

pub trait RepositoryProvider: Send + Sync {
    fn users(&self) -> &dyn UserRepository;
    fn stations(&self) -> &dyn StationRepository;
    fn chargers(&self) -> &dyn ChargerRepository;
    fn sessions(&self) -> &dyn SessionRepository;
    fn maintenance(&self) -> &dyn MaintenanceRepository;
}

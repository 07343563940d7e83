//! Charging session repository interface

use async_trait::async_trait;
use uuid::Uuid;

use super::model::ChargingSession;
use crate::shared::DomainResult;

#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Store a new open session. Fails with `Conflict` if the user already
    /// has one open.
    async fn open(&self, session: ChargingSession) -> DomainResult<()>;

    /// Persist a closed session and drop it from the open index.
    async fn close(&self, session: ChargingSession) -> DomainResult<()>;

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<ChargingSession>>;
    async fn find_open_by_user(&self, user_id: Uuid) -> DomainResult<Option<ChargingSession>>;
    /// Newest first
    async fn find_by_user(&self, user_id: Uuid) -> DomainResult<Vec<ChargingSession>>;
    async fn find_by_station(&self, station_id: u32) -> DomainResult<Vec<ChargingSession>>;
}

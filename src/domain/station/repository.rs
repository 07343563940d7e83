//! Station repository interface

use async_trait::async_trait;

use super::model::Station;
use crate::shared::DomainResult;

#[async_trait]
pub trait StationRepository: Send + Sync {
    /// Fails with `Conflict` when the id is already used.
    async fn insert(&self, station: Station) -> DomainResult<()>;
    async fn find_by_id(&self, id: u32) -> DomainResult<Option<Station>>;
    /// All stations ordered by id
    async fn find_all(&self) -> DomainResult<Vec<Station>>;
    async fn attach_charger(&self, station_id: u32, charger_id: u32) -> DomainResult<()>;
    async fn delete(&self, id: u32) -> DomainResult<Station>;
}

//! Charger repository interface

use async_trait::async_trait;

use super::model::{Charger, ChargerStatus};
use crate::shared::DomainResult;

#[async_trait]
pub trait ChargerRepository: Send + Sync {
    /// Fails with `Conflict` when the id is already used by any station.
    async fn insert(&self, charger: Charger) -> DomainResult<()>;
    async fn find_by_id(&self, id: u32) -> DomainResult<Option<Charger>>;
    /// All chargers ordered by id
    async fn find_all(&self) -> DomainResult<Vec<Charger>>;
    async fn find_by_station(&self, station_id: u32) -> DomainResult<Vec<Charger>>;

    /// Atomically move the charger from `expected` to `next`.
    /// Returns `false` without touching it if the current status differs.
    async fn compare_and_set_status(
        &self,
        id: u32,
        expected: ChargerStatus,
        next: ChargerStatus,
    ) -> DomainResult<bool>;

    async fn set_status(&self, id: u32, status: ChargerStatus) -> DomainResult<()>;
    async fn delete(&self, id: u32) -> DomainResult<()>;
}

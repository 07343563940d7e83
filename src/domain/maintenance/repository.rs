//! Maintenance repository interface

use async_trait::async_trait;

use super::model::MaintenanceRecord;
use crate::shared::DomainResult;

#[async_trait]
pub trait MaintenanceRepository: Send + Sync {
    /// Next server-assigned record id
    fn next_id(&self) -> u32;
    async fn insert(&self, record: MaintenanceRecord) -> DomainResult<()>;
    async fn update(&self, record: MaintenanceRecord) -> DomainResult<()>;
    async fn find_by_id(&self, id: u32) -> DomainResult<Option<MaintenanceRecord>>;
    /// Ordered by id, optionally restricted to one station
    async fn find_all(&self, station_id: Option<u32>) -> DomainResult<Vec<MaintenanceRecord>>;
}

//! Maintenance scheduling and its effect on charger availability

use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::application::authorization::{authorize, Action, Principal};
use crate::domain::{
    ChargerStatus, DomainError, DomainResult, MaintenanceKind, MaintenanceRecord,
    MaintenanceStatus, RepositoryProvider,
};
use crate::shared::time::SharedClock;

/// Input for [`MaintenanceService::schedule`]
#[derive(Debug, Clone)]
pub struct ScheduleMaintenance {
    pub station_id: u32,
    pub charger_id: Option<u32>,
    pub kind: MaintenanceKind,
    pub scheduled_for: NaiveDate,
    pub technician: Option<String>,
    pub notes: Option<String>,
}

pub struct MaintenanceService {
    repos: Arc<dyn RepositoryProvider>,
    clock: SharedClock,
    /// Serialises state transitions
    transitions: Mutex<()>,
}

impl MaintenanceService {
    pub fn new(repos: Arc<dyn RepositoryProvider>, clock: SharedClock) -> Self {
        Self {
            repos,
            clock,
            transitions: Mutex::new(()),
        }
    }

    pub async fn schedule(
        &self,
        principal: &Principal,
        request: ScheduleMaintenance,
    ) -> DomainResult<MaintenanceRecord> {
        authorize(principal, Action::ManageMaintenance)?;

        let station = self
            .repos
            .stations()
            .find_by_id(request.station_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Station", "id", request.station_id))?;

        if let Some(charger_id) = request.charger_id {
            if !station.has_charger(charger_id) {
                return Err(DomainError::Validation(format!(
                    "charger {} does not belong to station {}",
                    charger_id, station.id
                )));
            }
        }

        let record = MaintenanceRecord {
            id: self.repos.maintenance().next_id(),
            station_id: station.id,
            charger_id: request.charger_id,
            kind: request.kind,
            status: MaintenanceStatus::Scheduled,
            scheduled_for: request.scheduled_for,
            technician: request.technician,
            notes: request.notes,
            created_at: self.clock.now(),
            started_at: None,
            completed_at: None,
        };
        self.repos.maintenance().insert(record.clone()).await?;

        info!(
            maintenance_id = record.id,
            station_id = record.station_id,
            charger_id = ?record.charger_id,
            kind = record.kind.label(),
            scheduled_for = %record.scheduled_for,
            "Maintenance scheduled"
        );
        Ok(record)
    }

    pub async fn list(
        &self,
        principal: &Principal,
        station_id: Option<u32>,
    ) -> DomainResult<Vec<MaintenanceRecord>> {
        authorize(principal, Action::ManageMaintenance)?;
        self.repos.maintenance().find_all(station_id).await
    }

    pub async fn get(&self, principal: &Principal, id: u32) -> DomainResult<MaintenanceRecord> {
        authorize(principal, Action::ManageMaintenance)?;
        self.load(id).await
    }

    /// Scheduled -> InProgress. A targeted charger goes out of service;
    /// an occupied one blocks the start.
    pub async fn start(&self, principal: &Principal, id: u32) -> DomainResult<MaintenanceRecord> {
        authorize(principal, Action::ManageMaintenance)?;
        let _guard = self.transitions.lock().await;

        let mut record = self.load(id).await?;
        record.start(self.clock.now())?;

        if let Some(charger_id) = record.charger_id {
            self.take_out_of_service(charger_id).await?;
        }
        self.repos.maintenance().update(record.clone()).await?;

        info!(maintenance_id = id, charger_id = ?record.charger_id, "Maintenance started");
        Ok(record)
    }

    /// InProgress -> Completed. The charger returns to service unless other
    /// work on it is still in progress.
    pub async fn complete(
        &self,
        principal: &Principal,
        id: u32,
        notes: Option<String>,
    ) -> DomainResult<MaintenanceRecord> {
        authorize(principal, Action::ManageMaintenance)?;
        let _guard = self.transitions.lock().await;

        let mut record = self.load(id).await?;
        record.complete(self.clock.now(), notes)?;
        self.repos.maintenance().update(record.clone()).await?;

        if let Some(charger_id) = record.charger_id {
            let still_busy = self
                .repos
                .maintenance()
                .find_all(Some(record.station_id))
                .await?
                .iter()
                .any(|r| r.charger_id == Some(charger_id) && r.status == MaintenanceStatus::InProgress);

            if !still_busy {
                match self
                    .repos
                    .chargers()
                    .set_status(charger_id, ChargerStatus::Available)
                    .await
                {
                    Ok(()) => {}
                    Err(DomainError::NotFound { .. }) => {
                        warn!(maintenance_id = id, charger_id, "Charger no longer exists");
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        info!(maintenance_id = id, charger_id = ?record.charger_id, "Maintenance completed");
        Ok(record)
    }

    async fn take_out_of_service(&self, charger_id: u32) -> DomainResult<()> {
        let chargers = self.repos.chargers();
        if chargers
            .compare_and_set_status(charger_id, ChargerStatus::Available, ChargerStatus::UnderMaintenance)
            .await?
        {
            return Ok(());
        }

        let charger = chargers
            .find_by_id(charger_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Charger", "id", charger_id))?;
        match charger.status {
            ChargerStatus::UnderMaintenance => Ok(()),
            status => Err(DomainError::Conflict(format!(
                "charger {} is {}",
                charger_id, status
            ))),
        }
    }

    async fn load(&self, id: u32) -> DomainResult<MaintenanceRecord> {
        self.repos
            .maintenance()
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Maintenance", "id", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Charger, ChargerType, Station, UserRole};
    use crate::infrastructure::InMemoryRepositoryProvider;
    use crate::shared::time::SystemClock;
    use uuid::Uuid;

    fn admin() -> Principal {
        Principal::new(Uuid::new_v4(), UserRole::Admin)
    }

    async fn setup() -> (Arc<dyn RepositoryProvider>, MaintenanceService) {
        let repos = InMemoryRepositoryProvider::shared();
        repos.stations().insert(Station::new(1, "Este", "Ruta 8")).await.unwrap();
        for id in [10, 11] {
            repos.chargers().insert(Charger::new(id, ChargerType::Normal, 1)).await.unwrap();
            repos.stations().attach_charger(1, id).await.unwrap();
        }
        let svc = MaintenanceService::new(repos.clone(), Arc::new(SystemClock));
        (repos, svc)
    }

    fn request(charger_id: Option<u32>) -> ScheduleMaintenance {
        ScheduleMaintenance {
            station_id: 1,
            charger_id,
            kind: MaintenanceKind::preventive("monthly").unwrap(),
            scheduled_for: NaiveDate::from_ymd_opt(2026, 11, 2).unwrap(),
            technician: Some("Rosa".into()),
            notes: None,
        }
    }

    async fn status(repos: &Arc<dyn RepositoryProvider>, id: u32) -> ChargerStatus {
        repos.chargers().find_by_id(id).await.unwrap().unwrap().status
    }

    #[tokio::test]
    async fn lifecycle_toggles_charger() {
        let (repos, svc) = setup().await;
        let a = admin();
        let record = svc.schedule(&a, request(Some(10))).await.unwrap();
        assert_eq!(record.status, MaintenanceStatus::Scheduled);
        assert_eq!(status(&repos, 10).await, ChargerStatus::Available);

        svc.start(&a, record.id).await.unwrap();
        assert_eq!(status(&repos, 10).await, ChargerStatus::UnderMaintenance);

        let done = svc.complete(&a, record.id, Some("ok".into())).await.unwrap();
        assert_eq!(done.status, MaintenanceStatus::Completed);
        assert_eq!(status(&repos, 10).await, ChargerStatus::Available);
    }

    #[tokio::test]
    async fn out_of_order_transitions_conflict() {
        let (_repos, svc) = setup().await;
        let a = admin();
        let record = svc.schedule(&a, request(None)).await.unwrap();

        assert!(matches!(svc.complete(&a, record.id, None).await, Err(DomainError::Conflict(_))));
        svc.start(&a, record.id).await.unwrap();
        assert!(matches!(svc.start(&a, record.id).await, Err(DomainError::Conflict(_))));
        assert!(matches!(svc.start(&a, 999).await, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn occupied_charger_blocks_start() {
        let (repos, svc) = setup().await;
        let a = admin();
        repos.chargers().set_status(11, ChargerStatus::Occupied).await.unwrap();
        let record = svc.schedule(&a, request(Some(11))).await.unwrap();

        assert!(matches!(svc.start(&a, record.id).await, Err(DomainError::Conflict(_))));
        let unchanged = svc.get(&a, record.id).await.unwrap();
        assert_eq!(unchanged.status, MaintenanceStatus::Scheduled);
        assert_eq!(status(&repos, 11).await, ChargerStatus::Occupied);
    }

    #[tokio::test]
    async fn station_level_work_leaves_chargers_alone() {
        let (repos, svc) = setup().await;
        let a = admin();
        let record = svc.schedule(&a, request(None)).await.unwrap();
        svc.start(&a, record.id).await.unwrap();
        assert_eq!(status(&repos, 10).await, ChargerStatus::Available);
        assert_eq!(status(&repos, 11).await, ChargerStatus::Available);
    }

    #[tokio::test]
    async fn schedule_validates_targets_and_role() {
        let (_repos, svc) = setup().await;
        let a = admin();

        let mut foreign = request(Some(99));
        assert!(matches!(svc.schedule(&a, foreign.clone()).await, Err(DomainError::Validation(_))));
        foreign.station_id = 5;
        assert!(matches!(svc.schedule(&a, foreign).await, Err(DomainError::NotFound { .. })));

        let user = Principal::new(Uuid::new_v4(), UserRole::Company);
        assert!(matches!(svc.schedule(&user, request(None)).await, Err(DomainError::Forbidden(_))));
        assert!(matches!(svc.list(&user, None).await, Err(DomainError::Forbidden(_))));
    }

    #[tokio::test]
    async fn overlapping_work_keeps_charger_down_until_last_completes() {
        let (repos, svc) = setup().await;
        let a = admin();
        let first = svc.schedule(&a, request(Some(10))).await.unwrap();
        let second = svc.schedule(&a, request(Some(10))).await.unwrap();
        assert!(second.id > first.id);

        svc.start(&a, first.id).await.unwrap();
        svc.start(&a, second.id).await.unwrap();
        svc.complete(&a, first.id, None).await.unwrap();
        assert_eq!(status(&repos, 10).await, ChargerStatus::UnderMaintenance);

        svc.complete(&a, second.id, None).await.unwrap();
        assert_eq!(status(&repos, 10).await, ChargerStatus::Available);

        assert_eq!(svc.list(&a, Some(1)).await.unwrap().len(), 2);
        assert!(svc.list(&a, Some(2)).await.unwrap().is_empty());
    }
}

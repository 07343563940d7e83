//! Station and charger management, availability and consumption reports

use std::sync::Arc;

use rust_decimal::{Decimal, RoundingStrategy};
use tracing::{info, warn};

use crate::application::authorization::{authorize, Action, Principal};
use crate::domain::{
    Charger, ChargerStatus, ChargerType, DomainError, DomainResult, RepositoryProvider, Station,
};

/// Charger counts for one station
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationAvailability {
    pub station_id: u32,
    pub total: usize,
    pub available: usize,
    pub occupied: usize,
    pub under_maintenance: usize,
    /// Share of available chargers, 0-100 with two decimals
    pub availability_pct: Decimal,
}

/// Energy and revenue of sessions at one station
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumptionReport {
    pub station_id: u32,
    pub total_sessions: usize,
    pub open_sessions: usize,
    pub total_energy_kwh: Decimal,
    pub total_revenue: Decimal,
}

pub struct StationService {
    repos: Arc<dyn RepositoryProvider>,
}

impl StationService {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }

    // ── Stations ────────────────────────────────────────────────

    pub async fn create_station(
        &self,
        principal: &Principal,
        id: u32,
        name: &str,
        location: &str,
    ) -> DomainResult<Station> {
        authorize(principal, Action::ManageStations)?;
        if name.trim().is_empty() || location.trim().is_empty() {
            return Err(DomainError::Validation(
                "Station name and location are required".into(),
            ));
        }

        let station = Station::new(id, name.trim(), location.trim());
        self.repos.stations().insert(station.clone()).await?;
        info!(station_id = id, name = %station.name, "Station created");
        Ok(station)
    }

    pub async fn list_stations(&self) -> DomainResult<Vec<Station>> {
        self.repos.stations().find_all().await
    }

    pub async fn get_station(&self, id: u32) -> DomainResult<Station> {
        self.repos
            .stations()
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Station", "id", id))
    }

    /// Delete a station together with its chargers. Refused while any of
    /// them is occupied or under maintenance. Sessions and maintenance
    /// records referencing the station are kept.
    pub async fn delete_station(&self, principal: &Principal, id: u32) -> DomainResult<Station> {
        authorize(principal, Action::ManageStations)?;
        let station = self.get_station(id).await?;
        let chargers = self.repos.chargers();

        // Take every charger out of service first so no session can claim
        // one while the station is being removed.
        let mut reserved = Vec::with_capacity(station.charger_ids.len());
        for &charger_id in &station.charger_ids {
            let taken = match chargers
                .compare_and_set_status(
                    charger_id,
                    ChargerStatus::Available,
                    ChargerStatus::UnderMaintenance,
                )
                .await
            {
                Ok(taken) => taken,
                Err(DomainError::NotFound { .. }) => continue,
                Err(e) => {
                    self.release(&reserved).await;
                    return Err(e);
                }
            };
            if !taken {
                self.release(&reserved).await;
                return Err(DomainError::Conflict(format!(
                    "station {} has charger {} in use",
                    id, charger_id
                )));
            }
            reserved.push(charger_id);
        }

        let station = self.repos.stations().delete(id).await?;

        // Chargers attached after the list above was read are not in
        // `reserved`; sweep by station id so none outlive the station.
        let mut removed = 0;
        for charger in chargers.find_by_station(id).await? {
            match chargers.delete(charger.id).await {
                Ok(()) => removed += 1,
                Err(DomainError::NotFound { .. }) => {}
                Err(e) => return Err(e),
            }
            if !reserved.contains(&charger.id) {
                warn!(
                    station_id = id,
                    charger_id = charger.id,
                    "Removed charger added during delete"
                );
            }
        }

        info!(station_id = id, chargers = removed, "Station deleted");
        Ok(station)
    }

    async fn release(&self, charger_ids: &[u32]) {
        for &charger_id in charger_ids {
            if let Err(e) = self
                .repos
                .chargers()
                .set_status(charger_id, ChargerStatus::Available)
                .await
            {
                warn!(charger_id, error = %e, "Failed to release charger");
            }
        }
    }

    // ── Chargers ────────────────────────────────────────────────

    pub async fn add_charger(
        &self,
        principal: &Principal,
        station_id: u32,
        charger_id: u32,
        kind: ChargerType,
    ) -> DomainResult<Charger> {
        authorize(principal, Action::ManageChargers)?;
        self.get_station(station_id).await?;

        let charger = Charger::new(charger_id, kind, station_id);
        self.repos.chargers().insert(charger.clone()).await?;
        if let Err(e) = self.repos.stations().attach_charger(station_id, charger_id).await {
            match self.repos.chargers().delete(charger_id).await {
                Ok(()) | Err(DomainError::NotFound { .. }) => {}
                Err(cleanup) => warn!(charger_id, error = %cleanup, "Failed to roll back charger"),
            }
            return Err(e);
        }

        info!(station_id, charger_id, kind = %kind, "Charger added");
        Ok(charger)
    }

    pub async fn list_chargers(&self, station_id: Option<u32>) -> DomainResult<Vec<Charger>> {
        match station_id {
            Some(id) => {
                self.get_station(id).await?;
                self.repos.chargers().find_by_station(id).await
            }
            None => self.repos.chargers().find_all().await,
        }
    }

    pub async fn get_charger(&self, id: u32) -> DomainResult<Charger> {
        self.repos
            .chargers()
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Charger", "id", id))
    }

    // ── Reports ─────────────────────────────────────────────────

    pub async fn availability(&self, station_id: u32) -> DomainResult<StationAvailability> {
        self.get_station(station_id).await?;
        let chargers = self.repos.chargers().find_by_station(station_id).await?;

        let count = |status: ChargerStatus| chargers.iter().filter(|c| c.status == status).count();
        let total = chargers.len();
        let available = count(ChargerStatus::Available);

        let availability_pct = if total == 0 {
            Decimal::ZERO
        } else {
            (Decimal::from(available as u64) * Decimal::ONE_HUNDRED / Decimal::from(total as u64))
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        };

        Ok(StationAvailability {
            station_id,
            total,
            available,
            occupied: count(ChargerStatus::Occupied),
            under_maintenance: count(ChargerStatus::UnderMaintenance),
            availability_pct,
        })
    }

    pub async fn consumption_report(
        &self,
        principal: &Principal,
        station_id: u32,
    ) -> DomainResult<ConsumptionReport> {
        authorize(principal, Action::ViewConsumptionReport)?;
        self.get_station(station_id).await?;
        let sessions = self.repos.sessions().find_by_station(station_id).await?;

        let open_sessions = sessions.iter().filter(|s| s.is_open()).count();
        let total_energy_kwh: Decimal = sessions.iter().filter_map(|s| s.energy_kwh).sum();
        let total_revenue: Decimal = sessions.iter().filter_map(|s| s.cost).sum();

        Ok(ConsumptionReport {
            station_id,
            total_sessions: sessions.len(),
            open_sessions,
            total_energy_kwh,
            total_revenue,
        })
    }
}

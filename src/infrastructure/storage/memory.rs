//! In-memory repositories backed by `DashMap`
//!
//! Multi-step invariants (unique email, one open session per user, charger
//! claiming) are enforced while holding the relevant map entry, so they
//! hold under concurrent requests.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::charger::ChargerRepository;
use crate::domain::maintenance::MaintenanceRepository;
use crate::domain::session::SessionRepository;
use crate::domain::station::StationRepository;
use crate::domain::user::{normalize_email, UserRepository};
use crate::domain::{
    Charger, ChargerStatus, ChargingSession, DomainError, DomainResult, MaintenanceRecord,
    RepositoryProvider, Station, User,
};

// ── Users ──────────────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: DashMap<Uuid, User>,
    /// lowercase email -> user id
    emails: DashMap<String, Uuid>,
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, user: User) -> DomainResult<()> {
        match self.emails.entry(normalize_email(&user.email)) {
            Entry::Occupied(e) => Err(DomainError::Conflict(format!("email {}", e.key()))),
            Entry::Vacant(e) => {
                e.insert(user.id);
                self.users.insert(user.id, user);
                Ok(())
            }
        }
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<User>> {
        Ok(self.users.get(&id).map(|u| u.clone()))
    }

    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        let id = match self.emails.get(&normalize_email(email)) {
            Some(id) => *id,
            None => return Ok(None),
        };
        Ok(self.users.get(&id).map(|u| u.clone()))
    }

    async fn find_all(&self) -> DomainResult<Vec<User>> {
        let mut users: Vec<User> = self.users.iter().map(|e| e.value().clone()).collect();
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.email.cmp(&b.email)));
        Ok(users)
    }

    async fn has_admin(&self) -> DomainResult<bool> {
        Ok(self.users.iter().any(|e| e.role.is_admin()))
    }

    async fn credit(&self, id: Uuid, amount: Decimal) -> DomainResult<User> {
        let mut user = self
            .users
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found("User", "id", id))?;
        let balance = user
            .balance
            .checked_add(amount)
            .ok_or_else(|| DomainError::Validation("Balance would overflow".into()))?;
        user.balance = balance;
        Ok(user.clone())
    }

    async fn debit(&self, id: Uuid, amount: Decimal) -> DomainResult<User> {
        let mut user = self
            .users
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found("User", "id", id))?;
        if !user.has_balance_for(amount) {
            return Err(DomainError::InsufficientBalance {
                required: amount,
                available: user.balance,
            });
        }
        user.balance -= amount;
        Ok(user.clone())
    }
}

// ── Stations ───────────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryStationRepository {
    stations: DashMap<u32, Station>,
}

#[async_trait]
impl StationRepository for InMemoryStationRepository {
    async fn insert(&self, station: Station) -> DomainResult<()> {
        match self.stations.entry(station.id) {
            Entry::Occupied(_) => Err(DomainError::Conflict(format!("station {}", station.id))),
            Entry::Vacant(e) => {
                e.insert(station);
                Ok(())
            }
        }
    }

    async fn find_by_id(&self, id: u32) -> DomainResult<Option<Station>> {
        Ok(self.stations.get(&id).map(|s| s.clone()))
    }

    async fn find_all(&self) -> DomainResult<Vec<Station>> {
        let mut stations: Vec<Station> = self.stations.iter().map(|e| e.value().clone()).collect();
        stations.sort_by_key(|s| s.id);
        Ok(stations)
    }

    async fn attach_charger(&self, station_id: u32, charger_id: u32) -> DomainResult<()> {
        let mut station = self
            .stations
            .get_mut(&station_id)
            .ok_or_else(|| DomainError::not_found("Station", "id", station_id))?;
        if !station.has_charger(charger_id) {
            station.charger_ids.push(charger_id);
        }
        Ok(())
    }

    async fn delete(&self, id: u32) -> DomainResult<Station> {
        self.stations
            .remove(&id)
            .map(|(_, station)| station)
            .ok_or_else(|| DomainError::not_found("Station", "id", id))
    }
}

// ── Chargers ───────────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryChargerRepository {
    chargers: DashMap<u32, Charger>,
}

#[async_trait]
impl ChargerRepository for InMemoryChargerRepository {
    async fn insert(&self, charger: Charger) -> DomainResult<()> {
        match self.chargers.entry(charger.id) {
            Entry::Occupied(_) => Err(DomainError::Conflict(format!("charger {}", charger.id))),
            Entry::Vacant(e) => {
                e.insert(charger);
                Ok(())
            }
        }
    }

    async fn find_by_id(&self, id: u32) -> DomainResult<Option<Charger>> {
        Ok(self.chargers.get(&id).map(|c| c.clone()))
    }

    async fn find_all(&self) -> DomainResult<Vec<Charger>> {
        let mut chargers: Vec<Charger> = self.chargers.iter().map(|e| e.value().clone()).collect();
        chargers.sort_by_key(|c| c.id);
        Ok(chargers)
    }

    async fn find_by_station(&self, station_id: u32) -> DomainResult<Vec<Charger>> {
        let mut chargers: Vec<Charger> = self
            .chargers
            .iter()
            .filter(|e| e.station_id == station_id)
            .map(|e| e.value().clone())
            .collect();
        chargers.sort_by_key(|c| c.id);
        Ok(chargers)
    }

    async fn compare_and_set_status(
        &self,
        id: u32,
        expected: ChargerStatus,
        next: ChargerStatus,
    ) -> DomainResult<bool> {
        let mut charger = self
            .chargers
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found("Charger", "id", id))?;
        if charger.status != expected {
            return Ok(false);
        }
        charger.status = next;
        Ok(true)
    }

    async fn set_status(&self, id: u32, status: ChargerStatus) -> DomainResult<()> {
        let mut charger = self
            .chargers
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found("Charger", "id", id))?;
        charger.status = status;
        Ok(())
    }

    async fn delete(&self, id: u32) -> DomainResult<()> {
        self.chargers
            .remove(&id)
            .ok_or_else(|| DomainError::not_found("Charger", "id", id))?;
        Ok(())
    }
}

// ── Sessions ───────────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemorySessionRepository {
    sessions: DashMap<Uuid, ChargingSession>,
    /// user id -> open session id
    open_by_user: DashMap<Uuid, Uuid>,
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn open(&self, session: ChargingSession) -> DomainResult<()> {
        match self.open_by_user.entry(session.user_id) {
            Entry::Occupied(e) => Err(DomainError::Conflict(format!(
                "user {} already has open session {}",
                session.user_id,
                e.get()
            ))),
            Entry::Vacant(e) => {
                e.insert(session.id);
                self.sessions.insert(session.id, session);
                Ok(())
            }
        }
    }

    async fn close(&self, session: ChargingSession) -> DomainResult<()> {
        if !self.sessions.contains_key(&session.id) {
            return Err(DomainError::not_found("Session", "id", session.id));
        }
        let (user_id, id) = (session.user_id, session.id);
        self.sessions.insert(id, session);
        self.open_by_user.remove_if(&user_id, |_, open| *open == id);
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<ChargingSession>> {
        Ok(self.sessions.get(&id).map(|s| s.clone()))
    }

    async fn find_open_by_user(&self, user_id: Uuid) -> DomainResult<Option<ChargingSession>> {
        let id = match self.open_by_user.get(&user_id) {
            Some(id) => *id,
            None => return Ok(None),
        };
        Ok(self.sessions.get(&id).map(|s| s.clone()))
    }

    async fn find_by_user(&self, user_id: Uuid) -> DomainResult<Vec<ChargingSession>> {
        let mut sessions: Vec<ChargingSession> = self
            .sessions
            .iter()
            .filter(|e| e.user_id == user_id)
            .map(|e| e.value().clone())
            .collect();
        sessions.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        Ok(sessions)
    }

    async fn find_by_station(&self, station_id: u32) -> DomainResult<Vec<ChargingSession>> {
        let mut sessions: Vec<ChargingSession> = self
            .sessions
            .iter()
            .filter(|e| e.station_id == station_id)
            .map(|e| e.value().clone())
            .collect();
        sessions.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        Ok(sessions)
    }
}

// ── Maintenance ────────────────────────────────────────────────────

pub struct InMemoryMaintenanceRepository {
    records: DashMap<u32, MaintenanceRecord>,
    counter: AtomicU32,
}

impl Default for InMemoryMaintenanceRepository {
    fn default() -> Self {
        Self {
            records: DashMap::new(),
            counter: AtomicU32::new(1),
        }
    }
}

#[async_trait]
impl MaintenanceRepository for InMemoryMaintenanceRepository {
    fn next_id(&self) -> u32 {
        self.counter.fetch_add(1, Ordering::SeqCst)
    }

    async fn insert(&self, record: MaintenanceRecord) -> DomainResult<()> {
        match self.records.entry(record.id) {
            Entry::Occupied(_) => Err(DomainError::Conflict(format!("maintenance {}", record.id))),
            Entry::Vacant(e) => {
                e.insert(record);
                Ok(())
            }
        }
    }

    async fn update(&self, record: MaintenanceRecord) -> DomainResult<()> {
        let mut current = self
            .records
            .get_mut(&record.id)
            .ok_or_else(|| DomainError::not_found("Maintenance", "id", record.id))?;
        *current = record;
        Ok(())
    }

    async fn find_by_id(&self, id: u32) -> DomainResult<Option<MaintenanceRecord>> {
        Ok(self.records.get(&id).map(|r| r.clone()))
    }

    async fn find_all(&self, station_id: Option<u32>) -> DomainResult<Vec<MaintenanceRecord>> {
        let mut records: Vec<MaintenanceRecord> = self
            .records
            .iter()
            .filter(|e| station_id.map_or(true, |sid| e.station_id == sid))
            .map(|e| e.value().clone())
            .collect();
        records.sort_by_key(|r| r.id);
        Ok(records)
    }
}

// ── Provider ───────────────────────────────────────────────────────

/// All repositories in process memory. State is lost on restart.
#[derive(Default)]
pub struct InMemoryRepositoryProvider {
    users: InMemoryUserRepository,
    stations: InMemoryStationRepository,
    chargers: InMemoryChargerRepository,
    sessions: InMemorySessionRepository,
    maintenance: InMemoryMaintenanceRepository,
}

impl InMemoryRepositoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> Arc<dyn RepositoryProvider> {
        Arc::new(Self::new())
    }
}

impl RepositoryProvider for InMemoryRepositoryProvider {
    fn users(&self) -> &dyn UserRepository {
        &self.users
    }

    fn stations(&self) -> &dyn StationRepository {
        &self.stations
    }

    fn chargers(&self) -> &dyn ChargerRepository {
        &self.chargers
    }

    fn sessions(&self) -> &dyn SessionRepository {
        &self.sessions
    }

    fn maintenance(&self) -> &dyn MaintenanceRepository {
        &self.maintenance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ChargerType, UserRole};
    use chrono::Utc;

    fn user(email: &str, balance: i64) -> User {
        User::new("Test", email, "hash", UserRole::Individual, Decimal::from(balance))
    }

    #[tokio::test]
    async fn email_uniqueness_ignores_case() {
        let repos = InMemoryRepositoryProvider::new();
        repos.users().insert(user("ana@x.io", 50)).await.unwrap();

        let err = repos.users().insert(user("ANA@x.io", 50)).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));

        let found = repos.users().find_by_email("Ana@X.io").await.unwrap();
        assert!(found.is_some());
    }

    #[tokio::test]
    async fn debit_never_overdraws() {
        let repos = InMemoryRepositoryProvider::new();
        let u = user("b@x.io", 2);
        let id = u.id;
        repos.users().insert(u).await.unwrap();

        let err = repos.users().debit(id, Decimal::new(250, 2)).await.unwrap_err();
        assert!(matches!(err, DomainError::InsufficientBalance { .. }));
        let after = repos.users().find_by_id(id).await.unwrap().unwrap();
        assert_eq!(after.balance, Decimal::from(2));

        let after = repos.users().debit(id, Decimal::from(2)).await.unwrap();
        assert!(after.balance.is_zero());
    }

    #[tokio::test]
    async fn credit_overflow_leaves_balance_untouched() {
        let repos = InMemoryRepositoryProvider::new();
        let u = user("c@x.io", 50);
        let id = u.id;
        repos.users().insert(u).await.unwrap();

        let err = repos.users().credit(id, Decimal::MAX).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        let after = repos.users().find_by_id(id).await.unwrap().unwrap();
        assert_eq!(after.balance, Decimal::from(50));
    }

    #[tokio::test]
    async fn charger_compare_and_set() {
        let repos = InMemoryRepositoryProvider::new();
        repos
            .chargers()
            .insert(Charger::new(7, ChargerType::Fast, 1))
            .await
            .unwrap();

        let chargers = repos.chargers();
        assert!(chargers
            .compare_and_set_status(7, ChargerStatus::Available, ChargerStatus::Occupied)
            .await
            .unwrap());
        assert!(!chargers
            .compare_and_set_status(7, ChargerStatus::Available, ChargerStatus::Occupied)
            .await
            .unwrap());
        assert!(chargers
            .compare_and_set_status(99, ChargerStatus::Available, ChargerStatus::Occupied)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn one_open_session_per_user() {
        let repos = InMemoryRepositoryProvider::new();
        let user_id = Uuid::new_v4();
        let first = ChargingSession::open(user_id, 1, 1, Decimal::new(30, 2), Utc::now());
        repos.sessions().open(first.clone()).await.unwrap();

        let second = ChargingSession::open(user_id, 1, 2, Decimal::new(30, 2), Utc::now());
        assert!(matches!(
            repos.sessions().open(second.clone()).await,
            Err(DomainError::Conflict(_))
        ));

        let mut closed = first;
        let end = Utc::now();
        let charge = closed.charge_at(end);
        closed.close(end, &charge);
        repos.sessions().close(closed).await.unwrap();

        assert!(repos.sessions().find_open_by_user(user_id).await.unwrap().is_none());
        repos.sessions().open(second).await.unwrap();
        assert_eq!(repos.sessions().find_by_user(user_id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn station_charger_list_keeps_insertion_order() {
        let repos = InMemoryRepositoryProvider::new();
        repos.stations().insert(Station::new(1, "Centro", "Main St")).await.unwrap();
        for id in [30, 10, 20] {
            repos.stations().attach_charger(1, id).await.unwrap();
        }
        let station = repos.stations().find_by_id(1).await.unwrap().unwrap();
        assert_eq!(station.charger_ids, vec![30, 10, 20]);

        assert!(repos
            .stations()
            .insert(Station::new(1, "Dup", "Elsewhere"))
            .await
            .is_err());
    }

    #[test]
    fn maintenance_ids_increase() {
        let repo = InMemoryMaintenanceRepository::default();
        let a = repo.next_id();
        let b = repo.next_id();
        assert_eq!(a, 1);
        assert_eq!(b, 2);
    }
}

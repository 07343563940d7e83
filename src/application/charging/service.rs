//! Charging session lifecycle: start, close, active session and history
//!
//! Start and close for the same user are serialised by a per-user async
//! mutex. Charger allocation is a compare-and-set on the charger status,
//! so concurrent starts by different users never share a charger.

use std::sync::Arc;

use dashmap::DashMap;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::application::authorization::{authorize, Action, Principal};
use crate::domain::billing::SessionCharge;
use crate::domain::{
    ChargerStatus, ChargingSession, DomainError, DomainResult, RepositoryProvider, User,
};
use crate::shared::time::SharedClock;

/// A session that has just been closed and billed
#[derive(Debug, Clone)]
pub struct ClosedSession {
    pub session: ChargingSession,
    pub elapsed_minutes: Decimal,
    pub balance: Decimal,
}

pub struct ChargingService {
    repos: Arc<dyn RepositoryProvider>,
    clock: SharedClock,
    user_locks: DashMap<Uuid, Arc<Mutex<()>>>,
}

impl ChargingService {
    pub fn new(repos: Arc<dyn RepositoryProvider>, clock: SharedClock) -> Self {
        Self {
            repos,
            clock,
            user_locks: DashMap::new(),
        }
    }

    fn user_lock(&self, user_id: Uuid) -> Arc<Mutex<()>> {
        self.user_locks
            .entry(user_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Open a session for the principal on the first available charger of
    /// `station_id`, in the station's charger order.
    pub async fn start(&self, principal: &Principal, station_id: u32) -> DomainResult<ChargingSession> {
        authorize(principal, Action::StartSession(principal.user_id))?;

        let lock = self.user_lock(principal.user_id);
        let _guard = lock.lock().await;

        let user = self.load_user(principal.user_id).await?;
        let rate = user
            .rate()
            .ok_or_else(|| DomainError::Forbidden(format!("{} accounts cannot charge", user.role)))?;

        if let Some(open) = self.repos.sessions().find_open_by_user(user.id).await? {
            return Err(DomainError::Conflict(format!(
                "user {} already has open session {}",
                user.id, open.id
            )));
        }

        let station = self
            .repos
            .stations()
            .find_by_id(station_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Station", "id", station_id))?;

        let charger_id = self.claim_charger(&station.charger_ids).await?.ok_or_else(|| {
            DomainError::not_found("Charger", "status", format!("available at station {}", station_id))
        })?;

        let session = ChargingSession::open(user.id, station_id, charger_id, rate, self.clock.now());
        if let Err(e) = self.repos.sessions().open(session.clone()).await {
            self.release_charger(charger_id).await;
            return Err(e);
        }

        metrics::counter!("charging_sessions_started_total").increment(1);
        info!(
            session_id = %session.id,
            user_id = %user.id,
            station_id,
            charger_id,
            %rate,
            "Charging session started"
        );
        Ok(session)
    }

    async fn claim_charger(&self, charger_ids: &[u32]) -> DomainResult<Option<u32>> {
        for &charger_id in charger_ids {
            match self
                .repos
                .chargers()
                .compare_and_set_status(charger_id, ChargerStatus::Available, ChargerStatus::Occupied)
                .await
            {
                Ok(true) => return Ok(Some(charger_id)),
                Ok(false) | Err(DomainError::NotFound { .. }) => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(None)
    }

    async fn release_charger(&self, charger_id: u32) {
        if let Err(e) = self
            .repos
            .chargers()
            .set_status(charger_id, ChargerStatus::Available)
            .await
        {
            warn!(charger_id, error = %e, "Failed to release charger");
        }
    }

    /// Bill and close the principal's open session.
    ///
    /// With an insufficient balance nothing changes: the session stays open
    /// and the charger stays occupied.
    pub async fn close(&self, principal: &Principal) -> DomainResult<ClosedSession> {
        authorize(principal, Action::CloseSession(principal.user_id))?;

        let lock = self.user_lock(principal.user_id);
        let _guard = lock.lock().await;

        let mut session = self
            .repos
            .sessions()
            .find_open_by_user(principal.user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Session", "user_id", principal.user_id))?;

        let ended_at = self.clock.now();
        let charge: SessionCharge = session.charge_at(ended_at);

        let user = match self.repos.users().debit(session.user_id, charge.cost).await {
            Ok(user) => user,
            Err(e) => {
                if let DomainError::InsufficientBalance { required, available } = &e {
                    warn!(
                        session_id = %session.id,
                        %required,
                        %available,
                        "Session close refused: insufficient balance"
                    );
                }
                return Err(e);
            }
        };

        session.close(ended_at, &charge);
        if let Err(e) = self.repos.sessions().close(session.clone()).await {
            self.refund(session.user_id, charge.cost).await;
            return Err(e);
        }
        self.release_charger(session.charger_id).await;

        metrics::counter!("charging_sessions_closed_total").increment(1);
        if let Some(cents) = (charge.cost * Decimal::ONE_HUNDRED).to_u64() {
            metrics::counter!("charging_revenue_cents_total").increment(cents);
        }
        if let Some(kwh) = charge.energy_kwh.to_f64() {
            metrics::histogram!("charging_session_energy_kwh").record(kwh);
        }

        info!(
            session_id = %session.id,
            user_id = %user.id,
            minutes = %charge.elapsed_minutes,
            energy_kwh = %charge.energy_kwh,
            cost = %charge.cost,
            balance = %user.balance,
            "Charging session closed"
        );

        Ok(ClosedSession {
            session,
            elapsed_minutes: charge.elapsed_minutes,
            balance: user.balance,
        })
    }

    async fn refund(&self, user_id: Uuid, amount: Decimal) {
        if let Err(e) = self.repos.users().credit(user_id, amount).await {
            warn!(%user_id, %amount, error = %e, "Failed to refund debit of unclosed session");
        }
    }

    pub async fn active(&self, principal: &Principal) -> DomainResult<Option<ChargingSession>> {
        self.repos.sessions().find_open_by_user(principal.user_id).await
    }

    /// All sessions of `user_id`, newest first.
    pub async fn history(
        &self,
        principal: &Principal,
        user_id: Uuid,
    ) -> DomainResult<Vec<ChargingSession>> {
        authorize(principal, Action::ViewHistory(user_id))?;
        self.load_user(user_id).await?;
        self.repos.sessions().find_by_user(user_id).await
    }

    async fn load_user(&self, id: Uuid) -> DomainResult<User> {
        self.repos
            .users()
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("User", "id", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::charger::ChargerRepository;
    use crate::domain::maintenance::MaintenanceRepository;
    use crate::domain::session::SessionRepository;
    use crate::domain::station::StationRepository;
    use crate::domain::user::UserRepository;
    use crate::domain::{Charger, ChargerType, Station, UserRole};
    use crate::infrastructure::InMemoryRepositoryProvider;
    use crate::shared::time::ManualClock;
    use chrono::{Duration, Utc};

    struct Fixture {
        repos: Arc<dyn RepositoryProvider>,
        clock: Arc<ManualClock>,
        svc: ChargingService,
    }

    async fn fixture(chargers: &[u32]) -> Fixture {
        let repos = InMemoryRepositoryProvider::shared();
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let svc = ChargingService::new(repos.clone(), clock.clone());

        repos.stations().insert(Station::new(1, "Sur", "Calle 5")).await.unwrap();
        for &id in chargers {
            repos
                .chargers()
                .insert(Charger::new(id, ChargerType::Fast, 1))
                .await
                .unwrap();
            repos.stations().attach_charger(1, id).await.unwrap();
        }
        Fixture { repos, clock, svc }
    }

    async fn user(f: &Fixture, role: UserRole, balance: Decimal) -> Principal {
        let email = format!("{}@x.io", Uuid::new_v4());
        let u = User::new("U", &email, "h", role, balance);
        let p = Principal::new(u.id, u.role);
        f.repos.users().insert(u).await.unwrap();
        p
    }

    async fn charger_status(f: &Fixture, id: u32) -> ChargerStatus {
        f.repos.chargers().find_by_id(id).await.unwrap().unwrap().status
    }

    #[tokio::test]
    async fn twenty_minute_session_bills_three() {
        let f = fixture(&[10]).await;
        let p = user(&f, UserRole::Individual, Decimal::new(1000, 2)).await;

        let session = f.svc.start(&p, 1).await.unwrap();
        assert_eq!(session.charger_id, 10);
        assert_eq!(charger_status(&f, 10).await, ChargerStatus::Occupied);

        f.clock.advance(Duration::minutes(20));
        let closed = f.svc.close(&p).await.unwrap();

        assert_eq!(closed.session.energy_kwh, Some(Decimal::from(10)));
        assert_eq!(closed.session.cost, Some(Decimal::new(300, 2)));
        assert_eq!(closed.balance, Decimal::new(700, 2));
        assert_eq!(charger_status(&f, 10).await, ChargerStatus::Available);
        assert!(f.svc.active(&p).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn company_rate_applies() {
        let f = fixture(&[10]).await;
        let p = user(&f, UserRole::Company, Decimal::from(50)).await;
        f.svc.start(&p, 1).await.unwrap();
        f.clock.advance(Duration::minutes(20));
        let closed = f.svc.close(&p).await.unwrap();
        assert_eq!(closed.session.cost, Some(Decimal::new(250, 2)));
        assert_eq!(closed.balance, Decimal::new(4750, 2));
    }

    #[tokio::test]
    async fn second_start_conflicts() {
        let f = fixture(&[10, 11]).await;
        let p = user(&f, UserRole::Individual, Decimal::from(50)).await;
        f.svc.start(&p, 1).await.unwrap();

        let err = f.svc.start(&p, 1).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
        assert_eq!(charger_status(&f, 11).await, ChargerStatus::Available);
    }

    #[tokio::test]
    async fn allocation_skips_busy_chargers_and_runs_out() {
        let f = fixture(&[10, 11]).await;
        f.repos
            .chargers()
            .set_status(10, ChargerStatus::UnderMaintenance)
            .await
            .unwrap();

        let a = user(&f, UserRole::Individual, Decimal::from(50)).await;
        let b = user(&f, UserRole::Company, Decimal::from(50)).await;
        assert_eq!(f.svc.start(&a, 1).await.unwrap().charger_id, 11);

        let err = f.svc.start(&b, 1).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));

        let err = f.svc.start(&b, 42).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { entity: "Station", .. }));
    }

    #[tokio::test]
    async fn insufficient_balance_keeps_session_open() {
        let f = fixture(&[10]).await;
        let p = user(&f, UserRole::Individual, Decimal::ONE).await;
        let session = f.svc.start(&p, 1).await.unwrap();

        f.clock.advance(Duration::minutes(20));
        let err = f.svc.close(&p).await.unwrap_err();
        assert!(matches!(
            err,
            DomainError::InsufficientBalance { required, available }
                if required == Decimal::new(300, 2) && available == Decimal::ONE
        ));

        let still_open = f.svc.active(&p).await.unwrap().unwrap();
        assert_eq!(still_open.id, session.id);
        assert!(still_open.is_open());
        assert_eq!(charger_status(&f, 10).await, ChargerStatus::Occupied);
        let balance = f.repos.users().find_by_id(p.user_id).await.unwrap().unwrap().balance;
        assert_eq!(balance, Decimal::ONE);
    }

    /// Session store whose `close` always fails.
    struct CloseFails(Arc<InMemoryRepositoryProvider>);

    #[async_trait::async_trait]
    impl SessionRepository for CloseFails {
        async fn open(&self, session: ChargingSession) -> DomainResult<()> {
            self.0.sessions().open(session).await
        }
        async fn close(&self, _session: ChargingSession) -> DomainResult<()> {
            Err(DomainError::Internal("store unavailable".into()))
        }
        async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<ChargingSession>> {
            self.0.sessions().find_by_id(id).await
        }
        async fn find_open_by_user(&self, user_id: Uuid) -> DomainResult<Option<ChargingSession>> {
            self.0.sessions().find_open_by_user(user_id).await
        }
        async fn find_by_user(&self, user_id: Uuid) -> DomainResult<Vec<ChargingSession>> {
            self.0.sessions().find_by_user(user_id).await
        }
        async fn find_by_station(&self, station_id: u32) -> DomainResult<Vec<ChargingSession>> {
            self.0.sessions().find_by_station(station_id).await
        }
    }

    struct FailingCloseProvider {
        inner: Arc<InMemoryRepositoryProvider>,
        sessions: CloseFails,
    }

    impl RepositoryProvider for FailingCloseProvider {
        fn users(&self) -> &dyn UserRepository {
            self.inner.users()
        }
        fn stations(&self) -> &dyn StationRepository {
            self.inner.stations()
        }
        fn chargers(&self) -> &dyn ChargerRepository {
            self.inner.chargers()
        }
        fn sessions(&self) -> &dyn SessionRepository {
            &self.sessions
        }
        fn maintenance(&self) -> &dyn MaintenanceRepository {
            self.inner.maintenance()
        }
    }

    #[tokio::test]
    async fn failed_close_refunds_the_debit() {
        let inner = Arc::new(InMemoryRepositoryProvider::new());
        let repos: Arc<dyn RepositoryProvider> = Arc::new(FailingCloseProvider {
            inner: inner.clone(),
            sessions: CloseFails(inner.clone()),
        });
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let svc = ChargingService::new(repos.clone(), clock.clone());

        repos.stations().insert(Station::new(1, "Sur", "Calle 5")).await.unwrap();
        repos
            .chargers()
            .insert(Charger::new(10, ChargerType::Fast, 1))
            .await
            .unwrap();
        repos.stations().attach_charger(1, 10).await.unwrap();
        let u = User::new("U", "u@x.io", "h", UserRole::Individual, Decimal::from(10));
        let p = Principal::new(u.id, u.role);
        repos.users().insert(u).await.unwrap();

        let session = svc.start(&p, 1).await.unwrap();
        clock.advance(Duration::minutes(20));
        assert!(matches!(svc.close(&p).await, Err(DomainError::Internal(_))));

        let balance = repos.users().find_by_id(p.user_id).await.unwrap().unwrap().balance;
        assert_eq!(balance, Decimal::from(10));
        assert_eq!(svc.active(&p).await.unwrap().unwrap().id, session.id);
    }

    #[tokio::test]
    async fn admin_cannot_charge_and_close_requires_open_session() {
        let f = fixture(&[10]).await;
        let admin = user(&f, UserRole::Admin, Decimal::from(100)).await;
        assert!(matches!(f.svc.start(&admin, 1).await, Err(DomainError::Forbidden(_))));

        let p = user(&f, UserRole::Individual, Decimal::from(5)).await;
        assert!(matches!(f.svc.close(&p).await, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn history_is_newest_first_and_restricted() {
        let f = fixture(&[10]).await;
        let p = user(&f, UserRole::Individual, Decimal::from(50)).await;
        let other = user(&f, UserRole::Individual, Decimal::from(50)).await;
        let admin = user(&f, UserRole::Admin, Decimal::ZERO).await;

        let first = f.svc.start(&p, 1).await.unwrap();
        f.clock.advance(Duration::minutes(2));
        f.svc.close(&p).await.unwrap();
        f.clock.advance(Duration::minutes(1));
        let second = f.svc.start(&p, 1).await.unwrap();

        let history = f.svc.history(&p, p.user_id).await.unwrap();
        assert_eq!(
            history.iter().map(|s| s.id).collect::<Vec<_>>(),
            vec![second.id, first.id]
        );
        assert_eq!(f.svc.history(&admin, p.user_id).await.unwrap().len(), 2);
        assert!(matches!(
            f.svc.history(&other, p.user_id).await,
            Err(DomainError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn concurrent_starts_claim_distinct_chargers() {
        let f = fixture(&[10, 11, 12]).await;
        let svc = Arc::new(f.svc);
        let mut handles = Vec::new();
        for _ in 0..5 {
            let email = format!("{}@x.io", Uuid::new_v4());
            let u = User::new("U", &email, "h", UserRole::Individual, Decimal::from(50));
            let p = Principal::new(u.id, u.role);
            f.repos.users().insert(u).await.unwrap();
            let svc = svc.clone();
            handles.push(tokio::spawn(async move { svc.start(&p, 1).await }));
        }

        let mut claimed = Vec::new();
        for h in handles {
            if let Ok(session) = h.await.unwrap() {
                claimed.push(session.charger_id);
            }
        }
        claimed.sort();
        assert_eq!(claimed, vec![10, 11, 12]);
    }
}

//! Charging session entity

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::billing::SessionCharge;

#[derive(Debug, Clone)]
pub struct ChargingSession {
    pub id: Uuid,
    pub user_id: Uuid,
    pub station_id: u32,
    pub charger_id: u32,
    /// Rate in force for the user when the session started
    pub rate: Decimal,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub energy_kwh: Option<Decimal>,
    pub cost: Option<Decimal>,
}

impl ChargingSession {
    pub fn open(
        user_id: Uuid,
        station_id: u32,
        charger_id: u32,
        rate: Decimal,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            station_id,
            charger_id,
            rate,
            started_at,
            ended_at: None,
            energy_kwh: None,
            cost: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.ended_at.is_none()
    }

    /// Price the session as if it ended at `at`.
    pub fn charge_at(&self, at: DateTime<Utc>) -> SessionCharge {
        SessionCharge::compute(self.started_at, at, self.rate)
    }

    pub fn close(&mut self, ended_at: DateTime<Utc>, charge: &SessionCharge) {
        self.ended_at = Some(ended_at);
        self.energy_kwh = Some(charge.energy_kwh);
        self.cost = Some(charge.cost);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn close_records_billing() {
        let t0 = Utc::now();
        let mut session = ChargingSession::open(Uuid::new_v4(), 1, 10, Decimal::new(25, 2), t0);
        assert!(session.is_open());

        let end = t0 + Duration::minutes(8);
        let charge = session.charge_at(end);
        session.close(end, &charge);

        assert!(!session.is_open());
        assert_eq!(session.energy_kwh, Some(Decimal::from(4)));
        assert_eq!(session.cost, Some(Decimal::new(100, 2)));
    }
}

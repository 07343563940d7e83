//! Session pricing
//!
//! Energy is derived from elapsed time at a fixed delivery rate; cost is
//! energy times the role rate. Only the final cost is rounded.

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

/// Energy delivered per minute of charging, in kWh.
pub const KWH_PER_MINUTE: Decimal = Decimal::from_parts(5, 0, 0, false, 1);

/// Currency precision of a billed amount.
pub const COST_DECIMALS: u32 = 2;

const MILLIS_PER_MINUTE: i64 = 60_000;

/// Billing figures for a closed session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionCharge {
    pub elapsed_minutes: Decimal,
    pub energy_kwh: Decimal,
    pub cost: Decimal,
}

impl SessionCharge {
    pub fn compute(started_at: DateTime<Utc>, ended_at: DateTime<Utc>, rate: Decimal) -> Self {
        let elapsed_minutes = elapsed_minutes(started_at, ended_at);
        let energy_kwh = energy_for(elapsed_minutes);
        Self {
            elapsed_minutes,
            energy_kwh,
            cost: cost_for(energy_kwh, rate),
        }
    }
}

/// Whole and fractional minutes between two instants. A clock that moved
/// backwards yields zero.
pub fn elapsed_minutes(started_at: DateTime<Utc>, ended_at: DateTime<Utc>) -> Decimal {
    let millis = (ended_at - started_at).num_milliseconds().max(0);
    (Decimal::from(millis) / Decimal::from(MILLIS_PER_MINUTE)).normalize()
}

pub fn energy_for(minutes: Decimal) -> Decimal {
    (minutes * KWH_PER_MINUTE).normalize()
}

pub fn cost_for(energy_kwh: Decimal, rate: Decimal) -> Decimal {
    (energy_kwh * rate).round_dp_with_strategy(COST_DECIMALS, RoundingStrategy::MidpointAwayFromZero)
}

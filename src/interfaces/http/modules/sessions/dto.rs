//! Charging session DTOs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::application::ClosedSession;
use crate::domain::ChargingSession;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct StartSessionRequest {
    #[validate(range(min = 1))]
    #[schema(example = 1)]
    pub station_id: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatusDto {
    Open,
    Closed,
}

/// Charging session API representation
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SessionDto {
    pub id: Uuid,
    pub user_id: Uuid,
    pub station_id: u32,
    pub charger_id: u32,
    pub status: SessionStatusDto,
    /// Price per kWh captured when the session opened
    pub rate: Decimal,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub energy_kwh: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<Decimal>,
}

impl From<ChargingSession> for SessionDto {
    fn from(s: ChargingSession) -> Self {
        let status = if s.is_open() {
            SessionStatusDto::Open
        } else {
            SessionStatusDto::Closed
        };
        Self {
            id: s.id,
            user_id: s.user_id,
            station_id: s.station_id,
            charger_id: s.charger_id,
            status,
            rate: s.rate,
            started_at: s.started_at,
            ended_at: s.ended_at,
            energy_kwh: s.energy_kwh,
            cost: s.cost,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CloseSessionResponse {
    pub session: SessionDto,
    pub elapsed_minutes: Decimal,
    /// Balance after the debit
    pub balance: Decimal,
}

impl From<ClosedSession> for CloseSessionResponse {
    fn from(c: ClosedSession) -> Self {
        Self {
            session: c.session.into(),
            elapsed_minutes: c.elapsed_minutes,
            balance: c.balance,
        }
    }
}

//! Station DTOs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::application::{ConsumptionReport, StationAvailability};
use crate::domain::Station;
use crate::interfaces::http::modules::chargers::ChargerTypeDto;

/// Station API representation
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StationDto {
    pub id: u32,
    pub name: String,
    pub location: String,
    pub charger_ids: Vec<u32>,
    pub created_at: DateTime<Utc>,
}

impl From<Station> for StationDto {
    fn from(s: Station) -> Self {
        Self {
            id: s.id,
            name: s.name,
            location: s.location,
            charger_ids: s.charger_ids,
            created_at: s.created_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateStationRequest {
    #[validate(range(min = 1))]
    #[schema(example = 1)]
    pub id: u32,
    #[validate(length(min = 1, max = 100))]
    #[schema(example = "Downtown Hub")]
    pub name: String,
    #[validate(length(min = 1, max = 200))]
    #[schema(example = "12 Market Street")]
    pub location: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AddChargerRequest {
    #[validate(range(min = 1))]
    pub id: u32,
    #[serde(rename = "type")]
    pub kind: ChargerTypeDto,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AvailabilityDto {
    pub station_id: u32,
    pub total: usize,
    pub available: usize,
    pub occupied: usize,
    pub under_maintenance: usize,
    /// Share of available chargers, 0 to 100
    #[schema(example = "50.00")]
    pub availability_pct: Decimal,
}

impl From<StationAvailability> for AvailabilityDto {
    fn from(a: StationAvailability) -> Self {
        Self {
            station_id: a.station_id,
            total: a.total,
            available: a.available,
            occupied: a.occupied,
            under_maintenance: a.under_maintenance,
            availability_pct: a.availability_pct,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ConsumptionReportDto {
    pub station_id: u32,
    pub total_sessions: usize,
    pub open_sessions: usize,
    pub total_energy_kwh: Decimal,
    pub total_revenue: Decimal,
}

impl From<ConsumptionReport> for ConsumptionReportDto {
    fn from(r: ConsumptionReport) -> Self {
        Self {
            station_id: r.station_id,
            total_sessions: r.total_sessions,
            open_sessions: r.open_sessions,
            total_energy_kwh: r.total_energy_kwh,
            total_revenue: r.total_revenue,
        }
    }
}

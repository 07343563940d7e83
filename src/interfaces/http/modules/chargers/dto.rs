//! Charger DTOs

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{Charger, ChargerStatus, ChargerType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ChargerTypeDto {
    Fast,
    Normal,
}

impl From<ChargerType> for ChargerTypeDto {
    fn from(kind: ChargerType) -> Self {
        match kind {
            ChargerType::Fast => Self::Fast,
            ChargerType::Normal => Self::Normal,
        }
    }
}

impl From<ChargerTypeDto> for ChargerType {
    fn from(kind: ChargerTypeDto) -> Self {
        match kind {
            ChargerTypeDto::Fast => Self::Fast,
            ChargerTypeDto::Normal => Self::Normal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ChargerStatusDto {
    Available,
    Occupied,
    UnderMaintenance,
}

impl From<ChargerStatus> for ChargerStatusDto {
    fn from(status: ChargerStatus) -> Self {
        match status {
            ChargerStatus::Available => Self::Available,
            ChargerStatus::Occupied => Self::Occupied,
            ChargerStatus::UnderMaintenance => Self::UnderMaintenance,
        }
    }
}

/// Charger API representation
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChargerDto {
    pub id: u32,
    #[serde(rename = "type")]
    pub kind: ChargerTypeDto,
    pub station_id: u32,
    pub status: ChargerStatusDto,
}

impl From<Charger> for ChargerDto {
    fn from(c: Charger) -> Self {
        Self {
            id: c.id,
            kind: c.kind.into(),
            station_id: c.station_id,
            status: c.status.into(),
        }
    }
}

/// Charger list filter
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListChargersParams {
    /// Only chargers of this station
    pub station_id: Option<u32>,
}

//! Maintenance DTOs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::application::ScheduleMaintenance;
use crate::domain::{DomainResult, MaintenanceKind, MaintenanceRecord, MaintenanceStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MaintenanceKindDto {
    Preventive,
    Corrective,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MaintenanceStatusDto {
    Scheduled,
    InProgress,
    Completed,
}

impl From<MaintenanceStatus> for MaintenanceStatusDto {
    fn from(status: MaintenanceStatus) -> Self {
        match status {
            MaintenanceStatus::Scheduled => Self::Scheduled,
            MaintenanceStatus::InProgress => Self::InProgress,
            MaintenanceStatus::Completed => Self::Completed,
        }
    }
}

/// Preventive work needs `frequency`; corrective work needs
/// `fault_description`. Omitting `charger_id` targets the whole station.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ScheduleMaintenanceRequest {
    pub station_id: u32,
    pub charger_id: Option<u32>,
    pub kind: MaintenanceKindDto,
    #[validate(length(max = 100))]
    #[schema(example = "monthly")]
    pub frequency: Option<String>,
    #[validate(length(max = 500))]
    pub fault_description: Option<String>,
    #[schema(value_type = String, format = Date, example = "2026-11-01")]
    pub scheduled_for: NaiveDate,
    #[validate(length(max = 100))]
    pub technician: Option<String>,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

impl ScheduleMaintenanceRequest {
    /// Fails with a validation error when the kind's detail is missing.
    pub fn into_command(self) -> DomainResult<ScheduleMaintenance> {
        let kind = match self.kind {
            MaintenanceKindDto::Preventive => {
                MaintenanceKind::preventive(self.frequency.unwrap_or_default())?
            }
            MaintenanceKindDto::Corrective => {
                MaintenanceKind::corrective(self.fault_description.unwrap_or_default())?
            }
        };
        Ok(ScheduleMaintenance {
            station_id: self.station_id,
            charger_id: self.charger_id,
            kind,
            scheduled_for: self.scheduled_for,
            technician: self.technician,
            notes: self.notes,
        })
    }
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct CompleteMaintenanceRequest {
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListMaintenanceParams {
    pub station_id: Option<u32>,
}

/// Maintenance record API representation
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MaintenanceDto {
    pub id: u32,
    pub station_id: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub charger_id: Option<u32>,
    pub kind: MaintenanceKindDto,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fault_description: Option<String>,
    pub status: MaintenanceStatusDto,
    #[schema(value_type = String, format = Date)]
    pub scheduled_for: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub technician: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<MaintenanceRecord> for MaintenanceDto {
    fn from(r: MaintenanceRecord) -> Self {
        let (kind, frequency, fault_description) = match r.kind {
            MaintenanceKind::Preventive { frequency } => {
                (MaintenanceKindDto::Preventive, Some(frequency), None)
            }
            MaintenanceKind::Corrective { fault_description } => {
                (MaintenanceKindDto::Corrective, None, Some(fault_description))
            }
        };
        Self {
            id: r.id,
            station_id: r.station_id,
            charger_id: r.charger_id,
            kind,
            frequency,
            fault_description,
            status: r.status.into(),
            scheduled_for: r.scheduled_for,
            technician: r.technician,
            notes: r.notes,
            created_at: r.created_at,
            started_at: r.started_at,
            completed_at: r.completed_at,
        }
    }
}

//! Maintenance record entity and its state machine

use chrono::{DateTime, NaiveDate, Utc};

use crate::shared::{DomainError, DomainResult};

/// What kind of work is planned. Each kind carries the detail it requires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MaintenanceKind {
    Preventive { frequency: String },
    Corrective { fault_description: String },
}

impl MaintenanceKind {
    pub fn preventive(frequency: impl Into<String>) -> DomainResult<Self> {
        let frequency = frequency.into();
        if frequency.trim().is_empty() {
            return Err(DomainError::Validation(
                "preventive maintenance requires a frequency".into(),
            ));
        }
        Ok(Self::Preventive { frequency })
    }

    pub fn corrective(fault_description: impl Into<String>) -> DomainResult<Self> {
        let fault_description = fault_description.into();
        if fault_description.trim().is_empty() {
            return Err(DomainError::Validation(
                "corrective maintenance requires a fault description".into(),
            ));
        }
        Ok(Self::Corrective { fault_description })
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Preventive { .. } => "preventive",
            Self::Corrective { .. } => "corrective",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaintenanceStatus {
    Scheduled,
    InProgress,
    Completed,
}

impl std::fmt::Display for MaintenanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Scheduled => write!(f, "scheduled"),
            Self::InProgress => write!(f, "in_progress"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MaintenanceRecord {
    pub id: u32,
    pub station_id: u32,
    /// `None` for work on the station as a whole
    pub charger_id: Option<u32>,
    pub kind: MaintenanceKind,
    pub status: MaintenanceStatus,
    pub scheduled_for: NaiveDate,
    pub technician: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl MaintenanceRecord {
    pub fn start(&mut self, at: DateTime<Utc>) -> DomainResult<()> {
        self.transition(MaintenanceStatus::Scheduled, MaintenanceStatus::InProgress)?;
        self.started_at = Some(at);
        Ok(())
    }

    pub fn complete(&mut self, at: DateTime<Utc>, notes: Option<String>) -> DomainResult<()> {
        self.transition(MaintenanceStatus::InProgress, MaintenanceStatus::Completed)?;
        self.completed_at = Some(at);
        if notes.is_some() {
            self.notes = notes;
        }
        Ok(())
    }

    fn transition(&mut self, from: MaintenanceStatus, to: MaintenanceStatus) -> DomainResult<()> {
        if self.status != from {
            return Err(DomainError::Conflict(format!(
                "maintenance {} is {}, cannot move to {}",
                self.id, self.status, to
            )));
        }
        self.status = to;
        Ok(())
    }
}

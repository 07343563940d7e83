//! Charger domain entity

/// Charger hardware class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChargerType {
    Fast,
    Normal,
}

impl std::fmt::Display for ChargerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fast => write!(f, "fast"),
            Self::Normal => write!(f, "normal"),
        }
    }
}

/// Charger availability
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChargerStatus {
    Available,
    Occupied,
    UnderMaintenance,
}

impl Default for ChargerStatus {
    fn default() -> Self {
        Self::Available
    }
}

impl std::fmt::Display for ChargerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Available => write!(f, "available"),
            Self::Occupied => write!(f, "occupied"),
            Self::UnderMaintenance => write!(f, "under_maintenance"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Charger {
    pub id: u32,
    pub kind: ChargerType,
    pub station_id: u32,
    pub status: ChargerStatus,
}

impl Charger {
    pub fn new(id: u32, kind: ChargerType, station_id: u32) -> Self {
        Self {
            id,
            kind,
            station_id,
            status: ChargerStatus::Available,
        }
    }

    pub fn is_available(&self) -> bool {
        self.status == ChargerStatus::Available
    }
}

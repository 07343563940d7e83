//! Station domain entity

use chrono::{DateTime, Utc};

#[derive(Clone, Debug)]
pub struct Station {
    pub id: u32,
    pub name: String,
    pub location: String,
    /// Charger ids in the order they were added. Session allocation walks
    /// this list front to back.
    pub charger_ids: Vec<u32>,
    pub created_at: DateTime<Utc>,
}

impl Station {
    pub fn new(id: u32, name: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            location: location.into(),
            charger_ids: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn has_charger(&self, charger_id: u32) -> bool {
        self.charger_ids.contains(&charger_id)
    }
}

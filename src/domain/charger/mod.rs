//! Charger aggregate

pub mod model;
pub mod repository;

pub use model::{Charger, ChargerStatus, ChargerType};
pub use repository::ChargerRepository;

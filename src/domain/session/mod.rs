//! Charging session aggregate

pub mod model;
pub mod repository;

pub use model::ChargingSession;
pub use repository::SessionRepository;

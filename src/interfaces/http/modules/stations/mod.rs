//! Stations module: station CRUD, charger attachment and reports

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;

pub mod auth;
pub mod chargers;
pub mod health;
pub mod maintenance;
pub mod metrics;
pub mod request_id;
pub mod sessions;
pub mod stations;
pub mod users;

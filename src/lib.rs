//! # VoltEdge
//!
//! REST service for an EV charging network: users with prepaid balances,
//! stations and their chargers, metered charging sessions and maintenance
//! scheduling.
//!
//! ## Architecture
//!
//! - **domain**: entities, billing rules and repository traits
//! - **application**: use-case services and authorization
//! - **infrastructure**: in-memory store, JWT and password hashing
//! - **interfaces**: axum REST API with Swagger documentation
//! - **shared**: errors, clock, shutdown and validation helpers
//! - **server**: runtime wiring used by the binaries

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod shared;

pub use config::{default_config_path, AppConfig};
pub use interfaces::http::create_api_router;

//! Health check handler

use std::sync::Arc;
use std::time::Instant;

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tracing::warn;
use utoipa::ToSchema;

use crate::domain::RepositoryProvider;

/// Health check state
#[derive(Clone)]
pub struct HealthState {
    pub repos: Arc<dyn RepositoryProvider>,
    pub started_at: Arc<Instant>,
}

/// Service health response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub stations: usize,
    pub chargers: usize,
    pub users: usize,
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Store unreadable", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let counts = async {
        let stations = state.repos.stations().find_all().await?.len();
        let chargers = state.repos.chargers().find_all().await?.len();
        let users = state.repos.users().find_all().await?.len();
        Ok::<_, crate::domain::DomainError>((stations, chargers, users))
    }
    .await;

    let (status, http_status, (stations, chargers, users)) = match counts {
        Ok(c) => ("ok", StatusCode::OK, c),
        Err(e) => {
            warn!(error = %e, "Health check could not read the store");
            ("degraded", StatusCode::SERVICE_UNAVAILABLE, (0, 0, 0))
        }
    };

    (
        http_status,
        Json(HealthResponse {
            status: status.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: state.started_at.elapsed().as_secs(),
            stations,
            chargers,
            users,
        }),
    )
}

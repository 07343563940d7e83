//! Prometheus scrape endpoint
//!
//! Renders whatever the global `metrics-exporter-prometheus` recorder has
//! collected: HTTP traffic plus the charging counters recorded by the
//! services.

use axum::{extract::State, http::header, response::IntoResponse};
use metrics::Unit;
use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub struct MetricsState {
    pub handle: PrometheusHandle,
}

/// Registers help text and units once the recorder is installed.
pub fn describe_metrics() {
    metrics::describe_counter!("http_requests_total", "HTTP requests by method, route and status");
    metrics::describe_histogram!(
        "http_request_duration_seconds",
        Unit::Seconds,
        "HTTP request latency by method and route"
    );
    metrics::describe_counter!("charging_sessions_started_total", "Charging sessions opened");
    metrics::describe_counter!("charging_sessions_closed_total", "Charging sessions closed and billed");
    metrics::describe_counter!(
        "charging_revenue_cents_total",
        "Revenue collected from closed sessions, in cents"
    );
    metrics::describe_histogram!(
        "charging_session_energy_kwh",
        "Energy delivered per closed session in kWh"
    );
}

#[utoipa::path(
    get,
    path = "/metrics",
    tag = "Health",
    responses((status = 200, description = "Prometheus text exposition", content_type = "text/plain"))
)]
pub async fn prometheus_metrics(State(state): State<MetricsState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        state.handle.render(),
    )
}

//! Prometheus endpoint and HTTP metrics middleware

pub mod handlers;
pub mod middleware;

pub use handlers::{__path_prometheus_metrics, describe_metrics, prometheus_metrics, MetricsState};
pub use middleware::http_metrics_middleware;

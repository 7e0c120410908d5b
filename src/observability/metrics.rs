//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define proxy metrics (requests, latency)
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `proxy_requests_total` (counter): by proxy, route, method, status, outcome
//! - `proxy_request_duration_seconds` (histogram): by proxy, route
//!
//! Recording is a no-op until `init_metrics` installs the exporter.

use std::net::SocketAddr;
use std::time::Instant;

use axum::http::{Method, StatusCode};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// How a request terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Answered by a local route.
    Local,
    /// Upstream response relayed (any status).
    Relayed,
    /// Proxy-level failure envelope.
    Failed,
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Local => "local",
            Outcome::Relayed => "relayed",
            Outcome::Failed => "failed",
        }
    }
}

/// Install the Prometheus exporter with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Record one completed request.
pub fn record_request(
    proxy: &str,
    route: &str,
    method: &Method,
    status: StatusCode,
    outcome: Outcome,
    start: Instant,
) {
    ::metrics::counter!(
        "proxy_requests_total",
        "proxy" => proxy.to_string(),
        "route" => route.to_string(),
        "method" => method.to_string(),
        "status" => status.as_u16().to_string(),
        "outcome" => outcome.as_str()
    )
    .increment(1);

    ::metrics::histogram!(
        "proxy_request_duration_seconds",
        "proxy" => proxy.to_string(),
        "route" => route.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

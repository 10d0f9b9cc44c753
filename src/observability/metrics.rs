//! Metrics collection and exposition.
//!
//! # Metrics
//! - `bumbum_requests_total` (counter): requests by method, route, status
//! - `bumbum_request_duration_seconds` (histogram): latency by method, route
//! - `bumbum_validation_failures_total` (counter): violations by route, kind
//!
//! # Design Decisions
//! - The route label is the template, never the raw path
//! - Recording without an installed exporter is a no-op

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::binding::ValidationErrors;

/// Install the Prometheus exporter with its own scrape listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_request(method: &str, route: &str, status: u16, started: Instant) {
    ::metrics::counter!(
        "bumbum_requests_total",
        "method" => method.to_string(),
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    ::metrics::histogram!(
        "bumbum_request_duration_seconds",
        "method" => method.to_string(),
        "route" => route.to_string()
    )
    .record(started.elapsed().as_secs_f64());
}

pub fn record_validation_failures(route: &str, errors: &ValidationErrors) {
    for error in errors.iter() {
        ::metrics::counter!(
            "bumbum_validation_failures_total",
            "route" => route.to_string(),
            "kind" => error.kind.code()
        )
        .increment(1);
    }
}

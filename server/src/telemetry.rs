//! Prometheus exporter and metric descriptions.
//!
//! # Exported Metrics
//!
//! - `natours_rating_recomputations_total{outcome}` - rating recomputations
//!   after review changes, `ok` or `failed`
//! - `natours_http_errors_total{code}` - error responses by error code

use metrics::{describe_counter, Unit};
use metrics_exporter_prometheus::PrometheusBuilder;
use natours_core::service::RECOMPUTATIONS_METRIC;
use natours_web::error::ERRORS_METRIC;
use std::net::SocketAddr;

/// Install the global recorder and serve `/metrics` on `addr`.
///
/// # Errors
///
/// Fails if a recorder is already installed or the listener cannot bind.
pub fn install(addr: SocketAddr) -> anyhow::Result<()> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;
    register_descriptions();
    tracing::info!(%addr, "Prometheus exporter listening");
    Ok(())
}

fn register_descriptions() {
    describe_counter!(
        RECOMPUTATIONS_METRIC,
        Unit::Count,
        "Rating recomputations triggered by review changes, by outcome"
    );
    describe_counter!(
        ERRORS_METRIC,
        Unit::Count,
        "HTTP error responses by error code"
    );
}

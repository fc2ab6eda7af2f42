//! Run metrics for the fetch pipeline.
//!
//! Uses the `metrics` facade for low-overhead counters; a Prometheus scrape
//! endpoint is installed only when the operator asks for one (METRICS_ADDR).
//! Without an exporter the macros degrade to no-ops, so the pipeline can
//! record unconditionally.

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use metrics_exporter_prometheus::PrometheusBuilder;
use once_cell::sync::OnceCell;
use std::net::SocketAddr;
use std::time::Duration;
use tracing::info;

static METRICS_INSTALLED: OnceCell<()> = OnceCell::new();

/// Install the Prometheus exporter on `addr` and register metric
/// descriptions. Idempotent; later calls are ignored.
pub fn init_metrics(addr: SocketAddr) -> Result<(), Box<dyn std::error::Error>> {
    if METRICS_INSTALLED.get().is_some() {
        return Ok(());
    }

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("failed to install Prometheus exporter: {e}"))?;

    describe_counter!(
        "fetch_requests_total",
        Unit::Count,
        "Total platform requests issued"
    );
    describe_counter!(
        "fetch_retries_total",
        Unit::Count,
        "Total retry attempts across all operations"
    );
    describe_counter!(
        "throttle_events_total",
        Unit::Count,
        "Hard stops triggered by a recognized throttle message"
    );
    describe_counter!(
        "posts_scraped_total",
        Unit::Count,
        "Posts successfully collected"
    );
    describe_histogram!(
        "retry_backoff_seconds",
        Unit::Seconds,
        "Backoff sleep durations"
    );

    METRICS_INSTALLED.set(()).ok();
    info!(%addr, "metrics exporter listening");
    Ok(())
}

/// Static recording helpers used throughout the pipeline.
pub struct RunMetrics;

impl RunMetrics {
    /// One platform request issued for operation `op`.
    pub fn record_request(op: &'static str) {
        counter!("fetch_requests_total", "op" => op).increment(1);
    }

    /// One retry scheduled for operation `op` after `delay`.
    pub fn record_retry(op: &str, delay: Duration) {
        counter!("fetch_retries_total", "op" => op.to_string()).increment(1);
        histogram!("retry_backoff_seconds").record(delay.as_secs_f64());
    }

    /// A recognized throttle message ended the run.
    pub fn record_throttle() {
        counter!("throttle_events_total").increment(1);
    }

    /// `count` posts collected.
    pub fn record_posts(count: u64) {
        counter!("posts_scraped_total").increment(count);
    }
}

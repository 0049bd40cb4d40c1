use std::env;
use std::sync::OnceLock;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::{info, warn};

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Initialize a Prometheus exporter listening on `0.0.0.0:<port>`.
///
/// The port is resolved from the provided environment variable name or the
/// supplied `default_port`. Returns a handle to the exporter if it was
/// started; repeated calls reuse the first one.
pub fn init_metrics(port_env: &str, default_port: u16) -> Option<&'static PrometheusHandle> {
    let port = env::var(port_env)
        .ok()
        .and_then(|raw| raw.parse::<u16>().ok())
        .unwrap_or(default_port);

    if let Some(existing) = PROMETHEUS_HANDLE.get() {
        return Some(existing);
    }

    match PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], port))
        .install_recorder()
    {
        Ok(handle) => {
            let _ = PROMETHEUS_HANDLE.set(handle);
            info!(metrics_port = port, "started prometheus exporter");
            PROMETHEUS_HANDLE.get()
        }
        Err(err) => {
            warn!(error = %err, metrics_port = port, "failed to start prometheus exporter");
            PROMETHEUS_HANDLE.get()
        }
    }
}

/// Record one scored pair and its overall score distribution.
pub fn record_pair_scored(overall_score: f64) {
    counter!("tm_match_pairs_scored_total").increment(1);
    histogram!("tm_match_overall_score").record(overall_score);
}

/// Record a pair whose computation or persistence failed.
pub fn record_pair_failed() {
    counter!("tm_match_pairs_failed_total").increment(1);
}

/// Record the shape of a finished batch run.
pub fn record_batch_summary(pairs_total: usize, pairs_failed: usize, kept: usize) {
    counter!("tm_match_batches_total").increment(1);
    counter!("tm_match_batch_pairs_total").increment(pairs_total as u64);
    counter!("tm_match_batch_pairs_failed_total").increment(pairs_failed as u64);
    gauge!("tm_match_batch_last_kept").set(kept as f64);
}

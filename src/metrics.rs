//! Pipeline metrics.
//!
//! Counters and histograms go through the `metrics` facade, so every call is a
//! no-op until [`init_metrics`] installs the Prometheus recorder. Short-lived
//! CLI runs render the snapshot to a textfile instead of serving it.

use std::path::Path;
use std::sync::OnceLock;
use tracing::{info, warn};

use crate::error::{MonitorError, Result};
use crate::table::ensure_parent;

static HANDLE: OnceLock<Option<metrics_exporter_prometheus::PrometheusHandle>> = OnceLock::new();

macro_rules! stage_metric {
    (counter, $name:literal) => {
        concat!("social_monitor_", $name, "_total")
    };
    (histogram, $name:literal) => {
        concat!("social_monitor_", $name)
    };
}

/// Install the Prometheus recorder. Idempotent; concurrent callers wait for the first.
pub fn init_metrics() {
    HANDLE.get_or_init(|| match metrics_exporter_prometheus::PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            info!("Prometheus recorder installed");
            Some(handle)
        }
        Err(e) => {
            warn!("Failed to install Prometheus recorder: {}", e);
            None
        }
    });
}

/// Current snapshot in Prometheus text format, if a recorder is installed
pub fn render() -> Option<String> {
    HANDLE.get().and_then(Option::as_ref).map(|h| h.render())
}

/// Write the current snapshot to `path` for a node-exporter textfile collector
pub fn render_to_file(path: &Path) -> Result<()> {
    let Some(body) = render() else {
        warn!("Metrics requested but no recorder is installed");
        return Ok(());
    };
    ensure_parent(path)?;
    std::fs::write(path, body).map_err(|e| MonitorError::write_file(path, e))?;
    info!("Wrote metrics snapshot to {}", path.display());
    Ok(())
}

/// Per-stage metrics for the classification pipeline
pub struct StageMetrics;

impl StageMetrics {
    pub fn record_stage_success(stage: &'static str, rows: usize, duration_secs: f64) {
        ::metrics::counter!(stage_metric!(counter, "stage_runs"), "stage" => stage).increment(1);
        ::metrics::counter!(stage_metric!(counter, "rows"), "stage" => stage).increment(rows as u64);
        ::metrics::histogram!(stage_metric!(histogram, "stage_duration_seconds"), "stage" => stage)
            .record(duration_secs);
    }

    pub fn record_stage_failure(stage: &'static str) {
        ::metrics::counter!(stage_metric!(counter, "stage_failures"), "stage" => stage).increment(1);
    }

    pub fn record_file_skipped() {
        ::metrics::counter!(stage_metric!(counter, "files_skipped")).increment(1);
    }

    pub fn record_sentiment(sentiment: &'static str) {
        ::metrics::counter!(stage_metric!(counter, "sentiment"), "sentiment" => sentiment).increment(1);
    }

    pub fn record_relevance(label: &'static str) {
        ::metrics::counter!(stage_metric!(counter, "relevance"), "label" => label).increment(1);
    }
}

use axum::{routing::get, Router};
use metrics::{describe_counter, describe_histogram, gauge};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

pub const ANALYSIS_REQUESTS: &str = "analysis_requests_total";
pub const ORACLE_FALLBACKS: &str = "oracle_fallbacks_total";
pub const MODEL_TRAININGS: &str = "model_trainings_total";
pub const ORACLE_CALL_MS: &str = "oracle_call_ms";

static HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Install the global Prometheus recorder once per process; later calls reuse it.
pub fn install() -> Result<PrometheusHandle, BuildError> {
    HANDLE
        .get_or_try_init(|| {
            let handle = PrometheusBuilder::new().install_recorder()?;
            describe_counter!(ANALYSIS_REQUESTS, "Requests to /components by input kind and mode");
            describe_counter!(ORACLE_FALLBACKS, "Oracle stages replaced by canned content");
            describe_counter!(MODEL_TRAININGS, "Scoring model fits by outcome");
            describe_histogram!(ORACLE_CALL_MS, "Oracle call latency in milliseconds");
            Ok(handle)
        })
        .cloned()
}

/// Static gauge: 1 when an oracle is wired in, 0 in demo mode.
pub fn record_oracle_configured(configured: bool) {
    gauge!("oracle_configured").set(if configured { 1.0 } else { 0.0 });
}

/// Router exposing `/metrics` in the Prometheus exposition format.
pub fn router<S>(handle: PrometheusHandle) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route(
        "/metrics",
        get(move || {
            let h = handle.clone();
            async move { h.render() }
        }),
    )
}

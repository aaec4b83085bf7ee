use axum::{routing::get, Router};
use metrics::counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

use crate::risk::RiskLevel;

// The recorder is process-global; a second install would fail.
static HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

#[derive(Clone)]
pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the Prometheus recorder (once per process) and return a handle to it.
    pub fn init() -> anyhow::Result<Self> {
        let handle = HANDLE.get_or_try_init(|| PrometheusBuilder::new().install_recorder())?;
        Ok(Self {
            handle: handle.clone(),
        })
    }

    /// Router exposing `/metrics` in the Prometheus exposition format.
    pub fn router<S>(&self) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}

pub fn record_classification(level: RiskLevel) {
    counter!("risk_classified_total", "level" => level.as_str()).increment(1);
}

pub fn record_summary_request() {
    counter!("risk_summary_requests_total").increment(1);
}

pub fn record_provider_call(provider: &'static str, ok: bool) {
    let outcome = if ok { "ok" } else { "error" };
    counter!("tone_provider_calls_total", "provider" => provider, "outcome" => outcome)
        .increment(1);
}

// src/lib.rs
// Public library surface for the binary and the integration tests.

pub mod api;
pub mod config;
pub mod emergency;
pub mod logging;
pub mod message;
pub mod metrics;
pub mod provider;
pub mod risk;
pub mod store;
pub mod tone;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::message::Message;
pub use crate::risk::{
    classify_message_risk, compute_risk_summary, MoodTrend, RiskAssessment, RiskLevel,
    RiskSummary,
};
pub use crate::tone::ToneAnalysis;

use anyhow::Context;
use tracing::info;

use crate::config::AppConfig;
use crate::store::MessageStore;

/// Wire config → state → router. The binary only adds the listener.
pub fn build_app(cfg: &AppConfig) -> anyhow::Result<axum::Router> {
    let provider = crate::provider::build_provider(&cfg.provider).context("build tone provider")?;
    info!(
        provider = provider.name(),
        enabled = cfg.provider.enabled,
        key_len = cfg.provider.api_key.len(),
        "tone provider ready"
    );

    let state = AppState::new(
        MessageStore::with_capacity(cfg.store.capacity),
        provider,
        cfg.emergency.cooldown_secs,
    );

    let metrics = if cfg.metrics.enabled {
        Some(crate::metrics::Metrics::init().context("install prometheus recorder")?)
    } else {
        None
    };

    Ok(router(state, metrics.as_ref()))
}

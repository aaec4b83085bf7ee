// src/provider/mod.rs
//! Tone analysis providers: trait + concrete backends + usage metering.
//!
//! A provider failure never reaches the risk pipeline as an error; callers
//! log it and keep the message's analysis absent.

pub mod mock;
pub mod openai;
pub mod usage;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

use crate::config::ProviderConfig;
use crate::tone::ToneAnalysis;

pub use mock::MockProvider;
pub use openai::OpenAiToneProvider;
pub use usage::{Clock, FixedClock, MeteredProvider, SystemClock, UsageLedger, UsageLimits};

/// Successful provider answer.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderReply {
    pub analysis: ToneAnalysis,
    /// As reported by the backend; 0 when unknown.
    pub tokens_used: u64,
}

#[async_trait]
pub trait ToneProvider: Send + Sync {
    async fn analyze(&self, text: &str) -> Result<ProviderReply>;
    /// Provider name for logs and metrics labels.
    fn name(&self) -> &'static str;
}

pub type DynToneProvider = Arc<dyn ToneProvider>;

/// Always fails; used when analysis is switched off.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledProvider;

#[async_trait]
impl ToneProvider for DisabledProvider {
    async fn analyze(&self, _text: &str) -> Result<ProviderReply> {
        anyhow::bail!("tone analysis is disabled")
    }

    fn name(&self) -> &'static str {
        "disabled"
    }
}

/// Build the configured provider, wrapped with daily usage limits.
pub fn build_provider(cfg: &ProviderConfig) -> Result<DynToneProvider> {
    if !cfg.enabled {
        return Ok(Arc::new(DisabledProvider));
    }

    let limits = UsageLimits {
        max_requests: cfg.daily_request_limit,
        max_tokens: cfg.daily_token_limit,
    };
    let ledger = Arc::new(UsageLedger::new(limits, Arc::new(SystemClock)));

    match cfg.kind.as_str() {
        "mock" => Ok(Arc::new(MeteredProvider::new(MockProvider, ledger))),
        "openai" => {
            if cfg.api_key.is_empty() {
                anyhow::bail!("provider kind 'openai' requires OPENAI_API_KEY");
            }
            let p = OpenAiToneProvider::new(
                &cfg.base_url,
                &cfg.model,
                &cfg.api_key,
                Duration::from_secs(cfg.timeout_secs),
            )?;
            Ok(Arc::new(MeteredProvider::new(p, ledger)))
        }
        other => anyhow::bail!("unsupported provider kind: {other}"),
    }
}

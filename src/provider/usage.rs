//! Per-day request/token budget for the tone provider.
//!
//! The ledger is an explicit object with an injected [`Clock`] so rollover
//! can be tested without waiting for midnight. Counters reset whenever the
//! clock's UTC date differs from the stored one.

use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use tracing::warn;

use super::{ProviderReply, ToneProvider};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock for tests.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self { now: Mutex::new(at) }
    }

    pub fn advance(&self, by: Duration) {
        let mut g = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *g += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// 0 means unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UsageLimits {
    pub max_requests: u32,
    pub max_tokens: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsageSnapshot {
    pub day: NaiveDate,
    pub requests: u32,
    pub tokens: u64,
}

pub struct UsageLedger {
    limits: UsageLimits,
    clock: Arc<dyn Clock>,
    state: Mutex<UsageSnapshot>,
}

impl UsageLedger {
    pub fn new(limits: UsageLimits, clock: Arc<dyn Clock>) -> Self {
        let day = clock.now().date_naive();
        Self {
            limits,
            clock,
            state: Mutex::new(UsageSnapshot {
                day,
                requests: 0,
                tokens: 0,
            }),
        }
    }

    /// Reserve one request. `false` when today's budget is spent.
    pub fn try_acquire(&self) -> bool {
        let mut s = self.current();
        let requests_left =
            self.limits.max_requests == 0 || s.requests < self.limits.max_requests;
        let tokens_left = self.limits.max_tokens == 0 || s.tokens < self.limits.max_tokens;
        if !(requests_left && tokens_left) {
            return false;
        }
        s.requests += 1;
        true
    }

    pub fn record_tokens(&self, tokens: u64) {
        let mut s = self.current();
        s.tokens = s.tokens.saturating_add(tokens);
    }

    pub fn snapshot(&self) -> UsageSnapshot {
        *self.current()
    }

    fn current(&self) -> std::sync::MutexGuard<'_, UsageSnapshot> {
        let today = self.clock.now().date_naive();
        let mut s = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if s.day != today {
            *s = UsageSnapshot {
                day: today,
                requests: 0,
                tokens: 0,
            };
        }
        s
    }
}

/// Wraps a provider with a [`UsageLedger`].
pub struct MeteredProvider<P> {
    inner: P,
    ledger: Arc<UsageLedger>,
}

impl<P: ToneProvider> MeteredProvider<P> {
    pub fn new(inner: P, ledger: Arc<UsageLedger>) -> Self {
        Self { inner, ledger }
    }

    pub fn ledger(&self) -> &UsageLedger {
        &self.ledger
    }
}

#[async_trait]
impl<P: ToneProvider> ToneProvider for MeteredProvider<P> {
    async fn analyze(&self, text: &str) -> Result<ProviderReply> {
        if !self.ledger.try_acquire() {
            let s = self.ledger.snapshot();
            warn!(
                provider = self.inner.name(),
                requests = s.requests,
                tokens = s.tokens,
                "daily tone-analysis budget exhausted"
            );
            anyhow::bail!("daily tone-analysis budget exhausted");
        }
        let reply = self.inner.analyze(text).await?;
        self.ledger.record_tokens(reply.tokens_used);
        Ok(reply)
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MockProvider;
    use chrono::TimeZone;

    fn clock() -> Arc<FixedClock> {
        Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2025, 5, 10, 23, 0, 0).unwrap(),
        ))
    }

    #[test]
    fn request_limit_blocks_until_next_day() {
        let c = clock();
        let ledger = UsageLedger::new(
            UsageLimits {
                max_requests: 2,
                max_tokens: 0,
            },
            c.clone(),
        );
        assert!(ledger.try_acquire());
        assert!(ledger.try_acquire());
        assert!(!ledger.try_acquire());

        c.advance(Duration::hours(2));
        assert!(ledger.try_acquire());
        assert_eq!(ledger.snapshot().requests, 1);
    }

    #[test]
    fn token_limit_blocks_once_reached() {
        let ledger = UsageLedger::new(
            UsageLimits {
                max_requests: 0,
                max_tokens: 100,
            },
            clock(),
        );
        assert!(ledger.try_acquire());
        ledger.record_tokens(100);
        assert!(!ledger.try_acquire());
    }

    #[tokio::test]
    async fn metered_provider_counts_tokens_and_refuses_past_budget() {
        let ledger = Arc::new(UsageLedger::new(
            UsageLimits {
                max_requests: 1,
                max_tokens: 0,
            },
            clock(),
        ));
        let p = MeteredProvider::new(MockProvider, ledger.clone());
        let reply = p.analyze("three word text").await.unwrap();
        assert_eq!(reply.tokens_used, 3);
        assert_eq!(ledger.snapshot().tokens, 3);
        assert!(p.analyze("again").await.is_err());
    }
}

// src/emergency.rs
//! Emergency protocol gate for High-risk messages.
//!
//! - First escalation always passes.
//! - Inside the cooldown further escalations are suppressed; the dashboard
//!   alert list still shows every High message.
//! - State changes only via `record`, after the caller escalated.

use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};

use crate::risk::{RiskAssessment, RiskLevel};

#[derive(Debug, Clone)]
pub struct EmergencyGate {
    cooldown: Duration,
    last_escalation: Option<DateTime<Utc>>,
    suppressed: u64,
}

/// Outcome of [`EmergencyGate::observe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Escalation {
    NotHighRisk,
    Escalated,
    Suppressed,
}

impl EmergencyGate {
    /// Negative cooldowns are treated as 0.
    pub fn new(cooldown_secs: i64) -> Self {
        Self {
            cooldown: Duration::seconds(cooldown_secs.max(0)),
            last_escalation: None,
            suppressed: 0,
        }
    }

    /// Does NOT mutate state.
    pub fn should_escalate(&self, now: DateTime<Utc>) -> bool {
        match self.last_escalation {
            None => true,
            Some(ts) => now.signed_duration_since(ts) >= self.cooldown,
        }
    }

    pub fn record(&mut self, now: DateTime<Utc>) {
        self.last_escalation = Some(now);
    }

    pub fn suppressed_count(&self) -> u64 {
        self.suppressed
    }

    /// Check + record in one step, with logging and metrics.
    pub fn observe(
        &mut self,
        message_id: &str,
        assessment: &RiskAssessment,
        now: DateTime<Utc>,
    ) -> Escalation {
        if assessment.risk_level != RiskLevel::High {
            return Escalation::NotHighRisk;
        }
        let trigger = assessment
            .trigger
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default();

        if self.should_escalate(now) {
            self.record(now);
            metrics::counter!("emergency_escalations_total").increment(1);
            warn!(
                target: "emergency",
                %message_id, %trigger,
                "high-risk message: emergency protocol engaged"
            );
            Escalation::Escalated
        } else {
            self.suppressed += 1;
            info!(
                target: "emergency",
                %message_id, %trigger, suppressed = self.suppressed,
                "high-risk message inside emergency cooldown"
            );
            Escalation::Suppressed
        }
    }
}

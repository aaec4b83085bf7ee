// src/risk/mod.rs
//! Risk pipeline: normalize → classify → aggregate.
//!
//! Everything in here is pure and synchronous. The HTTP handlers, the
//! contact intake and the emergency gate all go through these functions;
//! there is no second copy of the rules anywhere else.

pub mod classifier;
pub mod normalize;
pub mod summary;

pub use classifier::{
    assess, classify, classify_message_risk, RiskAssessment, RiskLevel, RiskTrigger, TermSource,
    HIGH_RISK_TERMS, HIGH_TOXICITY_THRESHOLD, MEDIUM_RISK_TERMS, MEDIUM_TOXICITY_THRESHOLD,
};
pub use normalize::NormalizedTone;
pub use summary::{compute_risk_summary, Alert, MoodTrend, RiskSummary};

use crate::message::Message;

/// Assessment for a stored message.
pub fn assess_message(m: &Message) -> RiskAssessment {
    assess(&m.text, &NormalizedTone::from_analysis(m.analysis.as_ref()))
}

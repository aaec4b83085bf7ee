//! # Risk classifier
//! Priority cascade over text + normalized tone. First match wins:
//!
//! 1. High: high-risk term, toxic above [`HIGH_TOXICITY_THRESHOLD`], or sadness + negative.
//! 2. Medium: medium-risk term, toxic above [`MEDIUM_TOXICITY_THRESHOLD`], or anger + negative.
//! 3. Low otherwise.
//!
//! Term matching is a substring test against the folded (NFKC + lowercase)
//! text, provider summary and keywords. Thresholds are strict (`>`).

use serde::{Deserialize, Serialize};
use std::fmt;

use super::normalize::{fold_text, NormalizedTone};
use crate::tone::{Emotion, Sentiment, ToneAnalysis, Toxicity};

/// Toxicity score that must be exceeded for a High classification.
pub const HIGH_TOXICITY_THRESHOLD: f64 = 0.8;
/// Toxicity score that must be exceeded for a Medium classification.
pub const MEDIUM_TOXICITY_THRESHOLD: f64 = 0.5;

/// Life-risk vocabulary, English and Spanish.
pub const HIGH_RISK_TERMS: &[&str] = &[
    "suicide", "kill", "death", "die", "murder", "hurt", "pain", "suicidio", "muerte", "matar",
    "dolor",
];

/// Distress vocabulary, English and Spanish.
pub const MEDIUM_RISK_TERMS: &[&str] = &[
    "depressed",
    "sad",
    "hopeless",
    "anxious",
    "worried",
    "scared",
    "depresión",
    "triste",
    "ansiedad",
];

/// Three-way classification. Serialized with the dashboard's Spanish labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskLevel {
    #[serde(rename = "bajo")]
    Low,
    #[serde(rename = "medio")]
    Medium,
    #[serde(rename = "alto")]
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "bajo",
            RiskLevel::Medium => "medio",
            RiskLevel::High => "alto",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a matched term was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TermSource {
    /// Message text or provider summary.
    Text,
    Keyword,
}

/// The rule that decided the level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum RiskTrigger {
    Keyword { term: String, source: TermSource },
    Toxicity { score: f64 },
    Emotion { emotion: Emotion, sentiment: Sentiment },
}

impl fmt::Display for RiskTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskTrigger::Keyword { term, .. } => write!(f, "term '{term}'"),
            RiskTrigger::Toxicity { score } => write!(f, "toxicity {score:.2}"),
            RiskTrigger::Emotion { emotion, sentiment } => write!(f, "{emotion} + {sentiment}"),
        }
    }
}

/// Level plus the rule that produced it (`None` for Low).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    pub risk_level: RiskLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger: Option<RiskTrigger>,
}

impl RiskAssessment {
    fn low() -> Self {
        Self {
            risk_level: RiskLevel::Low,
            trigger: None,
        }
    }

    fn fired(risk_level: RiskLevel, trigger: RiskTrigger) -> Self {
        Self {
            risk_level,
            trigger: Some(trigger),
        }
    }
}

/// Pure classification of a message. Total: never fails.
pub fn classify(text: &str, tone: &NormalizedTone) -> RiskLevel {
    assess(text, tone).risk_level
}

/// Convenience entry for callers holding the raw provider output.
pub fn classify_message_risk(text: &str, analysis: Option<&ToneAnalysis>) -> RiskLevel {
    classify(text, &NormalizedTone::from_analysis(analysis))
}

/// Same cascade as [`classify`], reporting which rule fired.
pub fn assess(text: &str, tone: &NormalizedTone) -> RiskAssessment {
    // Separator keeps a term from matching across the text/summary seam.
    let haystack = format!("{} {}", fold_text(text), tone.summary);
    let sentiment = tone.sentiment_or_neutral();
    let toxic_score = match tone.toxicity {
        Toxicity::Toxic => Some(tone.toxicity_score),
        Toxicity::Safe => None,
    };

    // High
    if let Some(t) = find_term(&haystack, &tone.keywords, HIGH_RISK_TERMS) {
        return RiskAssessment::fired(RiskLevel::High, t);
    }
    if let Some(score) = toxic_score.filter(|s| *s > HIGH_TOXICITY_THRESHOLD) {
        return RiskAssessment::fired(RiskLevel::High, RiskTrigger::Toxicity { score });
    }
    if tone.emotion == Emotion::Sadness && sentiment == Sentiment::Negative {
        return RiskAssessment::fired(
            RiskLevel::High,
            RiskTrigger::Emotion {
                emotion: Emotion::Sadness,
                sentiment,
            },
        );
    }

    // Medium
    if let Some(t) = find_term(&haystack, &tone.keywords, MEDIUM_RISK_TERMS) {
        return RiskAssessment::fired(RiskLevel::Medium, t);
    }
    if let Some(score) = toxic_score.filter(|s| *s > MEDIUM_TOXICITY_THRESHOLD) {
        return RiskAssessment::fired(RiskLevel::Medium, RiskTrigger::Toxicity { score });
    }
    if tone.emotion == Emotion::Anger && sentiment == Sentiment::Negative {
        return RiskAssessment::fired(
            RiskLevel::Medium,
            RiskTrigger::Emotion {
                emotion: Emotion::Anger,
                sentiment,
            },
        );
    }

    RiskAssessment::low()
}

fn find_term(haystack: &str, keywords: &[String], terms: &[&str]) -> Option<RiskTrigger> {
    terms.iter().find_map(|term| {
        let source = if haystack.contains(term) {
            TermSource::Text
        } else if keywords.iter().any(|k| k.contains(term)) {
            TermSource::Keyword
        } else {
            return None;
        };
        Some(RiskTrigger::Keyword {
            term: (*term).to_string(),
            source,
        })
    })
}

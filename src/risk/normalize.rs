//! Analysis normalizer: raw, possibly absent provider output → fully
//! populated record. Absence is a normal steady state, never an error.

use unicode_normalization::UnicodeNormalization;

use crate::tone::{Emotion, Sentiment, ToneAnalysis, Toxicity};

/// Matching form for free text: NFKC composition, then Unicode lowercase.
/// Decomposed accents ("depresio\u{301}n") compare equal to precomposed ones.
pub fn fold_text(input: &str) -> String {
    input.nfkc().collect::<String>().to_lowercase()
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NormalizedTone {
    /// Kept optional: the mood trend only samples messages with a defined sentiment.
    pub sentiment: Option<Sentiment>,
    pub emotion: Emotion,
    pub toxicity: Toxicity,
    /// In `[0, 1]`; forced to 0 unless `toxicity` is `Toxic`.
    pub toxicity_score: f64,
    /// Folded keyword texts (see [`fold_text`]), provider order preserved.
    pub keywords: Vec<String>,
    /// Folded summary, empty when absent.
    pub summary: String,
}

impl NormalizedTone {
    pub fn from_analysis(analysis: Option<&ToneAnalysis>) -> Self {
        let Some(a) = analysis else {
            return Self::default();
        };

        let toxicity = a
            .toxicity
            .as_deref()
            .and_then(Toxicity::parse)
            .unwrap_or_default();

        let toxicity_score = match toxicity {
            Toxicity::Toxic => a.toxicity_score.map(clamp01).unwrap_or(0.0),
            Toxicity::Safe => 0.0,
        };

        let keywords = a
            .keywords
            .iter()
            .filter_map(|k| k.as_text())
            .map(|k| fold_text(&k))
            .filter(|k| !k.trim().is_empty())
            .collect();

        Self {
            sentiment: a.sentiment.as_deref().and_then(Sentiment::parse),
            emotion: a
                .emotion
                .as_deref()
                .and_then(Emotion::parse)
                .unwrap_or_default(),
            toxicity,
            toxicity_score,
            keywords,
            summary: fold_text(a.summary.as_deref().unwrap_or_default()),
        }
    }

    /// Sentiment for rule comparisons; absent reads as neutral.
    pub fn sentiment_or_neutral(&self) -> Sentiment {
        self.sentiment.unwrap_or(Sentiment::Neutral)
    }
}

fn clamp01(x: f64) -> f64 {
    if x.is_nan() {
        0.0
    } else {
        x.clamp(0.0, 1.0)
    }
}

//! Deterministic offline provider for local runs and tests.
//!
//! Tiny lexicon scan, nothing clever: enough to produce realistic-looking
//! analyses so the dashboard has something to aggregate.

use anyhow::Result;
use async_trait::async_trait;

use super::{ProviderReply, ToneProvider};
use crate::tone::ToneAnalysis;

const NEGATIVE: &[&str] = &[
    "sad", "alone", "angry", "hate", "hopeless", "tired", "afraid", "scared", "cry", "triste",
];
const POSITIVE: &[&str] = &[
    "thanks", "thank", "great", "love", "happy", "glad", "gracias", "feliz",
];
const ANGER: &[&str] = &["angry", "hate", "furious", "stupid"];
const SADNESS: &[&str] = &["sad", "alone", "cry", "triste"];
const FEAR: &[&str] = &["afraid", "scared", "anxious", "worried"];
const TOXIC: &[&str] = &["idiot", "stupid", "hate you"];

#[derive(Debug, Clone, Copy, Default)]
pub struct MockProvider;

impl MockProvider {
    pub fn analyze_sync(text: &str) -> ToneAnalysis {
        let lower = text.to_lowercase();
        let hits = |list: &[&str]| list.iter().filter(|w| lower.contains(**w)).count();

        let neg = hits(NEGATIVE);
        let pos = hits(POSITIVE);
        let sentiment = if neg > pos {
            "negative"
        } else if pos > neg {
            "positive"
        } else {
            "neutral"
        };

        let emotion = if hits(ANGER) > 0 {
            "anger"
        } else if hits(SADNESS) > 0 {
            "sadness"
        } else if hits(FEAR) > 0 {
            "fear"
        } else if pos > 0 {
            "joy"
        } else {
            "neutral"
        };

        let toxic_hits = hits(TOXIC);
        let (toxicity, score) = if toxic_hits > 0 {
            ("toxic", (0.45 + 0.2 * toxic_hits as f64).min(1.0))
        } else {
            ("safe", 0.0)
        };

        let keywords: Vec<&str> = lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| w.chars().count() > 4)
            .take(5)
            .collect();

        ToneAnalysis::default()
            .with_sentiment(sentiment)
            .with_emotion(emotion)
            .with_toxicity(toxicity, score)
            .with_keywords(keywords)
            .with_summary(text.chars().take(140).collect::<String>())
    }
}

#[async_trait]
impl ToneProvider for MockProvider {
    async fn analyze(&self, text: &str) -> Result<ProviderReply> {
        let analysis = Self::analyze_sync(text);
        Ok(ProviderReply {
            analysis,
            tokens_used: text.split_whitespace().count() as u64,
        })
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sad_text_reads_negative_sadness() {
        let a = MockProvider::analyze_sync("I feel so alone and sad");
        assert_eq!(a.sentiment.as_deref(), Some("negative"));
        assert_eq!(a.emotion.as_deref(), Some("sadness"));
        assert_eq!(a.toxicity.as_deref(), Some("safe"));
    }

    #[test]
    fn thanks_reads_positive() {
        let a = MockProvider::analyze_sync("Thanks, great work!");
        assert_eq!(a.sentiment.as_deref(), Some("positive"));
        assert_eq!(a.emotion.as_deref(), Some("joy"));
    }

    #[test]
    fn insults_are_toxic() {
        let a = MockProvider::analyze_sync("you idiot, stupid site");
        assert_eq!(a.toxicity.as_deref(), Some("toxic"));
        assert!(a.toxicity_score.unwrap() > 0.8);
    }
}

//! # Aggregator
//! Dashboard-level view over a newest-first message collection.
//!
//! The caller owns ordering; nothing here re-sorts. Computed fresh on every
//! call and never stored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::classifier::{classify, RiskLevel};
use super::normalize::NormalizedTone;
use crate::message::Message;
use crate::tone::Sentiment;

pub const ALERT_TITLE: &str = "High-Risk Message Detected";
pub const MAX_ALERTS: usize = 5;
pub const EXCERPT_CHARS: usize = 100;
/// Most recent messages sampled for the mood trend.
pub const MOOD_WINDOW: usize = 10;
pub const DECLINING_RATIO: f64 = 0.6;
pub const IMPROVING_RATIO: f64 = 0.3;
/// Overall risk reported for an empty collection.
pub const EMPTY_OVERALL_RISK: u32 = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoodTrend {
    Improving,
    Declining,
    Stable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub message_id: String,
    pub title: String,
    pub message_excerpt: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskSummary {
    pub high_count: usize,
    pub medium_count: usize,
    pub low_count: usize,
    pub mood_trend: MoodTrend,
    /// Newest first, at most [`MAX_ALERTS`].
    pub alerts: Vec<Alert>,
    /// 0..=100
    pub safety_percentage: u32,
    /// 0..=100
    pub overall_risk_level: u32,
}

impl RiskSummary {
    pub fn total(&self) -> usize {
        self.high_count + self.medium_count + self.low_count
    }
}

/// Summarize `messages`, which must be ordered newest-first.
pub fn compute_risk_summary(messages: &[Message]) -> RiskSummary {
    let mut high = 0usize;
    let mut medium = 0usize;
    let mut low = 0usize;
    let mut alerts = Vec::with_capacity(MAX_ALERTS);
    let mut mood_sample: Vec<Sentiment> = Vec::with_capacity(MOOD_WINDOW);

    for (i, m) in messages.iter().enumerate() {
        let tone = NormalizedTone::from_analysis(m.analysis.as_ref());

        if i < MOOD_WINDOW {
            if let Some(s) = tone.sentiment {
                mood_sample.push(s);
            }
        }

        match classify(&m.text, &tone) {
            RiskLevel::High => {
                high += 1;
                if alerts.len() < MAX_ALERTS {
                    alerts.push(alert_for(m));
                }
            }
            RiskLevel::Medium => medium += 1,
            RiskLevel::Low => low += 1,
        }
    }

    let total = messages.len();
    RiskSummary {
        high_count: high,
        medium_count: medium,
        low_count: low,
        mood_trend: mood_trend(&mood_sample),
        alerts,
        safety_percentage: safety_percentage(low, total),
        overall_risk_level: overall_risk_level(high, medium, total),
    }
}

fn alert_for(m: &Message) -> Alert {
    let head: String = m.text.chars().take(EXCERPT_CHARS).collect();
    Alert {
        message_id: m.id.clone(),
        title: ALERT_TITLE.to_string(),
        message_excerpt: format!("{head}..."),
        timestamp: m.submitted_at,
    }
}

/// Trend from the sentiments of the sampled window.
pub fn mood_trend(sample: &[Sentiment]) -> MoodTrend {
    if sample.is_empty() {
        return MoodTrend::Stable;
    }
    let negative = sample.iter().filter(|s| **s == Sentiment::Negative).count();
    let ratio = negative as f64 / sample.len() as f64;
    if ratio > DECLINING_RATIO {
        MoodTrend::Declining
    } else if ratio < IMPROVING_RATIO {
        MoodTrend::Improving
    } else {
        MoodTrend::Stable
    }
}

pub fn safety_percentage(low: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (100.0 * low as f64 / total as f64).round() as u32
}

pub fn overall_risk_level(high: usize, medium: usize, total: usize) -> u32 {
    if total == 0 {
        return EMPTY_OVERALL_RISK;
    }
    ((high as f64 * 100.0 + medium as f64 * 50.0) / total as f64).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tone::ToneAnalysis;
    use chrono::TimeZone;

    fn msg(id: &str, text: &str) -> Message {
        let ts = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        Message::new(id, text, ts).unwrap()
    }

    #[test]
    fn excerpt_keeps_first_hundred_chars_plus_ellipsis() {
        let text = format!("kill {}", "á".repeat(200));
        let s = compute_risk_summary(&[msg("a", &text)]);
        let ex = &s.alerts[0].message_excerpt;
        assert!(ex.ends_with("..."));
        assert_eq!(ex.chars().count(), EXCERPT_CHARS + 3);

        // short texts still get the ellipsis
        let s = compute_risk_summary(&[msg("b", "I could die")]);
        assert_eq!(s.alerts[0].message_excerpt, "I could die...");
        assert_eq!(s.alerts[0].title, ALERT_TITLE);
    }

    #[test]
    fn mood_window_only_counts_defined_sentiments() {
        // 3 negatives + 7 without sentiment inside the window → sample of 3, ratio 1.0
        let mut ms = Vec::new();
        for i in 0..3 {
            ms.push(
                msg(&format!("n{i}"), "hello")
                    .with_analysis(ToneAnalysis::default().with_sentiment("negative")),
            );
        }
        for i in 0..7 {
            ms.push(msg(&format!("x{i}"), "hello"));
        }
        // older positives fall outside the window
        for i in 0..20 {
            ms.push(
                msg(&format!("p{i}"), "hello")
                    .with_analysis(ToneAnalysis::default().with_sentiment("positive")),
            );
        }
        assert_eq!(compute_risk_summary(&ms).mood_trend, MoodTrend::Declining);
    }

    #[test]
    fn mood_thresholds_are_strict() {
        use Sentiment::*;
        // 6/10 = 0.6 is not > 0.6
        let mut s = vec![Negative; 6];
        s.extend([Positive; 4]);
        assert_eq!(mood_trend(&s), MoodTrend::Stable);
        // 3/10 = 0.3 is not < 0.3
        let mut s = vec![Negative; 3];
        s.extend([Neutral; 7]);
        assert_eq!(mood_trend(&s), MoodTrend::Stable);
        // 2/10 → improving
        let mut s = vec![Negative; 2];
        s.extend([Neutral; 8]);
        assert_eq!(mood_trend(&s), MoodTrend::Improving);
    }

    #[test]
    fn percentages_round_half_away_from_zero() {
        assert_eq!(safety_percentage(1, 3), 33);
        assert_eq!(safety_percentage(2, 3), 67);
        assert_eq!(overall_risk_level(1, 0, 2), 50);
        assert_eq!(overall_risk_level(0, 1, 8), 6); // 6.25
        assert_eq!(overall_risk_level(0, 1, 4), 13); // 12.5
        assert_eq!(overall_risk_level(0, 0, 0), EMPTY_OVERALL_RISK);
    }

    #[test]
    fn summary_serializes_with_dashboard_field_names() {
        let v = serde_json::to_value(compute_risk_summary(&[])).unwrap();
        for key in [
            "highCount",
            "mediumCount",
            "lowCount",
            "moodTrend",
            "alerts",
            "safetyPercentage",
            "overallRiskLevel",
        ] {
            assert!(v.get(key).is_some(), "missing {key}");
        }
        assert_eq!(v["moodTrend"], "stable");
    }
}

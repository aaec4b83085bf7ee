//! # Tone analysis
//! Input shape produced by the external tone/sentiment provider, plus the
//! closed label sets the classifier compares against.
//!
//! Every field is optional on the wire. Label fields stay as raw strings here;
//! they are parsed into [`Sentiment`], [`Emotion`] and [`Toxicity`] by the
//! normalizer (`crate::risk::normalize`), which is the only place that deals
//! with missing or unexpected values.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Raw provider result for one message. Owned by the message, no identity.
///
/// Each field deserializes on its own: `null`, a wrong type or a junk value
/// leaves that field at its default and never rejects the whole record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToneAnalysis {
    #[serde(
        default,
        deserialize_with = "lenient_label",
        skip_serializing_if = "Option::is_none"
    )]
    pub sentiment: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_label",
        skip_serializing_if = "Option::is_none"
    )]
    pub emotion: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_label",
        skip_serializing_if = "Option::is_none"
    )]
    pub toxicity: Option<String>,
    #[serde(
        default,
        alias = "toxicity_score",
        deserialize_with = "lenient_score",
        skip_serializing_if = "Option::is_none"
    )]
    pub toxicity_score: Option<f64>,
    /// Provider-reported relevance order.
    #[serde(default, deserialize_with = "lenient_keywords")]
    pub keywords: Vec<Keyword>,
    #[serde(
        default,
        deserialize_with = "lenient_label",
        skip_serializing_if = "Option::is_none"
    )]
    pub summary: Option<String>,
}

/// One keyword entry as the provider reports it.
///
/// Providers send either bare strings or `{word, score}` records; anything
/// else is kept verbatim and coerced (or dropped) during normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Keyword {
    Plain(String),
    Scored {
        word: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        score: Option<f64>,
    },
    Other(Value),
}

impl Keyword {
    /// Text used for term scanning. `None` when the entry carries nothing usable.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Keyword::Plain(s) => Some(s.clone()),
            Keyword::Scored { word, .. } => Some(word.clone()),
            Keyword::Other(v) => coerce_value(v),
        }
    }

    fn from_value(v: Value) -> Self {
        match v {
            Value::String(s) => Keyword::Plain(s),
            Value::Object(map) => match map.get("word").and_then(Value::as_str).map(String::from) {
                Some(word) => Keyword::Scored {
                    word,
                    score: map.get("score").and_then(Value::as_f64),
                },
                None => Keyword::Other(Value::Object(map)),
            },
            other => Keyword::Other(other),
        }
    }
}

impl From<&str> for Keyword {
    fn from(s: &str) -> Self {
        Keyword::Plain(s.to_string())
    }
}

// ---- lenient field readers ----

/// Strings pass through, numbers and bools are stringified, anything else is absent.
fn lenient_label<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    let v = Option::<Value>::deserialize(d)?;
    Ok(match v {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

/// Numbers or numeric strings (`"0.1"`); anything else is absent.
fn lenient_score<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    let v = Option::<Value>::deserialize(d)?;
    Ok(match v {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}

/// Arrays keep every entry; a lone string is one keyword; anything else is empty.
fn lenient_keywords<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<Keyword>, D::Error> {
    let v = Option::<Value>::deserialize(d)?;
    Ok(match v {
        Some(Value::Array(items)) => items.into_iter().map(Keyword::from_value).collect(),
        Some(Value::String(s)) => vec![Keyword::Plain(s)],
        _ => Vec::new(),
    })
}

/// Reader for an optional analysis embedded in a larger payload. A value
/// that is not an object reads as absent.
pub fn lenient_analysis<'de, D: Deserializer<'de>>(
    d: D,
) -> Result<Option<ToneAnalysis>, D::Error> {
    let v = Option::<Value>::deserialize(d)?;
    Ok(v.and_then(ToneAnalysis::from_value))
}

fn coerce_value(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Object(map) => ["word", "text", "keyword", "term"]
            .iter()
            .find_map(|k| map.get(*k).and_then(Value::as_str))
            .map(str::to_string),
        Value::Null | Value::Array(_) => None,
    }
}

impl ToneAnalysis {
    /// Lenient parse of a provider payload. Only a non-object payload is
    /// reported as absent; inside an object, bad fields fall back one by one.
    pub fn from_value(v: Value) -> Option<Self> {
        match v {
            Value::Object(_) => serde_json::from_value(v).ok(),
            _ => None,
        }
    }

    // Builder helpers, mostly for callers assembling fixtures by hand.

    pub fn with_sentiment(mut self, s: impl Into<String>) -> Self {
        self.sentiment = Some(s.into());
        self
    }

    pub fn with_emotion(mut self, e: impl Into<String>) -> Self {
        self.emotion = Some(e.into());
        self
    }

    pub fn with_toxicity(mut self, label: impl Into<String>, score: f64) -> Self {
        self.toxicity = Some(label.into());
        self.toxicity_score = Some(score);
        self
    }

    pub fn with_keywords<I, K>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<Keyword>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_summary(mut self, s: impl Into<String>) -> Self {
        self.summary = Some(s.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "positive" => Some(Sentiment::Positive),
            "negative" => Some(Sentiment::Negative),
            "neutral" => Some(Sentiment::Neutral),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Joy,
    Sadness,
    Anger,
    Fear,
    Surprise,
    Disgust,
    #[default]
    Neutral,
}

impl Emotion {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "joy" => Some(Emotion::Joy),
            "sadness" => Some(Emotion::Sadness),
            "anger" => Some(Emotion::Anger),
            "fear" => Some(Emotion::Fear),
            "surprise" => Some(Emotion::Surprise),
            "disgust" => Some(Emotion::Disgust),
            "neutral" => Some(Emotion::Neutral),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Toxicity {
    Toxic,
    #[default]
    Safe,
}

impl Toxicity {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "toxic" => Some(Toxicity::Toxic),
            "safe" => Some(Toxicity::Safe),
            _ => None,
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        })
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Emotion::Joy => "joy",
            Emotion::Sadness => "sadness",
            Emotion::Anger => "anger",
            Emotion::Fear => "fear",
            Emotion::Surprise => "surprise",
            Emotion::Disgust => "disgust",
            Emotion::Neutral => "neutral",
        })
    }
}

//! Inbound contact-form message.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::tone::ToneAnalysis;

/// Upper bound on message length, in characters.
pub const MAX_TEXT_CHARS: usize = 1000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub text: String,
    pub submitted_at: DateTime<Utc>,
    /// Absent until the tone provider has answered (or when it failed).
    #[serde(
        default,
        deserialize_with = "crate::tone::lenient_analysis",
        skip_serializing_if = "Option::is_none"
    )]
    pub analysis: Option<ToneAnalysis>,
}

/// Rejection reasons for a contact submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextError {
    Empty,
    TooLong { chars: usize },
}

impl fmt::Display for TextError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextError::Empty => f.write_str("message must not be empty"),
            TextError::TooLong { chars } => write!(
                f,
                "message is {chars} characters long, limit is {MAX_TEXT_CHARS}"
            ),
        }
    }
}

impl std::error::Error for TextError {}

impl Message {
    /// Build a validated message. Surrounding whitespace is trimmed first.
    pub fn new(
        id: impl Into<String>,
        text: &str,
        submitted_at: DateTime<Utc>,
    ) -> Result<Self, TextError> {
        let text = validate_text(text)?;
        Ok(Self {
            id: id.into(),
            text,
            submitted_at,
            analysis: None,
        })
    }

    pub fn with_analysis(mut self, analysis: ToneAnalysis) -> Self {
        self.analysis = Some(analysis);
        self
    }
}

pub fn validate_text(raw: &str) -> Result<String, TextError> {
    let t = raw.trim();
    let chars = t.chars().count();
    if chars == 0 {
        return Err(TextError::Empty);
    }
    if chars > MAX_TEXT_CHARS {
        return Err(TextError::TooLong { chars });
    }
    Ok(t.to_string())
}

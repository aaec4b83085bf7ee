//! OpenAI-compatible chat-completions backend (JSON mode).

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{ProviderReply, ToneProvider};
use crate::tone::ToneAnalysis;

const SYSTEM_PROMPT: &str = r#"You annotate messages sent through a contact form. Messages may be in English or Spanish.
Respond ONLY with a JSON object of this shape:
{"sentiment": "positive|negative|neutral",
 "emotion": "joy|sadness|anger|fear|surprise|disgust|neutral",
 "toxicity": "toxic|safe",
 "toxicityScore": <0.0-1.0>,
 "keywords": ["<up to 5 salient terms, most relevant first>"],
 "summary": "<one sentence in the message's language>"}"#;

pub struct OpenAiToneProvider {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    total_tokens: u64,
}

impl OpenAiToneProvider {
    pub fn new(base_url: &str, model: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("tone-risk/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(4))
            .timeout(timeout)
            .build()
            .context("build reqwest client")?;
        Ok(Self {
            http,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            model: model.to_string(),
            api_key: api_key.to_string(),
        })
    }
}

#[async_trait]
impl ToneProvider for OpenAiToneProvider {
    async fn analyze(&self, text: &str) -> Result<ProviderReply> {
        let req = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: text,
                },
            ],
            temperature: 0.1,
            max_tokens: 300,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        let resp = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&req)
            .send()
            .await
            .context("tone provider request failed")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("tone provider returned {status}: {body}");
        }

        let body: ChatResponse = resp.json().await.context("parse provider response")?;
        let content = body
            .choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .context("empty provider response")?;

        let analysis = parse_analysis(content).context("provider content is not a tone analysis")?;
        Ok(ProviderReply {
            analysis,
            tokens_used: body.usage.map(|u| u.total_tokens).unwrap_or(0),
        })
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

/// Models sometimes wrap the JSON in a fenced block; strip it before parsing.
pub(crate) fn parse_analysis(content: &str) -> Option<ToneAnalysis> {
    let trimmed = content.trim();
    let inner = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|s| s.strip_suffix("```"))
        .unwrap_or(trimmed);
    let value: serde_json::Value = serde_json::from_str(inner.trim()).ok()?;
    ToneAnalysis::from_value(value)
}

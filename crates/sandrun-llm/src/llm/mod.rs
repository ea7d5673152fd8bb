//! LLM HTTP client for chat completions.
//!
//! Speaks the OpenAI-compatible `/chat/completions` format, which also covers
//! DeepSeek, Qwen, Ollama and most self-hosted gateways.

use serde::{Deserialize, Serialize};
use thiserror::Error;

mod openai;


/// Errors from talking to the completion service.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("LLM API request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("LLM API error ({status}): {body}")]
    Status { status: u16, body: String },

    #[error("failed to parse LLM API response: {0}")]
    Decode(#[source] reqwest::Error),

    #[error("LLM response contained no message content")]
    EmptyCompletion,
}

/// LLM client for OpenAI-compatible APIs.
pub struct LlmClient {
    http: reqwest::Client,
    api_base: String,
    api_key: String,
}

impl LlmClient {
    pub fn new(api_base: &str, api_key: &str) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(300))
            .build()
            .map_err(LlmError::Client)?;
        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }
}

// ─── Response types ─────────────────────────────────────────────────────────
// id/model/usage/finish_reason are part of the wire format but only logged.

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub model: String,
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
}

impl ChatCompletionResponse {
    /// Text of the first choice, if any.
    pub fn first_content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
    }
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub index: u32,
    pub message: ChoiceMessage,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub role: String,
    pub content: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Usage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

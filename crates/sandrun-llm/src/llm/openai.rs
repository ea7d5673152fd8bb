//! OpenAI-compatible API implementation.

use serde_json::json;

use crate::types::ChatMessage;

use super::{ChatCompletionResponse, LlmClient, LlmError};

impl LlmClient {
    /// Non-streaming chat completion call.
    pub async fn chat_completion(
        &self,
        model: &str,
        messages: &[ChatMessage],
        temperature: Option<f64>,
        max_tokens: Option<u32>,
    ) -> Result<ChatCompletionResponse, LlmError> {
        let url = format!("{}/chat/completions", self.api_base);

        let mut body = json!({
            "model": model,
            "messages": messages,
        });

        if let Some(temp) = temperature {
            body["temperature"] = json!(temp);
        }
        if let Some(max) = max_tokens {
            body["max_tokens"] = json!(max);
        }

        tracing::debug!(%url, model, messages = messages.len(), "Sending chat completion");

        let resp = self
            .http
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body_text = resp.text().await.unwrap_or_default();
            return Err(LlmError::Status {
                status: status.as_u16(),
                body: body_text,
            });
        }

        let response: ChatCompletionResponse = resp.json().await.map_err(LlmError::Decode)?;

        if let Some(ref usage) = response.usage {
            tracing::debug!(
                model = %response.model,
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Chat completion finished"
            );
        }

        Ok(response)
    }
}

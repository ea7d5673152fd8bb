//! The code-generation seam used by the run loop.

use async_trait::async_trait;
use sandrun_core::config::LlmConfig;
use sandrun_core::observability;

use crate::fences::strip_code_fences;
use crate::llm::{LlmClient, LlmError};
use crate::prompt::PromptCatalog;
use crate::types::ChatMessage;

/// A script produced by a generator, fences already removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedScript {
    pub task: String,
    pub code: String,
}

/// Produces one script per call.
#[async_trait]
pub trait CodeGenerator: Send + Sync {
    async fn generate(&self) -> Result<GeneratedScript, LlmError>;
}

/// [`CodeGenerator`] backed by a chat-completion model.
pub struct LlmScriptGenerator {
    client: LlmClient,
    model: String,
    temperature: f64,
    max_tokens: u32,
    catalog: PromptCatalog,
}

impl LlmScriptGenerator {
    pub fn new(client: LlmClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
            temperature: LlmConfig::DEFAULT_TEMPERATURE,
            max_tokens: LlmConfig::DEFAULT_MAX_TOKENS,
            catalog: PromptCatalog::default(),
        }
    }

    /// Build from a validated config (see [`LlmConfig::require`]).
    pub fn from_config(cfg: &LlmConfig) -> Result<Self, LlmError> {
        let client = LlmClient::new(&cfg.api_base, &cfg.api_key)?;
        Ok(Self::new(client, cfg.model.clone())
            .with_temperature(cfg.temperature)
            .with_max_tokens(cfg.max_tokens))
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_catalog(mut self, catalog: PromptCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl CodeGenerator for LlmScriptGenerator {
    async fn generate(&self) -> Result<GeneratedScript, LlmError> {
        let task = self.catalog.pick(&mut rand::thread_rng()).to_string();
        let messages = vec![
            ChatMessage::system(self.catalog.system_prompt()),
            ChatMessage::user(self.catalog.user_message(&task)),
        ];

        let response = self
            .client
            .chat_completion(
                &self.model,
                &messages,
                Some(self.temperature),
                Some(self.max_tokens),
            )
            .await?;

        let raw = response.first_content().ok_or(LlmError::EmptyCompletion)?;
        let code = strip_code_fences(raw);
        if code.is_empty() {
            return Err(LlmError::EmptyCompletion);
        }

        observability::audit_script_generated(&self.model, code.len());
        Ok(GeneratedScript { task, code })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn server_replying(content: serde_json::Value) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"index": 0, "message": {"role": "assistant", "content": content}}]
            })))
            .mount(&server)
            .await;
        server
    }

    fn generator_for(server: &MockServer) -> LlmScriptGenerator {
        let client = LlmClient::new(&server.uri(), "sk-test").unwrap();
        LlmScriptGenerator::new(client, "gpt-3.5-turbo")
    }

    #[tokio::test]
    async fn test_generate_strips_fences() {
        let server = server_replying(json!("```javascript\nconsole.log(42);\n```")).await;
        let script = generator_for(&server).generate().await.unwrap();

        assert_eq!(script.code, "console.log(42);");
        assert!(PromptCatalog::default().tasks().contains(&script.task));
    }

    #[tokio::test]
    async fn test_generate_uses_custom_catalog() {
        let server = server_replying(json!("print(2 + 2)")).await;
        let catalog = PromptCatalog::with_tasks(vec!["Add two numbers.".to_string()]);
        let script = generator_for(&server)
            .with_catalog(catalog)
            .generate()
            .await
            .unwrap();

        assert_eq!(script.task, "Add two numbers.");
        assert_eq!(script.code, "print(2 + 2)");
    }

    #[tokio::test]
    async fn test_generate_null_content_is_error() {
        let server = server_replying(serde_json::Value::Null).await;
        let err = generator_for(&server).generate().await.unwrap_err();
        assert!(matches!(err, LlmError::EmptyCompletion));
    }

    #[tokio::test]
    async fn test_generate_fence_only_is_error() {
        let server = server_replying(json!("```js\n```")).await;
        let err = generator_for(&server).generate().await.unwrap_err();
        assert!(matches!(err, LlmError::EmptyCompletion));
    }

    #[test]
    fn test_from_config_applies_settings() {
        let cfg = LlmConfig {
            api_base: "http://localhost:1/v1".to_string(),
            api_key: "sk".to_string(),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.2,
            max_tokens: 64,
        };
        let generator = LlmScriptGenerator::from_config(&cfg).unwrap();
        assert_eq!(generator.model(), "gpt-4o-mini");
        assert_eq!(generator.max_tokens, 64);
        assert_eq!(generator.temperature, 0.2);
    }
}

//! Config structs grouped by concern, loaded from the environment.

use super::env_keys::{llm, observability as obv_keys, sandbox};
use super::loader::{env_bool, env_optional, env_or, env_parse, load_dotenv};
use std::path::PathBuf;
use thiserror::Error;

/// Default directory shared by the sandbox for logs and sockets.
pub const DEFAULT_SANDBOX_DIR: &str = "/tmp/hyperlight-nanvix";

/// Default directory where generated scripts are written before execution.
pub const DEFAULT_SCRIPT_DIR: &str = "/tmp/hyperlight-nanvix-ai";

/// Errors raised while turning the environment into a usable config.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key} environment variable is required")]
    MissingCredential { key: &'static str },

    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

/// LLM API settings
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_base: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
}

impl LlmConfig {
    pub const DEFAULT_API_BASE: &'static str = "https://api.openai.com/v1";
    pub const DEFAULT_MODEL: &'static str = "gpt-3.5-turbo";
    pub const DEFAULT_TEMPERATURE: f64 = 0.7;
    pub const DEFAULT_MAX_TOKENS: u32 = 500;

    /// Load from the environment (reads `.env` first). A missing key is left
    /// empty; use [`LlmConfig::require`] before making any request.
    pub fn from_env() -> Self {
        load_dotenv();
        Self {
            api_base: env_or(llm::API_BASE, llm::API_BASE_ALIASES, || {
                Self::DEFAULT_API_BASE.to_string()
            }),
            api_key: env_or(llm::API_KEY, llm::API_KEY_ALIASES, String::new),
            model: env_or(llm::MODEL, llm::MODEL_ALIASES, || Self::DEFAULT_MODEL.to_string()),
            temperature: env_parse(llm::TEMPERATURE, &[], Self::DEFAULT_TEMPERATURE),
            max_tokens: env_parse(llm::MAX_TOKENS, &[], Self::DEFAULT_MAX_TOKENS),
        }
    }

    /// Reject configs that cannot authenticate.
    pub fn require(self) -> Result<Self, ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::MissingCredential {
                key: llm::API_KEY_ALIASES[0],
            });
        }
        if self.api_base.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: llm::API_BASE,
                value: self.api_base,
            });
        }
        Ok(self)
    }
}

/// Sandbox runtime settings
#[derive(Debug, Clone)]
pub struct SandboxSettings {
    pub log_directory: PathBuf,
    pub tmp_directory: PathBuf,
    pub script_directory: PathBuf,
    /// Explicit runner executable; `None` means search `PATH`
    pub runner: Option<String>,
    /// Backend name (`runner` or `direct`)
    pub backend: String,
    /// Registry cache root override
    pub registry_dir: Option<PathBuf>,
    pub max_memory_mb: Option<u64>,
    pub timeout_secs: Option<u64>,
}

impl SandboxSettings {
    pub fn from_env() -> Self {
        load_dotenv();
        Self {
            log_directory: env_or(sandbox::LOG_DIR, &[], || DEFAULT_SANDBOX_DIR.to_string()).into(),
            tmp_directory: env_or(sandbox::TMP_DIR, &[], || DEFAULT_SANDBOX_DIR.to_string()).into(),
            script_directory: env_or(sandbox::SCRIPT_DIR, &[], || DEFAULT_SCRIPT_DIR.to_string())
                .into(),
            runner: env_optional(sandbox::RUNNER, sandbox::RUNNER_ALIASES),
            backend: env_or(sandbox::BACKEND, &[], || "runner".to_string()),
            registry_dir: env_optional(sandbox::REGISTRY_DIR, &[]).map(PathBuf::from),
            max_memory_mb: env_optional(sandbox::MAX_MEMORY_MB, &[]).and_then(|s| s.parse().ok()),
            timeout_secs: env_optional(sandbox::TIMEOUT_SECS, &[]).and_then(|s| s.parse().ok()),
        }
    }
}

/// Logging and audit settings
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    pub quiet: bool,
    pub log_level: String,
    pub log_json: bool,
    pub audit_log: Option<String>,
}

impl ObservabilityConfig {
    pub fn from_env() -> Self {
        load_dotenv();
        Self {
            quiet: env_bool(obv_keys::QUIET, &[], false),
            log_level: env_or(obv_keys::LOG_LEVEL, &[], || "info".to_string()),
            log_json: env_bool(obv_keys::LOG_JSON, &[], false),
            audit_log: env_optional(obv_keys::AUDIT_LOG, &[]),
        }
    }
}

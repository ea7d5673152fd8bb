//! Environment variable names and their aliases.
//!
//! Primary keys use the `SANDRUN_*` prefix; the `OPENAI_*` names are accepted
//! so an existing OpenAI setup works unchanged.

/// LLM API
pub mod llm {
    pub const API_BASE: &str = "SANDRUN_API_BASE";
    pub const API_BASE_ALIASES: &[&str] = &["OPENAI_API_BASE", "OPENAI_BASE_URL"];

    pub const API_KEY: &str = "SANDRUN_API_KEY";
    pub const API_KEY_ALIASES: &[&str] = &["OPENAI_API_KEY"];

    pub const MODEL: &str = "SANDRUN_MODEL";
    pub const MODEL_ALIASES: &[&str] = &["OPENAI_MODEL"];

    pub const TEMPERATURE: &str = "SANDRUN_TEMPERATURE";
    pub const MAX_TOKENS: &str = "SANDRUN_MAX_TOKENS";
}

/// Sandbox runtime
pub mod sandbox {
    pub const LOG_DIR: &str = "SANDRUN_LOG_DIR";
    pub const TMP_DIR: &str = "SANDRUN_TMP_DIR";
    pub const SCRIPT_DIR: &str = "SANDRUN_SCRIPT_DIR";

    /// Path or name of the `hyperlight-nanvix` runner executable
    pub const RUNNER: &str = "SANDRUN_RUNNER";
    pub const RUNNER_ALIASES: &[&str] = &["HYPERLIGHT_NANVIX_BIN"];

    /// `runner` (default) or `direct`
    pub const BACKEND: &str = "SANDRUN_BACKEND";

    pub const REGISTRY_DIR: &str = "SANDRUN_REGISTRY_DIR";

    pub const MAX_MEMORY_MB: &str = "SANDRUN_MAX_MEMORY_MB";
    pub const TIMEOUT_SECS: &str = "SANDRUN_TIMEOUT_SECS";
}

/// Logging and audit
pub mod observability {
    pub const QUIET: &str = "SANDRUN_QUIET";
    pub const LOG_LEVEL: &str = "SANDRUN_LOG_LEVEL";
    pub const LOG_JSON: &str = "SANDRUN_LOG_JSON";
    pub const AUDIT_LOG: &str = "SANDRUN_AUDIT_LOG";
}

//! Script generation with a language model.
//!
//! - `llm`: OpenAI-compatible `/chat/completions` client
//! - `prompt`: built-in task prompts and the QuickJS system prompt
//! - `fences`: markdown fence stripping for model output
//! - `generator`: the [`CodeGenerator`] seam used by the run loop

pub mod fences;
pub mod generator;
pub mod llm;
pub mod prompt;
pub mod types;

pub use fences::strip_code_fences;
pub use generator::{CodeGenerator, GeneratedScript, LlmScriptGenerator};
pub use llm::{LlmClient, LlmError};
pub use prompt::PromptCatalog;
pub use types::ChatMessage;

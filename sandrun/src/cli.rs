use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// sandrun - generate scripts with a language model and run them in a Nanvix sandbox
#[derive(Parser, Debug)]
#[command(name = "sandrun")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Debug logging and verbose runner output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate COUNT scripts with the language model and run each in the sandbox
    Generate(GenerateArgs),

    /// Run a single workload (.js, .mjs, .py, .elf, .o or an extensionless binary)
    Run {
        /// Path to the workload file
        #[arg(value_name = "SCRIPT")]
        script: PathBuf,

        #[command(flatten)]
        sandbox: SandboxArgs,
    },

    /// Download the guest binaries into the registry cache via the runner
    SetupRegistry {
        /// Runner executable (default: SANDRUN_RUNNER or hyperlight-nanvix)
        #[arg(long, value_name = "PATH")]
        runner: Option<String>,

        /// Invoke the runner even when the cache looks complete
        #[arg(long)]
        force: bool,
    },

    /// Remove the registry cache to force fresh downloads
    ClearRegistry,
}

#[derive(Args, Debug, Clone, Default)]
pub struct GenerateArgs {
    /// Number of scripts to generate and run; must be at least 1 (0 or a non-number is rejected)
    #[arg(value_name = "COUNT", default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub count: u32,

    /// Chat model (default: SANDRUN_MODEL or gpt-3.5-turbo)
    #[arg(long)]
    pub model: Option<String>,

    /// OpenAI-compatible API base URL (default: SANDRUN_API_BASE)
    #[arg(long, value_name = "URL")]
    pub api_base: Option<String>,

    #[command(flatten)]
    pub sandbox: SandboxArgs,
}

/// Sandbox overrides shared by `generate` and `run`. Unset flags fall back
/// to the SANDRUN_* environment.
#[derive(Args, Debug, Clone, Default)]
pub struct SandboxArgs {
    /// Execution backend: runner (Nanvix) or direct (no isolation)
    #[arg(long)]
    pub backend: Option<String>,

    /// Runner executable
    #[arg(long, value_name = "PATH")]
    pub runner: Option<String>,

    /// Directory for sandbox logs
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Working directory for sandbox runs
    #[arg(long, value_name = "DIR")]
    pub tmp_dir: Option<PathBuf>,

    /// Where generated scripts are written (generate only)
    #[arg(long, value_name = "DIR")]
    pub script_dir: Option<PathBuf>,

    /// Execution timeout in seconds (default: from env or 120)
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Maximum memory limit in MB (default: from env or 1024)
    #[arg(long)]
    pub max_memory: Option<u64>,
}

/// `ai-scripts [COUNT]`
#[derive(Parser, Debug)]
#[command(name = "ai-scripts")]
#[command(version, about = "Generate COUNT JavaScript programs with an LLM and run each in a Nanvix sandbox")]
pub struct AiScriptsCli {
    /// Number of scripts to generate and run; must be at least 1 (0 or a non-number is rejected)
    #[arg(value_name = "COUNT", default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub count: u32,

    /// Debug logging and verbose runner output
    #[arg(short, long)]
    pub verbose: bool,
}

impl AiScriptsCli {
    pub fn into_generate_args(self) -> GenerateArgs {
        GenerateArgs {
            count: self.count,
            ..GenerateArgs::default()
        }
    }
}

//! Generate scripts with a language model and run each one in the sandbox.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use sandrun_core::config::{LlmConfig, SandboxSettings};
use sandrun_llm::{CodeGenerator, LlmScriptGenerator};
use sandrun_sandbox::{Sandbox, WorkloadResult};

use crate::cli::{GenerateArgs, SandboxArgs};

const RULE_WIDTH: usize = 60;

/// Executes a script file and reports the guest outcome.
///
/// `Err` means a host-level fault and aborts the loop.
#[async_trait]
pub trait ScriptRunner: Send + Sync {
    async fn run_script(&self, path: &Path) -> Result<WorkloadResult>;
}

/// [`ScriptRunner`] backed by a [`Sandbox`]; the blocking run happens on
/// tokio's blocking pool.
pub struct SandboxRunner {
    sandbox: Arc<Sandbox>,
}

impl SandboxRunner {
    pub fn new(sandbox: Sandbox) -> Self {
        Self {
            sandbox: Arc::new(sandbox),
        }
    }
}

#[async_trait]
impl ScriptRunner for SandboxRunner {
    async fn run_script(&self, path: &Path) -> Result<WorkloadResult> {
        let sandbox = Arc::clone(&self.sandbox);
        let path = path.to_path_buf();
        let result = tokio::task::spawn_blocking(move || sandbox.run(&path))
            .await
            .context("sandbox task panicked")??;
        Ok(result)
    }
}

/// Removes the script file when dropped, whichever way the iteration ends.
pub struct ScriptFileGuard {
    path: PathBuf,
}

impl ScriptFileGuard {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScriptFileGuard {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!(path = %self.path.display(), "Removed script"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to remove script")
            }
        }
    }
}

/// Result of one iteration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IterationOutcome {
    pub index: u32,
    pub success: bool,
    pub error: Option<String>,
}

/// Totals for a whole run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoopSummary {
    pub iterations: Vec<IterationOutcome>,
}

impl LoopSummary {
    pub fn attempted(&self) -> usize {
        self.iterations.len()
    }

    pub fn succeeded(&self) -> usize {
        self.iterations.iter().filter(|o| o.success).count()
    }

    pub fn failed(&self) -> usize {
        self.attempted() - self.succeeded()
    }
}

pub fn script_path(dir: &Path, index: u32) -> PathBuf {
    dir.join(format!("ai-generated-{}.js", index))
}

/// Generate-then-execute `count` times.
///
/// A generation error or a host-level sandbox fault aborts with `Err`; a
/// script that fails inside the sandbox is reported and the loop moves on.
pub async fn run_generation_loop<G, R>(
    count: u32,
    generator: &G,
    runner: &R,
    script_dir: &Path,
    out: &mut dyn Write,
) -> Result<LoopSummary>
where
    G: CodeGenerator + ?Sized,
    R: ScriptRunner + ?Sized,
{
    std::fs::create_dir_all(script_dir)
        .with_context(|| format!("failed to create {}", script_dir.display()))?;

    writeln!(out, "Generating and executing {} AI-generated script(s)...\n", count)?;

    let rule = "-".repeat(RULE_WIDTH);
    let mut summary = LoopSummary::default();

    for i in 0..count {
        let guard = ScriptFileGuard::new(script_path(script_dir, i));

        writeln!(out, "[{}/{}] Generating JavaScript code with AI...", i + 1, count)?;
        let script = generator
            .generate()
            .await
            .with_context(|| format!("failed to generate script {}/{}", i + 1, count))?;
        tracing::debug!(task = %script.task, "Script generated");

        writeln!(out, "Generated code:\n{rule}\n{}\n{rule}", script.code)?;

        std::fs::write(guard.path(), &script.code)
            .with_context(|| format!("failed to write {}", guard.path().display()))?;

        writeln!(out, "Executing in Nanvix sandbox...")?;
        let result = runner.run_script(guard.path()).await?;

        if result.success {
            writeln!(out, "Execution completed successfully\n")?;
        } else {
            let error = result.error.as_deref().unwrap_or("unknown error");
            tracing::warn!(script = i + 1, %error, "Script failed in sandbox");
            writeln!(out, "Execution failed: {}", error)?;
            writeln!(out, "Continuing to next script...\n")?;
        }

        summary.iterations.push(IterationOutcome {
            index: i,
            success: result.success,
            error: result.error,
        });
    }

    if summary.failed() == 0 {
        writeln!(out, "All {} script(s) completed successfully!", count)?;
    } else {
        writeln!(
            out,
            "Completed {} script(s): {} succeeded, {} failed.",
            summary.attempted(),
            summary.succeeded(),
            summary.failed()
        )?;
    }
    Ok(summary)
}

/// Validate credentials and build the model-backed generator. Performs no
/// network I/O.
pub fn build_generator(llm: LlmConfig) -> Result<LlmScriptGenerator> {
    let llm = llm.require()?;
    tracing::info!(model = %llm.model, api_base = %llm.api_base, "Using language model");
    Ok(LlmScriptGenerator::from_config(&llm)?)
}

fn apply_sandbox_args(settings: &mut SandboxSettings, args: &SandboxArgs) {
    if let Some(ref backend) = args.backend {
        settings.backend = backend.clone();
    }
    if let Some(ref runner) = args.runner {
        settings.runner = Some(runner.clone());
    }
    if let Some(ref dir) = args.log_dir {
        settings.log_directory = dir.clone();
    }
    if let Some(ref dir) = args.tmp_dir {
        settings.tmp_directory = dir.clone();
    }
    if args.timeout.is_some() {
        settings.timeout_secs = args.timeout;
    }
    if args.max_memory.is_some() {
        settings.max_memory_mb = args.max_memory;
    }
}

/// Sandbox built from env settings with CLI overrides applied.
pub fn sandbox_from_args(args: &SandboxArgs, verbose: bool) -> Result<Sandbox> {
    let mut settings = SandboxSettings::from_env();
    apply_sandbox_args(&mut settings, args);
    Ok(Sandbox::from_settings(&settings)?.with_verbose(verbose))
}

/// `sandrun generate` / `ai-scripts`
pub async fn generate_command(args: GenerateArgs, verbose: bool) -> Result<LoopSummary> {
    let mut llm = LlmConfig::from_env();
    if let Some(model) = args.model {
        llm.model = model;
    }
    if let Some(api_base) = args.api_base {
        llm.api_base = api_base;
    }
    let generator = build_generator(llm)?;

    let mut settings = SandboxSettings::from_env();
    apply_sandbox_args(&mut settings, &args.sandbox);
    let script_dir = args
        .sandbox
        .script_dir
        .clone()
        .unwrap_or_else(|| settings.script_directory.clone());
    let sandbox = Sandbox::from_settings(&settings)?.with_verbose(verbose);
    tracing::info!(
        backend = sandbox.backend_name(),
        script_dir = %script_dir.display(),
        "Sandbox ready"
    );
    let runner = SandboxRunner::new(sandbox);

    let mut stdout = std::io::stdout();
    run_generation_loop(args.count, &generator, &runner, &script_dir, &mut stdout).await
}

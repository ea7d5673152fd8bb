//! Backend that delegates to the `hyperlight-nanvix` runner executable.
//!
//! The runner resolves the guest interpreter and kernel from its registry,
//! boots a Nanvix micro-VM and exits non-zero when the guest fails.

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};

use crate::backend::{ExecutionResult, SandboxBackend, Workload};
use crate::common::{spawn_supervised, wait_with_timeout, ResourceLimits};
use crate::config::RuntimeConfig;
use crate::error::SandboxError;

/// Runs workloads through the Nanvix runner CLI.
#[derive(Debug, Clone)]
pub struct NanvixRunnerBackend {
    program: PathBuf,
}

impl Default for NanvixRunnerBackend {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PROGRAM)
    }
}

impl NanvixRunnerBackend {
    pub const DEFAULT_PROGRAM: &'static str = "hyperlight-nanvix";

    pub fn new<P: Into<PathBuf>>(program: P) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn from_config(config: &RuntimeConfig) -> Self {
        match config.runner {
            Some(ref runner) => Self::new(runner),
            None => Self::default(),
        }
    }

    pub fn program(&self) -> &std::path::Path {
        &self.program
    }

    /// Command for the runner. On unix argv[0] is always `hyperlight-nanvix`:
    /// the runner skips its own name when looking for the workload argument,
    /// so a renamed or relocated binary must still present that name.
    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.arg0(Self::DEFAULT_PROGRAM);
        }
        cmd
    }

    fn spawn_error(&self, source: std::io::Error) -> SandboxError {
        if source.kind() == ErrorKind::NotFound {
            SandboxError::RunnerNotFound(self.program.display().to_string())
        } else {
            SandboxError::Spawn {
                program: self.program.display().to_string(),
                source,
            }
        }
    }

    /// Run a runner maintenance flag (e.g. `--setup-registry`) with inherited stdio.
    pub fn run_maintenance(&self, flag: &str) -> Result<ExitStatus, SandboxError> {
        tracing::info!(program = %self.program.display(), flag, "Invoking runner");
        self.command()
            .arg(flag)
            .status()
            .map_err(|e| self.spawn_error(e))
    }

    fn append_console_log(&self, config: &RuntimeConfig, workload: &Workload, stdout: &str) {
        let path = config.console_log_path();
        let file = OpenOptions::new().create(true).append(true).open(&path);
        match file {
            Ok(mut f) => {
                let _ = writeln!(
                    f,
                    "=== run {} ({}) ===\n{}",
                    workload.run_id,
                    workload.path.display(),
                    stdout.trim_end()
                );
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Cannot write guest console log");
            }
        }
    }
}

impl SandboxBackend for NanvixRunnerBackend {
    fn name(&self) -> &str {
        "nanvix-runner"
    }

    fn execute(
        &self,
        workload: &Workload,
        config: &RuntimeConfig,
        limits: ResourceLimits,
    ) -> Result<ExecutionResult, SandboxError> {
        let mut cmd = self.command();
        if config.verbose {
            cmd.arg("--verbose");
        }
        cmd.arg(&workload.path)
            .current_dir(&config.tmp_directory)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        tracing::debug!(
            program = %self.program.display(),
            workload = %workload.path.display(),
            run_id = %workload.run_id,
            "Spawning runner"
        );

        let mut child = spawn_supervised(&mut cmd).map_err(|e| self.spawn_error(e))?;
        let result = wait_with_timeout(&mut child, limits, config.verbose)?;

        self.append_console_log(config, workload, &result.stdout);
        Ok(result)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::backend::KillReason;
    use crate::workload::WorkloadType;

    fn workload(dir: &std::path::Path, name: &str, body: &str) -> Workload {
        let path = dir.join(name);
        std::fs::write(&path, body).unwrap();
        Workload {
            path,
            workload_type: WorkloadType::JavaScript,
            run_id: "test-run".to_string(),
        }
    }

    // `sh` stands in for the runner: it executes the workload file as a shell script.
    fn setup() -> (tempfile::TempDir, RuntimeConfig, NanvixRunnerBackend) {
        let dir = tempfile::tempdir().unwrap();
        let config = RuntimeConfig::new()
            .with_log_directory(dir.path())
            .with_tmp_directory(dir.path());
        (dir, config, NanvixRunnerBackend::new("sh"))
    }

    #[test]
    fn test_success_writes_console_log() {
        let (dir, config, backend) = setup();
        let wl = workload(dir.path(), "ok.js", "echo hello from guest\n");

        let result = backend.execute(&wl, &config, ResourceLimits::default()).unwrap();

        assert!(result.succeeded());
        assert_eq!(result.stdout.trim(), "hello from guest");
        let console = std::fs::read_to_string(config.console_log_path()).unwrap();
        assert!(console.contains("=== run test-run"));
        assert!(console.contains("hello from guest"));
    }

    #[test]
    fn test_guest_failure_is_not_host_error() {
        let (dir, config, backend) = setup();
        let wl = workload(dir.path(), "bad.js", "echo boom >&2\nexit 3\n");

        let result = backend.execute(&wl, &config, ResourceLimits::default()).unwrap();

        assert!(!result.succeeded());
        assert_eq!(result.exit_code, 3);
        assert_eq!(result.stderr.trim(), "boom");
    }

    #[test]
    fn test_timeout_kills_runner() {
        let (dir, config, backend) = setup();
        let wl = workload(dir.path(), "slow.js", "sleep 10\n");
        let limits = ResourceLimits::default().with_cli_overrides(None, Some(1));

        let result = backend.execute(&wl, &config, limits).unwrap();

        assert_eq!(result.kill_reason, Some(KillReason::Timeout { secs: 1 }));
    }

    #[test]
    fn test_timeout_bounds_runner_with_children() {
        let (dir, config, backend) = setup();
        let wl = workload(dir.path(), "forks.js", "sleep 8\necho late\n");
        let limits = ResourceLimits::default().with_cli_overrides(None, Some(1));

        let result = backend.execute(&wl, &config, limits).unwrap();

        assert_eq!(result.kill_reason, Some(KillReason::Timeout { secs: 1 }));
        assert!(result.duration < std::time::Duration::from_secs(5), "took {:?}", result.duration);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_runner_sees_canonical_argv0() {
        let dir = tempfile::tempdir().unwrap();
        let config = RuntimeConfig::new()
            .with_log_directory(dir.path())
            .with_tmp_directory(dir.path());
        let backend = NanvixRunnerBackend::new("/bin/sh");
        let wl = workload(dir.path(), "argv.js", "tr '\\000' ' ' < /proc/$$/cmdline\n");

        let result = backend.execute(&wl, &config, ResourceLimits::default()).unwrap();

        assert!(result.succeeded(), "stderr: {}", result.stderr);
        assert!(result.stdout.starts_with("hyperlight-nanvix "), "argv: {}", result.stdout);
        assert!(result.stdout.contains("argv.js"));
    }

    #[test]
    fn test_missing_runner_is_host_error() {
        let (dir, config, _) = setup();
        let backend = NanvixRunnerBackend::new("/nonexistent/hyperlight-nanvix");
        let wl = workload(dir.path(), "ok.js", "echo hi\n");

        let err = backend.execute(&wl, &config, ResourceLimits::default()).unwrap_err();
        assert!(matches!(err, SandboxError::RunnerNotFound(_)));
    }
}

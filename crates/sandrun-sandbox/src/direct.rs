//! Unisolated backend for development machines without the Nanvix runner.
//!
//! Scripts run under a host interpreter with only the watchdog limits
//! applied. Never use this for untrusted code.

use std::path::PathBuf;
use std::process::{Command, Stdio};

use crate::backend::{ExecutionResult, SandboxBackend, Workload};
use crate::common::{spawn_supervised, wait_with_timeout, ResourceLimits};
use crate::config::RuntimeConfig;
use crate::error::SandboxError;
use crate::workload::WorkloadType;

#[derive(Debug, Clone, Copy, Default)]
pub struct DirectBackend;

impl DirectBackend {
    /// Host interpreters tried in order for each scripted workload type
    pub fn candidates(workload_type: WorkloadType) -> &'static [&'static str] {
        match workload_type {
            WorkloadType::JavaScript => &["qjs", "node"],
            WorkloadType::Python => &["python3", "python"],
            WorkloadType::Binary => &[],
        }
    }

    /// First candidate interpreter found on `PATH`
    pub fn resolve_interpreter(workload_type: WorkloadType) -> Result<PathBuf, SandboxError> {
        let candidates = Self::candidates(workload_type);
        candidates
            .iter()
            .find_map(|name| which::which(name).ok())
            .ok_or_else(|| SandboxError::InterpreterNotFound {
                workload: workload_type.label(),
                tried: candidates.join(", "),
            })
    }
}

impl SandboxBackend for DirectBackend {
    fn name(&self) -> &str {
        "direct"
    }

    fn execute(
        &self,
        workload: &Workload,
        config: &RuntimeConfig,
        limits: ResourceLimits,
    ) -> Result<ExecutionResult, SandboxError> {
        tracing::warn!(
            workload = %workload.path.display(),
            "Running without sandbox (direct backend) - no isolation, resource limits only"
        );

        let (program, mut cmd) = match workload.workload_type {
            WorkloadType::Binary => (workload.path.clone(), Command::new(&workload.path)),
            scripted => {
                let interpreter = Self::resolve_interpreter(scripted)?;
                let mut cmd = Command::new(&interpreter);
                if scripted == WorkloadType::Python {
                    cmd.args(["-S", "-I"]);
                }
                cmd.arg(&workload.path);
                (interpreter, cmd)
            }
        };

        cmd.current_dir(&config.tmp_directory)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = spawn_supervised(&mut cmd).map_err(|source| SandboxError::Spawn {
            program: program.display().to_string(),
            source,
        })?;
        wait_with_timeout(&mut child, limits, config.verbose)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidates() {
        assert_eq!(DirectBackend::candidates(WorkloadType::JavaScript), &["qjs", "node"]);
        assert!(DirectBackend::candidates(WorkloadType::Binary).is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_executes_binary_workload() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hello");
        std::fs::write(&path, "#!/bin/sh\necho direct-ok\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();

        let workload = Workload {
            path,
            workload_type: WorkloadType::Binary,
            run_id: "direct".to_string(),
        };
        let config = RuntimeConfig::new().with_tmp_directory(dir.path());

        let result = DirectBackend
            .execute(&workload, &config, ResourceLimits::default())
            .unwrap();
        assert!(result.succeeded());
        assert_eq!(result.stdout.trim(), "direct-ok");
    }
}

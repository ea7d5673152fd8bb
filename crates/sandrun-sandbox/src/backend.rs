//! SandboxBackend trait: extension point for execution strategies.
//!
//! The default backend hands the workload to the `hyperlight-nanvix` runner,
//! which boots a Nanvix micro-VM per run. `DirectBackend` skips isolation and
//! exists for development machines without the runner.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::common::ResourceLimits;
use crate::config::RuntimeConfig;
use crate::direct::DirectBackend;
use crate::error::SandboxError;
use crate::runner::NanvixRunnerBackend;
use crate::workload::WorkloadType;

/// A validated workload, ready for a backend.
#[derive(Debug, Clone)]
pub struct Workload {
    /// Absolute path to the script or binary
    pub path: PathBuf,
    pub workload_type: WorkloadType,
    /// Unique id for logs and audit records
    pub run_id: String,
}

/// Why the watchdog killed a process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KillReason {
    Timeout { secs: u64 },
    MemoryLimit { used_mb: u64, limit_mb: u64 },
}

impl KillReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            KillReason::Timeout { .. } => "timeout",
            KillReason::MemoryLimit { .. } => "memory_limit",
        }
    }
}

impl fmt::Display for KillReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KillReason::Timeout { secs } => {
                write!(f, "exceeded timeout of {} seconds", secs)
            }
            KillReason::MemoryLimit { used_mb, limit_mb } => {
                write!(f, "memory usage ({} MB) exceeded limit ({} MB)", used_mb, limit_mb)
            }
        }
    }
}

/// Raw process outcome from a backend
#[derive(Debug)]
pub struct ExecutionResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    pub kill_reason: Option<KillReason>,
    pub duration: Duration,
}

impl ExecutionResult {
    pub fn succeeded(&self) -> bool {
        self.kill_reason.is_none() && self.exit_code == 0
    }
}

/// Extension point for sandbox execution backends.
///
/// `execute` returns `Err` only for host faults (the process could not be
/// started or supervised). A guest that crashes, exits non-zero or gets
/// killed is an `Ok(ExecutionResult)`.
pub trait SandboxBackend: Send + Sync {
    /// Backend name for logging and diagnostics.
    fn name(&self) -> &str;

    fn execute(
        &self,
        workload: &Workload,
        config: &RuntimeConfig,
        limits: ResourceLimits,
    ) -> Result<ExecutionResult, SandboxError>;
}

/// Resolve a backend by name (`runner` or `direct`).
pub fn backend_from_name(
    name: &str,
    config: &RuntimeConfig,
) -> Result<Arc<dyn SandboxBackend>, SandboxError> {
    match name.trim().to_lowercase().as_str() {
        "runner" | "nanvix" | "" => Ok(Arc::new(NanvixRunnerBackend::from_config(config))),
        "direct" | "none" => Ok(Arc::new(DirectBackend)),
        other => Err(SandboxError::UnknownBackend(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_from_name() {
        let config = RuntimeConfig::default();
        assert_eq!(backend_from_name("runner", &config).unwrap().name(), "nanvix-runner");
        assert_eq!(backend_from_name("Direct", &config).unwrap().name(), "direct");
        assert!(matches!(
            backend_from_name("docker", &config),
            Err(SandboxError::UnknownBackend(name)) if name == "docker"
        ));
    }

    #[test]
    fn test_kill_reason_display() {
        assert_eq!(
            KillReason::Timeout { secs: 3 }.to_string(),
            "exceeded timeout of 3 seconds"
        );
        assert_eq!(
            KillReason::MemoryLimit { used_mb: 300, limit_mb: 256 }.to_string(),
            "memory usage (300 MB) exceeded limit (256 MB)"
        );
        assert_eq!(KillReason::Timeout { secs: 1 }.as_str(), "timeout");
    }
}

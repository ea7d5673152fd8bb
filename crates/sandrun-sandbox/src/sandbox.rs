//! `Sandbox`: the entry point for running workloads.

use std::path::Path;
use std::sync::Arc;

use sandrun_core::config::SandboxSettings;
use sandrun_core::observability;

use crate::backend::{backend_from_name, ExecutionResult, SandboxBackend, Workload};
use crate::cache::RegistryCache;
use crate::common::ResourceLimits;
use crate::config::RuntimeConfig;
use crate::error::SandboxError;
use crate::runner::NanvixRunnerBackend;
use crate::workload::WorkloadType;

/// Stderr kept in a failure message
const ERROR_TAIL_CHARS: usize = 2000;

/// Outcome of one workload run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkloadResult {
    pub success: bool,
    pub error: Option<String>,
}

impl WorkloadResult {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }

    fn from_execution(result: &ExecutionResult) -> Self {
        if result.succeeded() {
            return Self::ok();
        }
        let detail = match result.kill_reason {
            Some(reason) => format!("process killed: {}", reason),
            None => {
                let stderr = result.stderr.trim();
                if stderr.is_empty() {
                    format!("exit code {}", result.exit_code)
                } else {
                    format!("exit code {}: {}", result.exit_code, tail(stderr, ERROR_TAIL_CHARS))
                }
            }
        };
        Self::failed(format!("Workload execution failed: {}", detail))
    }
}

/// Last `max_chars` characters of `s`
fn tail(s: &str, max_chars: usize) -> &str {
    let count = s.chars().count();
    if count <= max_chars {
        return s;
    }
    let skip = count - max_chars;
    let start = s.char_indices().nth(skip).map(|(i, _)| i).unwrap_or(0);
    &s[start..]
}

/// Main entry point for running workloads in Nanvix sandboxes.
pub struct Sandbox {
    config: RuntimeConfig,
    limits: ResourceLimits,
    backend: Arc<dyn SandboxBackend>,
    registry: RegistryCache,
}

impl Sandbox {
    /// Sandbox using the Nanvix runner backend.
    pub fn new(config: RuntimeConfig) -> Self {
        let backend = Arc::new(NanvixRunnerBackend::from_config(&config));
        Self::with_backend(config, backend)
    }

    pub fn with_backend(config: RuntimeConfig, backend: Arc<dyn SandboxBackend>) -> Self {
        Self {
            config,
            limits: ResourceLimits::default(),
            backend,
            registry: RegistryCache::default(),
        }
    }

    /// Build everything from environment-derived settings.
    pub fn from_settings(settings: &SandboxSettings) -> Result<Self, SandboxError> {
        let config = RuntimeConfig::from_settings(settings);
        let backend = backend_from_name(&settings.backend, &config)?;
        Ok(Self::with_backend(config, backend)
            .with_limits(ResourceLimits::from_settings(settings))
            .with_registry(RegistryCache::from_override(settings.registry_dir.clone())))
    }

    pub fn with_limits(mut self, limits: ResourceLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_registry(mut self, registry: RegistryCache) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.config.verbose = verbose;
        self
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Run a workload.
    ///
    /// Returns `Err` for host faults (missing file, unknown type, unusable
    /// directories, runner not startable). A guest that fails yields
    /// `Ok(WorkloadResult { success: false, .. })`.
    pub fn run<P: AsRef<Path>>(&self, workload_path: P) -> Result<WorkloadResult, SandboxError> {
        let workload_path = workload_path.as_ref();

        if !workload_path.exists() {
            return Err(SandboxError::WorkloadNotFound(workload_path.to_path_buf()));
        }
        let workload_type = WorkloadType::from_path(workload_path)
            .ok_or_else(|| SandboxError::UnknownWorkloadType(workload_path.to_path_buf()))?;

        for dir in [&self.config.tmp_directory, &self.config.log_directory] {
            std::fs::create_dir_all(dir).map_err(|e| {
                SandboxError::io(format!("failed to create {}", dir.display()), e)
            })?;
        }

        let path = workload_path.canonicalize().map_err(|e| {
            SandboxError::io(format!("failed to resolve {}", workload_path.display()), e)
        })?;

        if workload_type.is_scripted() {
            match self.registry.cached_binary_path(workload_type.binary_name()) {
                Some(cached) => tracing::debug!(
                    "Using cached {} binary: {}",
                    workload_type.binary_name(),
                    cached.display()
                ),
                None => tracing::debug!(
                    "{} not cached, the runner will download it from the registry",
                    workload_type.binary_name()
                ),
            }
        }

        let workload = Workload {
            path,
            workload_type,
            run_id: uuid::Uuid::new_v4().to_string(),
        };

        tracing::info!(
            run_id = %workload.run_id,
            backend = self.backend.name(),
            "Running {} workload: {}",
            workload_type.binary_name(),
            workload.path.display()
        );
        observability::audit_execution_started(
            &workload.run_id,
            &workload.path.to_string_lossy(),
            self.backend.name(),
        );

        let result = self.backend.execute(&workload, &self.config, self.limits)?;

        observability::audit_execution_completed(
            &workload.run_id,
            result.exit_code,
            result.duration.as_millis() as u64,
            result.kill_reason.map(|r| r.as_str()),
        );
        tracing::info!(
            run_id = %workload.run_id,
            exit_code = result.exit_code,
            duration_ms = result.duration.as_millis() as u64,
            "Workload finished"
        );

        Ok(WorkloadResult::from_execution(&result))
    }

    /// Clear the registry cache to force fresh downloads on the next run.
    pub fn clear_cache(&self) -> Result<(), SandboxError> {
        self.registry.clear()?;
        tracing::info!("Cache cleared successfully");
        Ok(())
    }
}

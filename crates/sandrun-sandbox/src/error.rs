use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Host-level sandbox faults. Guest failures are not errors; they are
/// reported through `WorkloadResult`.
#[derive(Debug, Error)]
pub enum SandboxError {
    #[error("workload {0:?} does not exist")]
    WorkloadNotFound(PathBuf),

    #[error("Could not determine workload type for {0:?}")]
    UnknownWorkloadType(PathBuf),

    #[error("unknown sandbox backend '{0}' (expected 'runner' or 'direct')")]
    UnknownBackend(String),

    #[error("sandbox runner '{0}' not found; install hyperlight-nanvix or set SANDRUN_RUNNER")]
    RunnerNotFound(String),

    #[error("no host interpreter for {workload} workloads (tried {tried})")]
    InterpreterNotFound {
        workload: &'static str,
        tried: String,
    },

    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
}

impl SandboxError {
    pub(crate) fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

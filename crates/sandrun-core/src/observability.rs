//! Observability: tracing init and the JSONL audit log.
//!
//! Uses [`ObservabilityConfig`] for SANDRUN_QUIET, SANDRUN_LOG_LEVEL,
//! SANDRUN_LOG_JSON and SANDRUN_AUDIT_LOG.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use chrono::Utc;
use serde_json::json;
use tracing_subscriber::{prelude::*, EnvFilter};

use crate::config::ObservabilityConfig;

static AUDIT_PATH: Mutex<Option<String>> = Mutex::new(None);

/// Tracing verbosity requested by the caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TracingMode {
    /// Level from SANDRUN_LOG_LEVEL / SANDRUN_QUIET
    Default,
    /// `--verbose`: debug for sandrun crates
    Verbose,
}

/// Build the filter directive for the given config and mode.
pub(crate) fn filter_directive(cfg: &ObservabilityConfig, mode: TracingMode) -> String {
    match mode {
        TracingMode::Verbose => "sandrun=debug,sandrun_core=debug,sandrun_llm=debug,sandrun_sandbox=debug"
            .to_string(),
        TracingMode::Default if cfg.quiet => "warn".to_string(),
        TracingMode::Default => cfg.log_level.clone(),
    }
}

/// Initialize tracing. Call once at process startup; later calls are no-ops.
/// `RUST_LOG` wins over every SANDRUN_* setting.
pub fn init_tracing(mode: TracingMode) {
    let cfg = ObservabilityConfig::from_env();
    let level = filter_directive(&cfg, mode);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level));

    let _ = if cfg.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };
}

fn get_audit_path() -> Option<String> {
    {
        let guard = AUDIT_PATH.lock().ok()?;
        if let Some(ref p) = *guard {
            return Some(p.clone());
        }
    }
    let path = ObservabilityConfig::from_env().audit_log?;
    if let Some(parent) = Path::new(&path).parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    {
        let mut guard = AUDIT_PATH.lock().ok()?;
        *guard = Some(path.clone());
    }
    Some(path)
}

fn append_jsonl(path: &str, record: &serde_json::Value) {
    if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(path) {
        if let Ok(line) = serde_json::to_string(record) {
            let _ = writeln!(f, "{}", line);
        }
    }
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

/// Audit: a script came back from the model
pub fn audit_script_generated(model: &str, code_len: usize) {
    if let Some(path) = get_audit_path() {
        let record = json!({
            "ts": timestamp(),
            "event": "script_generated",
            "model": model,
            "code_len": code_len,
        });
        append_jsonl(&path, &record);
    }
}

/// Audit: a workload was handed to a sandbox backend
pub fn audit_execution_started(run_id: &str, workload: &str, backend: &str) {
    if let Some(path) = get_audit_path() {
        let record = json!({
            "ts": timestamp(),
            "event": "execution_started",
            "run_id": run_id,
            "workload": workload,
            "backend": backend,
        });
        append_jsonl(&path, &record);
    }
}

/// Audit: a workload finished (successfully or not)
pub fn audit_execution_completed(
    run_id: &str,
    exit_code: i32,
    duration_ms: u64,
    kill_reason: Option<&str>,
) {
    if let Some(path) = get_audit_path() {
        let record = json!({
            "ts": timestamp(),
            "event": "execution_completed",
            "run_id": run_id,
            "exit_code": exit_code,
            "duration_ms": duration_ms,
            "kill_reason": kill_reason,
        });
        append_jsonl(&path, &record);
    }
}

//! Process supervision shared by all backends: resource limits, memory
//! probing and the timeout/memory watchdog.

use sandrun_core::config::SandboxSettings;
use std::io::{Read, Write};
use std::process::{Child, Command};
use std::thread;
use std::time::{Duration, Instant};

use crate::backend::{ExecutionResult, KillReason};
use crate::error::SandboxError;

// ============================================================
// Resource limit defaults
// ============================================================

/// Default memory ceiling for the runner process in MB. The micro-VM maps
/// guest memory into the runner, so this is well above a bare interpreter.
pub const DEFAULT_MAX_MEMORY_MB: u64 = 1024;

/// Default wall-clock timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Memory check interval in milliseconds
pub const MEMORY_CHECK_INTERVAL_MS: u64 = 100;

/// Resource limits for one workload execution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceLimits {
    pub max_memory_mb: u64,
    pub timeout_secs: u64,
}

impl Default for ResourceLimits {
    fn default() -> Self {
        Self {
            max_memory_mb: DEFAULT_MAX_MEMORY_MB,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ResourceLimits {
    /// Limit in bytes, saturating at `u64::MAX` for absurd megabyte values
    pub fn max_memory_bytes(&self) -> u64 {
        self.max_memory_mb.saturating_mul(1024 * 1024)
    }

    pub fn from_settings(settings: &SandboxSettings) -> Self {
        Self::default().with_cli_overrides(settings.max_memory_mb, settings.timeout_secs)
    }

    /// Override with CLI parameters
    pub fn with_cli_overrides(mut self, max_memory: Option<u64>, timeout: Option<u64>) -> Self {
        if let Some(max_memory) = max_memory {
            self.max_memory_mb = max_memory;
        }
        if let Some(timeout) = timeout {
            self.timeout_secs = timeout;
        }
        self
    }
}

/// Resident set size of a process in bytes, read from `/proc/<pid>/status`.
#[cfg(target_os = "linux")]
pub fn get_process_memory(pid: u32) -> Option<u64> {
    let status = std::fs::read_to_string(format!("/proc/{}/status", pid)).ok()?;
    status
        .lines()
        .find(|line| line.starts_with("VmRSS:"))
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|kb| kb.parse::<u64>().ok())
        .map(|kb| kb * 1024)
}

/// Resident set size of a process in bytes, via `ps -o rss=`.
#[cfg(target_os = "macos")]
pub fn get_process_memory(pid: u32) -> Option<u64> {
    let output = std::process::Command::new("ps")
        .args(["-o", "rss=", "-p", &pid.to_string()])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8_lossy(&output.stdout)
        .trim()
        .parse::<u64>()
        .ok()
        .map(|kb| kb * 1024)
}

#[cfg(not(any(target_os = "linux", target_os = "macos")))]
pub fn get_process_memory(_pid: u32) -> Option<u64> {
    None
}

/// Spawn `cmd` as the leader of a new process group (unix), so the watchdog
/// can kill everything the process starts.
pub fn spawn_supervised(cmd: &mut Command) -> std::io::Result<Child> {
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        cmd.process_group(0);
    }
    cmd.spawn()
}

/// Kill the child and, on unix, every process left in its group, then reap
/// the child. Descendants holding the output pipes would otherwise keep the
/// reader threads blocked past the deadline.
fn kill_process_tree(child: &mut Child) {
    #[cfg(unix)]
    {
        use nix::sys::signal::{killpg, Signal};
        use nix::unistd::Pid;

        // ESRCH when the child is not a group leader; `kill` below still applies.
        let _ = killpg(Pid::from_raw(child.id() as i32), Signal::SIGKILL);
    }
    let _ = child.kill();
    let _ = child.wait();
}

fn drain<R, W>(mut source: R, mut echo: Option<W>) -> String
where
    R: Read,
    W: Write,
{
    let mut captured = Vec::new();
    let mut buf = [0u8; 4096];
    loop {
        match source.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => {
                captured.extend_from_slice(&buf[..n]);
                if let Some(ref mut out) = echo {
                    let _ = out.write_all(&buf[..n]);
                    let _ = out.flush();
                }
            }
            Err(_) => break,
        }
    }
    String::from_utf8_lossy(&captured).into_owned()
}

/// Wait for a child under a wall-clock timeout and an RSS ceiling.
///
/// stdout/stderr are read on background threads while the child runs; a
/// child that fills the pipe buffer would otherwise block forever. With
/// `stream` set, output is echoed to the parent's stdout/stderr as it
/// arrives.
pub fn wait_with_timeout(
    child: &mut Child,
    limits: ResourceLimits,
    stream: bool,
) -> Result<ExecutionResult, SandboxError> {
    let start = Instant::now();
    let timeout = Duration::from_secs(limits.timeout_secs);
    let memory_limit = limits.max_memory_bytes();
    let check_interval = Duration::from_millis(MEMORY_CHECK_INTERVAL_MS);

    let stdout_handle = child.stdout.take().map(|out| {
        thread::spawn(move || drain(out, stream.then(std::io::stdout)))
    });
    let stderr_handle = child.stderr.take().map(|err| {
        thread::spawn(move || drain(err, stream.then(std::io::stderr)))
    });

    let join = |h: Option<thread::JoinHandle<String>>| {
        h.map(|h| h.join().unwrap_or_default()).unwrap_or_default()
    };

    let kill_reason = loop {
        match child.try_wait() {
            Ok(Some(status)) => {
                let stdout = join(stdout_handle);
                let stderr = join(stderr_handle);
                return Ok(ExecutionResult {
                    stdout,
                    stderr,
                    exit_code: status.code().unwrap_or(-1),
                    kill_reason: None,
                    duration: start.elapsed(),
                });
            }
            Ok(None) => {}
            Err(e) => {
                kill_process_tree(child);
                join(stdout_handle);
                join(stderr_handle);
                return Err(SandboxError::io("failed to wait for sandbox process", e));
            }
        }

        if start.elapsed() > timeout {
            break KillReason::Timeout {
                secs: limits.timeout_secs,
            };
        }

        if let Some(memory) = get_process_memory(child.id()) {
            if memory > memory_limit {
                break KillReason::MemoryLimit {
                    used_mb: memory / (1024 * 1024),
                    limit_mb: limits.max_memory_mb,
                };
            }
        }

        thread::sleep(check_interval);
    };

    tracing::warn!(pid = child.id(), reason = %kill_reason, "Killing sandbox process");
    kill_process_tree(child);
    let stdout = join(stdout_handle);
    let stderr = join(stderr_handle);

    Ok(ExecutionResult {
        stdout,
        stderr,
        exit_code: -1,
        kill_reason: Some(kill_reason),
        duration: start.elapsed(),
    })
}

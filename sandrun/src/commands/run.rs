//! `sandrun run <SCRIPT>`

use anyhow::{bail, Context, Result};
use std::path::Path;

use crate::cli::SandboxArgs;
use crate::commands::generate::sandbox_from_args;

/// Run one workload. A guest failure becomes `Err` so the process exits 1.
pub fn run_command(script: &Path, args: &SandboxArgs, verbose: bool) -> Result<()> {
    let sandbox = sandbox_from_args(args, verbose)?;
    let result = sandbox
        .run(script)
        .with_context(|| format!("failed to run {}", script.display()))?;

    if result.success {
        println!("Workload executed successfully");
        Ok(())
    } else {
        bail!(
            "{}",
            result.error.unwrap_or_else(|| "Workload execution failed".to_string())
        )
    }
}

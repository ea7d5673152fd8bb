//! `sandrun setup-registry` and `sandrun clear-registry`

use anyhow::{bail, Result};
use std::io::Write;

use sandrun_core::config::SandboxSettings;
use sandrun_sandbox::{NanvixRunnerBackend, RegistryCache};

fn print_status(cache: &RegistryCache, out: &mut dyn Write) -> Result<()> {
    writeln!(out, "Registry cache: {}", cache.root().display())?;
    for (name, cached) in cache.status() {
        let mark = if cached { "cached" } else { "missing" };
        writeln!(out, "  {:<12} {}", name, mark)?;
    }
    Ok(())
}

/// Make sure the guest binaries are cached, asking the runner to download
/// them when something is missing.
pub fn setup_registry(runner: Option<String>, force: bool) -> Result<()> {
    let settings = SandboxSettings::from_env();
    let cache = RegistryCache::from_override(settings.registry_dir);
    let mut stdout = std::io::stdout();
    print_status(&cache, &mut stdout)?;

    if cache.is_complete() && !force {
        println!("Registry already set up.");
        return Ok(());
    }

    let backend = match runner.or(settings.runner) {
        Some(program) => NanvixRunnerBackend::new(program),
        None => NanvixRunnerBackend::default(),
    };
    let status = backend.run_maintenance("--setup-registry")?;
    if !status.success() {
        bail!("{} --setup-registry exited with {}", backend.program().display(), status);
    }

    print_status(&cache, &mut stdout)?;
    println!("Registry setup complete.");
    Ok(())
}

pub fn clear_registry() -> Result<()> {
    let settings = SandboxSettings::from_env();
    let cache = RegistryCache::from_override(settings.registry_dir);
    cache.clear()?;
    println!("Cleared {}", cache.root().display());
    println!("Run `sandrun setup-registry` or any workload to download fresh binaries.");
    Ok(())
}

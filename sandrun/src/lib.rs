//! sandrun: generate scripts with a language model and run them in Nanvix sandboxes.
//!
//! The binaries are thin wrappers around [`run_cli`] and [`run_ai_scripts`].

pub mod cli;
pub mod commands;

use anyhow::{Context, Result};
use clap::Parser;

use cli::{AiScriptsCli, Cli, Commands};
use sandrun_core::config::load_dotenv;
use sandrun_core::observability::{init_tracing, TracingMode};

fn tracing_mode(verbose: bool) -> TracingMode {
    if verbose {
        TracingMode::Verbose
    } else {
        TracingMode::Default
    }
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")
}

/// Entry point for the `sandrun` binary.
pub fn run_cli() -> Result<()> {
    load_dotenv();
    let cli = Cli::parse();
    init_tracing(tracing_mode(cli.verbose));

    match cli.command {
        Commands::Generate(args) => {
            runtime()?.block_on(commands::generate::generate_command(args, cli.verbose))?;
        }
        Commands::Run { script, sandbox } => {
            commands::run::run_command(&script, &sandbox, cli.verbose)?;
        }
        Commands::SetupRegistry { runner, force } => {
            commands::registry::setup_registry(runner, force)?;
        }
        Commands::ClearRegistry => {
            commands::registry::clear_registry()?;
        }
    }
    Ok(())
}

/// Entry point for the `ai-scripts` binary.
///
/// Exits 0 when the loop finishes, even if some scripts failed in the sandbox.
pub fn run_ai_scripts() -> Result<()> {
    load_dotenv();
    let cli = AiScriptsCli::parse();
    let verbose = cli.verbose;
    init_tracing(tracing_mode(verbose));

    runtime()?.block_on(commands::generate::generate_command(
        cli.into_generate_args(),
        verbose,
    ))?;
    Ok(())
}

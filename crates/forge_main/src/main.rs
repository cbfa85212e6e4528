use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use forge_main::{Cli, Command, load_settings, render, stream, think};
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let _ = tracing_subscriber::fmt()
        // Fall back to the default level if RUST_LOG is unset or invalid
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(default_level))
                .unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .try_init();
}

fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) if path != Path::new("-") => fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        _ => {
            let mut input = String::new();
            io::stdin()
                .read_to_string(&mut input)
                .context("Failed to read stdin")?;
            Ok(input)
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_settings(cli.config.as_deref())?;
    let input = read_input(cli.command.file().map(|path| path.as_path()))?;
    let mut out = io::stdout().lock();

    match cli.command {
        Command::Render { .. } => render(&config, &input, &mut out)?,
        Command::Stream { chunk_size, json, .. } => {
            let report = stream(&config, &input, chunk_size, json, &mut out)?;
            eprintln!(
                "{} chunks, {} retracted, {}",
                report.chunks,
                report.retracted,
                if report.converged { "converged" } else { "diverged" }
            );
        }
        Command::Think { .. } => think(&config, &input, &mut out)?,
    }

    out.flush()?;
    Ok(())
}

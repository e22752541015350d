//! `advlog`: decode and aggregate BLE advertising capture logs.

mod cli;
mod commands;
mod config;
mod util;

use anyhow::Result;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::commands::{cmd_config, cmd_devices, cmd_frames, cmd_reports, cmd_text};
use crate::config::Config;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // When quiet mode is enabled, suppress info-level logging
    let filter = if cli.quiet {
        EnvFilter::new("warn")
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // An explicit --config must parse; the default location falls back with a warning.
    let config_path = cli.config.clone().unwrap_or_else(Config::path);
    let config = match &cli.config {
        Some(path) if path.exists() => Config::load_from(path)?,
        Some(_) => Config::default(),
        None => Config::load(),
    };
    debug!("Using config {}", config_path.display());

    let format = cli.format.or(config.format).unwrap_or_default();
    let output = cli.output.as_ref();

    match cli.command {
        Commands::Frames { log } => cmd_frames(&log, format, output),
        Commands::Reports { log } => cmd_reports(&log, format, output, &config.lookup),
        Commands::Devices { log, policy } => cmd_devices(
            &log,
            policy.resolve(&config),
            format,
            output,
            &config.lookup,
        ),
        Commands::Text { file, policy } => {
            cmd_text(&file, policy.resolve(&config), format, output)
        }
        Commands::Config { action } => {
            cmd_config(action, &config_path, &config, output, cli.quiet)
        }
    }
}

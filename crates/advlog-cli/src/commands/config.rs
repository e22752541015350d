//! Config command implementation.

use std::path::{Path, PathBuf};

use anyhow::{Result, bail};

use crate::cli::ConfigAction;
use crate::config::Config;
use crate::util::write_output;

pub fn cmd_config(
    action: ConfigAction,
    path: &Path,
    config: &Config,
    output: Option<&PathBuf>,
    quiet: bool,
) -> Result<()> {
    match action {
        ConfigAction::Path => write_output(output, &format!("{}\n", path.display())),
        ConfigAction::Show => write_output(output, &config.to_toml()?),
        ConfigAction::Init { force } => {
            if path.exists() && !force {
                bail!(
                    "Config already exists at {} (use --force to overwrite)",
                    path.display()
                );
            }
            Config::default().save_to(path)?;
            if !quiet {
                eprintln!("Wrote default config to {}", path.display());
            }
            Ok(())
        }
    }
}

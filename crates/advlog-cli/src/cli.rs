//! CLI argument definitions using clap.

use std::path::PathBuf;

use advlog_core::AggregateOptions;
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::config::Config;

/// Output format for commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Indented text, readable back by `advlog text`
    #[default]
    Text,
    Json,
}

/// Aggregation policy overrides
#[derive(Debug, Clone, Default, Args)]
pub struct PolicyArgs {
    /// Field whose value identifies a device
    #[arg(short, long, env = "ADVLOG_KEY")]
    pub key: Option<String>,

    /// Fields to drop; replaces the configured list (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub ignore: Vec<String>,

    /// Fields to keep only the latest value of; replaces the configured list
    #[arg(long, value_delimiter = ',')]
    pub merge: Vec<String>,
}

impl PolicyArgs {
    /// Resolve the policy: explicit flags override config
    pub fn resolve(&self, config: &Config) -> AggregateOptions {
        let mut options = config.aggregate_options();
        if let Some(key) = &self.key {
            options.key_field = key.clone();
        }
        if !self.ignore.is_empty() {
            options.ignore_fields = self.ignore.iter().cloned().collect();
        }
        if !self.merge.is_empty() {
            options.merge_fields = self.merge.iter().cloned().collect();
        }
        options
    }
}

#[derive(Parser)]
#[command(name = "advlog")]
#[command(author, version, about = "Decode and aggregate BLE advertising capture logs", long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Write output to file instead of stdout
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    /// Output format (defaults to the configured format, then text)
    #[arg(short, long, global = true, value_enum)]
    pub format: Option<OutputFormat>,

    /// Configuration file to use instead of the default location
    #[arg(short, long, global = true, env = "ADVLOG_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the raw frames of a capture log
    Frames {
        /// Capture log file
        log: PathBuf,
    },

    /// Decode every advertising report in a capture log
    Reports {
        /// Capture log file
        log: PathBuf,
    },

    /// Aggregate the reports of a capture log into devices
    Devices {
        /// Capture log file
        log: PathBuf,

        #[command(flatten)]
        policy: PolicyArgs,
    },

    /// Aggregate a text report previously written by `advlog reports`
    Text {
        /// Text report file
        file: PathBuf,

        #[command(flatten)]
        policy: PolicyArgs,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration subcommands
#[derive(Debug, Clone, Copy, Subcommand)]
pub enum ConfigAction {
    /// Show configuration file path
    Path,

    /// Show the effective configuration
    Show,

    /// Write the default configuration
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = parse(&["advlog", "frames", "cap.log", "--format", "json", "-q"]);
        assert!(cli.quiet);
        assert_eq!(cli.format, Some(OutputFormat::Json));
        assert!(matches!(cli.command, Commands::Frames { .. }));
    }

    #[test]
    fn test_policy_lists_split_on_commas() {
        let cli = parse(&[
            "advlog",
            "devices",
            "cap.log",
            "--ignore",
            "RSSI,TX power",
            "--merge",
            "Flags",
        ]);
        let Commands::Devices { policy, .. } = cli.command else {
            panic!("expected devices");
        };
        assert_eq!(policy.ignore, ["RSSI", "TX power"]);
        assert_eq!(policy.merge, ["Flags"]);
    }

    #[test]
    fn test_policy_falls_back_to_config() {
        let config = Config::default();
        let options = PolicyArgs::default().resolve(&config);
        assert_eq!(options.key_field, "Address");
        assert!(options.ignore_fields.contains("RSSI"));
        assert!(options.merge_fields.contains("Flags"));
    }

    #[test]
    fn test_policy_flags_replace_config_lists() {
        let policy = PolicyArgs {
            key: Some("Name (complete)".to_string()),
            ignore: vec!["Flags".to_string()],
            merge: Vec::new(),
        };
        let options = policy.resolve(&Config::default());
        assert_eq!(options.key_field, "Name (complete)");
        assert_eq!(options.ignore_fields.len(), 1);
        assert!(!options.ignore_fields.contains("RSSI"));
        assert!(options.merge_fields.contains("Company"));
    }

    #[test]
    fn test_config_init_force() {
        let cli = parse(&["advlog", "config", "init", "--force"]);
        assert!(matches!(
            cli.command,
            Commands::Config {
                action: ConfigAction::Init { force: true }
            }
        ));
    }

    #[test]
    fn test_unknown_format_is_rejected() {
        assert!(Cli::try_parse_from(["advlog", "frames", "x", "--format", "csv"]).is_err());
    }
}

//! Configuration file management.

use std::fs;
use std::path::{Path, PathBuf};

use advlog_core::{
    AggregateOptions, DEFAULT_IGNORE_FIELDS, DEFAULT_KEY_FIELD, DEFAULT_MERGE_FIELDS, TableLookup,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::cli::OutputFormat;

/// Configuration file structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Field whose value identifies a device
    #[serde(default = "default_key_field")]
    pub key_field: String,

    /// Fields dropped during aggregation
    #[serde(default = "default_ignore_fields")]
    pub ignore_fields: Vec<String>,

    /// Fields that keep only their latest value
    #[serde(default = "default_merge_fields")]
    pub merge_fields: Vec<String>,

    /// Default output format
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<OutputFormat>,

    /// Company, OUI and model names used to annotate fields
    #[serde(default)]
    pub lookup: TableLookup,
}

fn default_key_field() -> String {
    DEFAULT_KEY_FIELD.to_string()
}

fn default_ignore_fields() -> Vec<String> {
    DEFAULT_IGNORE_FIELDS.iter().map(|s| s.to_string()).collect()
}

fn default_merge_fields() -> Vec<String> {
    DEFAULT_MERGE_FIELDS.iter().map(|s| s.to_string()).collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            key_field: default_key_field(),
            ignore_fields: default_ignore_fields(),
            merge_fields: default_merge_fields(),
            format: None,
            lookup: TableLookup::default(),
        }
    }
}

impl Config {
    /// Get the config file path
    pub fn path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("advlog")
            .join("config.toml")
    }

    /// Load config from the default path, or return default if missing or unreadable
    pub fn load() -> Self {
        Self::load_or_default(&Self::path())
    }

    /// Load config from `path`, warning and falling back to defaults on failure
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(path) {
            Ok(config) => config,
            Err(e) => {
                warn!("Failed to load config, using defaults: {:#}", e);
                Self::default()
            }
        }
    }

    /// Load config from `path`
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))
    }

    /// Save config to `path`, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }
        let content = self.to_toml()?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }

    /// Aggregation policy from the configured lists
    pub fn aggregate_options(&self) -> AggregateOptions {
        AggregateOptions::new(self.key_field.as_str())
            .ignore(self.ignore_fields.iter().cloned())
            .merge(self.merge_fields.iter().cloned())
    }
}

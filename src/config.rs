use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::extraction::SingleValuePolicy;
use crate::storage::{DEFAULT_MAX_RECORDS, DEFAULT_NAMESPACE};

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub schema_version: u32,
    /// Directory holding the record collections; defaults to `<config dir>/records`
    pub store_dir: Option<PathBuf>,
    pub namespace: String,
    pub max_records: usize,
    /// How many saved prescriptions `list` shows
    pub recent_limit: usize,
    pub output_format: OutputFormat,
    /// Merge rule for patient name, diagnosis and follow-up
    pub single_value_policy: SingleValuePolicy,
    /// Pause between scripted utterances, in milliseconds
    pub script_delay_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema_version: 1,
            store_dir: None,
            namespace: DEFAULT_NAMESPACE.to_string(),
            max_records: DEFAULT_MAX_RECORDS,
            recent_limit: 10,
            output_format: OutputFormat::Text,
            single_value_policy: SingleValuePolicy::LastMatchWins,
            script_delay_ms: 0,
        }
    }
}

impl Config {
    /// Get the default config directory
    pub fn config_dir() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Failed to get home directory")?;
        Ok(home.join(".prescription-scribe"))
    }

    /// Get the default config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// Load config from file, or return the default if the file is absent
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path).context("Failed to read config file")?;
            serde_json::from_str(&content).context("Failed to parse config file")
        } else {
            Ok(Self::default())
        }
    }

    /// Load from the default location, falling back to defaults on any error
    pub fn load_or_default() -> Self {
        match Self::config_path().and_then(|p| Self::load(&p)) {
            Ok(config) => config,
            Err(e) => {
                debug!("Failed to load config, using default: {}", e);
                Self::default()
            }
        }
    }

    /// Save config to file
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content).context("Failed to write config file")
    }

    /// Directory of the record store
    pub fn resolved_store_dir(&self) -> Result<PathBuf> {
        match &self.store_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(Self::config_dir()?.join("records")),
        }
    }
}

/// How a prescription is printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Text,
    Html,
    Json,
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::Text
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(Self::Text),
            "html" => Ok(Self::Html),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

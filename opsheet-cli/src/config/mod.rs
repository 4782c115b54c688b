//! Configuration loading and persistence

mod db;
pub mod repository;

pub use db::{connect, connect_in_memory};

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Runtime configuration.
///
/// Sources, lowest priority first: built-in defaults, `config.toml`,
/// environment (`OPSHEET_DATABASE`, `OPSHEET_COMMIT_TIMEOUT`), CLI flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SQLite database file
    pub database_path: PathBuf,
    /// Upper bound for one import commit
    pub commit_timeout_secs: u64,
    /// Processor used when `--processor` is not given
    pub default_processor: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database_path: default_data_dir().join("opsheet.db"),
            commit_timeout_secs: 30,
            default_processor: None,
        }
    }
}

impl Config {
    /// Location of the config file (`<config dir>/opsheet/config.toml`)
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("opsheet").join("config.toml"))
    }

    /// Load from the default location and the process environment
    pub fn load() -> Result<Self> {
        let mut config = match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path)?,
            _ => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Load a specific config file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Invalid configuration")?;
        config.check()?;
        Ok(config)
    }

    /// Apply environment overrides using `lookup` to read variables
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("OPSHEET_DATABASE") {
            self.database_path = PathBuf::from(path);
        }
        if let Some(secs) = lookup("OPSHEET_COMMIT_TIMEOUT") {
            self.commit_timeout_secs = secs
                .trim()
                .parse()
                .with_context(|| format!("OPSHEET_COMMIT_TIMEOUT must be seconds, got '{}'", secs))?;
        }
        self.check()
    }

    /// Reject values no command could work with
    fn check(&self) -> Result<()> {
        if self.commit_timeout_secs == 0 {
            anyhow::bail!("commit_timeout_secs must be at least 1");
        }
        Ok(())
    }

    pub fn commit_timeout(&self) -> Duration {
        Duration::from_secs(self.commit_timeout_secs)
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("opsheet")
}

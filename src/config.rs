// src/config.rs
// =============================================================================
// Settings for the explorer, with sensible defaults.
//
// Where settings come from (later wins):
// 1. Built-in defaults (the values in the default_* functions below)
// 2. A TOML file: --config <path>, or <config dir>/repos-hub/config.toml
// 3. Command-line flags such as --api-url
//
// Example config.toml:
//
//   api_base_url = "https://api.github.com"
//   debounce_ms = 250
//   max_selected = 3
//   clear_policy = "immediate"
//
// Every key is optional; leave it out to keep the default.
// =============================================================================

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

use crate::debounce::ClearPolicy;

const APP_DIR: &str = "repos-hub";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub api_base_url: String,
    /// Page size for `search`
    pub per_page: u32,
    /// Page size for repository lists
    pub repos_per_page: u32,
    /// How many users the autocomplete asks GitHub for
    pub suggestion_limit: u32,
    pub min_query_length: usize,
    pub max_selected: usize,
    pub debounce_ms: u64,
    pub stale_time_secs: u64,
    pub request_timeout_secs: u64,
    pub clear_policy: ClearPolicy,
    pub snapshot_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.github.com".to_string(),
            per_page: 10,
            repos_per_page: 30,
            suggestion_limit: 5,
            min_query_length: 2,
            max_selected: crate::selection::DEFAULT_MAX_SELECTED,
            debounce_ms: crate::debounce::DEFAULT_DEBOUNCE.as_millis() as u64,
            stale_time_secs: 5 * 60,
            request_timeout_secs: 10,
            clear_policy: ClearPolicy::default(),
            snapshot_path: None,
        }
    }
}

impl Config {
    // Loads the config file if there is one
    //
    // An explicitly given path must exist; the default location is optional
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => match default_config_path() {
                Some(path) if path.exists() => path,
                _ => return Ok(Self::default()),
            },
        };

        debug!(path = %path.display(), "loading config");
        let text = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        anyhow::ensure!(self.max_selected > 0, "max_selected must be at least 1");
        anyhow::ensure!(self.suggestion_limit > 0, "suggestion_limit must be at least 1");
        anyhow::ensure!(
            (1..=100).contains(&self.per_page) && (1..=100).contains(&self.repos_per_page),
            "page sizes must be between 1 and 100 (GitHub's limit)"
        );
        Ok(())
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn stale_time(&self) -> Duration {
        Duration::from_secs(self.stale_time_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    // Where the saved selection lives, unless the config says otherwise
    pub fn snapshot_path(&self) -> PathBuf {
        self.snapshot_path.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(APP_DIR)
                .join("storage.json")
        })
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.toml"))
}

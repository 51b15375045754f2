//! Configuration loading and resolution
//!
//! Settings come from command-line flags (or their environment variables),
//! then the TOML config file, then built-in defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use color_eyre::eyre::{self, WrapErr, eyre};
use serde::{Deserialize, Serialize};

use crate::cli::Cli;
use crate::output::OutputFormat;

/// Contents of `metalcloud.toml`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API endpoint, e.g. `https://api.example.com/api/v2`
    #[serde(default)]
    pub endpoint: Option<String>,
    /// API key used as bearer token
    #[serde(default)]
    pub api_key: Option<String>,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Default output format
    #[serde(default)]
    pub format: Option<OutputFormat>,
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            timeout_secs: default_timeout_secs(),
            format: None,
            log_level: default_log_level(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Config {
    /// Load configuration from file
    ///
    /// # Errors
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &Path) -> eyre::Result<Self> {
        let content = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .wrap_err_with(|| format!("failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Load from an explicit path, or the first default path that exists
    ///
    /// Returns the path the config was read from, if any. An explicit path
    /// that does not exist is an error; missing default files are not.
    ///
    /// # Errors
    /// Returns error if a config file exists but cannot be read or parsed
    pub fn discover(explicit: Option<&Path>) -> eyre::Result<(Self, Option<PathBuf>)> {
        if let Some(path) = explicit {
            return Ok((Self::load(path)?, Some(path.to_path_buf())));
        }

        match find_existing(&default_paths()) {
            Some(path) => Ok((Self::load(&path)?, Some(path))),
            None => Ok((Config::default(), None)),
        }
    }
}

/// Candidate config locations, most specific first
fn default_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("metalcloud.toml")];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("metalcloud/config.toml"));
    }
    paths
}

fn find_existing(candidates: &[PathBuf]) -> Option<PathBuf> {
    candidates.iter().find(|p| p.is_file()).cloned()
}

/// Fully resolved settings for a CLI run
#[derive(Debug, Clone)]
pub struct Settings {
    pub endpoint: String,
    pub api_key: String,
    pub timeout: Duration,
    pub format: OutputFormat,
}

impl Settings {
    /// Merge flags over the config file
    ///
    /// # Errors
    /// Returns error if no endpoint or API key is configured anywhere
    pub fn resolve(cli: &Cli, config: &Config) -> eyre::Result<Self> {
        let endpoint = cli
            .endpoint
            .clone()
            .or_else(|| config.endpoint.clone())
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| {
                eyre!(
                    "no API endpoint configured; pass --endpoint, set METALCLOUD_ENDPOINT \
                     or add `endpoint` to the config file"
                )
            })?;

        let api_key = cli
            .api_key
            .clone()
            .or_else(|| config.api_key.clone())
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                eyre!(
                    "no API key configured; pass --api-key, set METALCLOUD_API_KEY \
                     or add `api_key` to the config file"
                )
            })?;

        Ok(Self {
            endpoint,
            api_key,
            timeout: Duration::from_secs(config.timeout_secs),
            format: cli.format.or(config.format).unwrap_or_default(),
        })
    }
}

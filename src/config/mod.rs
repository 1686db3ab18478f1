//! Configuration for the taskboard CLI.
//!
//! Two knobs: the backend base URL and the request timeout. Values are
//! resolved with the precedence env var > config file > built-in default:
//!
//! - `TB_API_URL` / `api-url` in `config.toml`
//! - `TB_TIMEOUT_SECS` / `timeout-secs` in `config.toml`
//!
//! The config file lives in the taskboard data directory
//! (`~/.local/share/taskboard` on Linux), which can be redirected with
//! `TB_DATA_DIR` - tests use that for isolation. The session file shares
//! the same directory (see the `session` module).

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Env var overriding the backend base URL.
pub const API_URL_ENV: &str = "TB_API_URL";

/// Env var overriding the request timeout in seconds.
pub const TIMEOUT_ENV: &str = "TB_TIMEOUT_SECS";

/// Env var redirecting the data directory (config + session files).
pub const DATA_DIR_ENV: &str = "TB_DATA_DIR";

const CONFIG_FILE: &str = "config.toml";
const DEFAULT_API_URL: &str = "http://localhost:5000/api";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Resolved configuration used to build the API client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL of the task API (no trailing slash)
    pub api_url: String,

    /// Request timeout in seconds; a request exceeding it surfaces as a
    /// network error, never an automatic retry
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Load configuration from the default data directory plus env overrides.
    pub fn load() -> Result<Self> {
        Ok(Self::load_from_dir(&data_dir()?))
    }

    /// Load configuration from an explicit directory plus env overrides.
    pub fn load_from_dir(dir: &Path) -> Self {
        let file = ConfigFile::read(&dir.join(CONFIG_FILE)).unwrap_or_default();
        resolve(
            file,
            std::env::var(API_URL_ENV).ok(),
            std::env::var(TIMEOUT_ENV).ok(),
        )
    }
}

/// On-disk configuration, all fields optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Base URL of the task API
    #[serde(rename = "api-url", skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    /// Request timeout in seconds
    #[serde(rename = "timeout-secs", skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl ConfigFile {
    /// Read the config file; a missing or malformed file reads as empty.
    pub fn read(path: &Path) -> Option<Self> {
        let contents = std::fs::read_to_string(path).ok()?;
        toml::from_str(&contents).ok()
    }

    /// Write the config file, creating the directory if needed.
    pub fn write(&self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir)?;
        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Other(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(dir.join(CONFIG_FILE), contents)?;
        Ok(())
    }

    /// Load the on-disk config for a directory (empty if absent).
    pub fn load_dir(dir: &Path) -> Self {
        Self::read(&dir.join(CONFIG_FILE)).unwrap_or_default()
    }
}

fn resolve(file: ConfigFile, env_api_url: Option<String>, env_timeout: Option<String>) -> Config {
    let api_url = env_api_url
        .filter(|s| !s.is_empty())
        .or(file.api_url)
        .unwrap_or_else(|| DEFAULT_API_URL.to_string());

    let timeout_secs = env_timeout
        .and_then(|s| s.parse::<u64>().ok())
        .or(file.timeout_secs)
        .unwrap_or(DEFAULT_TIMEOUT_SECS);

    Config {
        api_url: api_url.trim_end_matches('/').to_string(),
        timeout_secs,
    }
}

/// Resolve the taskboard data directory.
///
/// `TB_DATA_DIR` takes precedence; otherwise the platform data dir
/// (e.g. `~/.local/share/taskboard`).
pub fn data_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        if !dir.is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    dirs::data_dir()
        .map(|d| d.join("taskboard"))
        .ok_or_else(|| Error::Other("Could not determine data directory".to_string()))
}

//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/agenda/config.toml)
//! 3. Environment variables (AGENDA_* prefix)
//!
//! Environment variables take precedence over config file values.
//!
//! The contact service address is never compiled in: it comes from
//! `base_url`, or from a named entry under `[environments]` when an
//! environment is selected.

use anyhow::{bail, Context, Result};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable prefix
const ENV_PREFIX: &str = "AGENDA";

/// Default service address for local development
const DEFAULT_BASE_URL: &str = "http://localhost:64201";

/// Default request timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// A named deployment of the contact service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    /// Base URL of the contact service in this environment
    pub base_url: String,
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the contact service (used when no environment is selected)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Directory for local files (TUI debug log)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Log file for the TUI (defaults to {data_dir}/debug.log)
    #[serde(default)]
    pub log_file: Option<PathBuf>,

    /// Selected environment name (key of `environments`)
    #[serde(default)]
    pub environment: Option<String>,

    /// Named environments
    #[serde(default)]
    pub environments: BTreeMap<String, Environment>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            data_dir: default_data_dir(),
            log_file: None,
            environment: None,
            environments: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Load configuration from default location and environment
    ///
    /// Order of precedence (highest to lowest):
    /// 1. Environment variables (AGENDA_BASE_URL, AGENDA_ENV, AGENDA_TIMEOUT_SECS, AGENDA_DATA_DIR)
    /// 2. Config file (~/.config/agenda/config.toml or AGENDA_CONFIG)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load configuration, preferring a path given on the command line
    pub fn load_with_cli_override(path: Option<&PathBuf>) -> Result<Self> {
        match path {
            Some(p) => Self::load_from_path(p),
            None => Self::load(),
        }
    }

    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let mut config = Self::load_file_only(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load exactly what the config file holds, without environment overrides
    ///
    /// This is the configuration to edit and save back; overrides only apply
    /// to the running process. If the file doesn't exist, defaults are used.
    pub fn load_file_only(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Load configuration from a TOML string (useful for testing)
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(toml_content).context("Failed to parse config TOML")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        // AGENDA_BASE_URL
        if let Ok(val) = std::env::var(format!("{}_BASE_URL", ENV_PREFIX)) {
            if !val.is_empty() {
                self.base_url = val;
            }
        }

        // AGENDA_ENV
        if let Ok(val) = std::env::var(format!("{}_ENV", ENV_PREFIX)) {
            self.environment = if val.is_empty() { None } else { Some(val) };
        }

        // AGENDA_TIMEOUT_SECS (ignored if not a number)
        if let Ok(val) = std::env::var(format!("{}_TIMEOUT_SECS", ENV_PREFIX)) {
            if let Ok(secs) = val.parse() {
                self.request_timeout_secs = secs;
            }
        }

        // AGENDA_DATA_DIR
        if let Ok(val) = std::env::var(format!("{}_DATA_DIR", ENV_PREFIX)) {
            self.data_dir = PathBuf::from(val);
        }
    }

    /// Select an environment by name (e.g. from a `--env` flag)
    pub fn select_environment(&mut self, name: Option<String>) {
        if let Some(name) = name {
            self.environment = Some(name);
        }
    }

    /// Resolve the contact service base URL
    ///
    /// Uses the selected environment's URL when an environment is selected,
    /// `base_url` otherwise. Fails for unknown environments and for URLs that
    /// are not http(s).
    pub fn service_url(&self) -> Result<Url> {
        let raw = match &self.environment {
            Some(name) => match self.environments.get(name) {
                Some(env) => env.base_url.as_str(),
                None => {
                    let known: Vec<_> = self.environments.keys().map(String::as_str).collect();
                    bail!(
                        "Unknown environment '{}'. Configured environments: {}",
                        name,
                        if known.is_empty() {
                            "(none)".to_string()
                        } else {
                            known.join(", ")
                        }
                    );
                }
            },
            None => self.base_url.as_str(),
        };

        let url = Url::parse(raw).with_context(|| format!("Invalid service URL: '{}'", raw))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            bail!("Service URL must use http or https: '{}'", raw);
        }
        Ok(url)
    }

    /// Per-request timeout
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// Ensure data directory exists
    pub fn ensure_data_dir(&self) -> Result<()> {
        if !self.data_dir.exists() {
            std::fs::create_dir_all(&self.data_dir)
                .with_context(|| format!("Failed to create data directory: {:?}", self.data_dir))?;
        }
        Ok(())
    }

    /// Path of the TUI debug log
    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| self.data_dir.join("debug.log"))
    }

    /// Save configuration to a specific file
    pub fn save_to_path(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;
        Ok(())
    }

    /// Get the config file path
    ///
    /// Can be overridden with AGENDA_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("agenda")
            .join("config.toml")
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// Get the default data directory
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("agenda")
}

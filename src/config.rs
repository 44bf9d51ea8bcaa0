//! Configuration file handling.
//!
//! This module provides loading and saving of gitlab-fingerprint
//! configuration from a TOML file.
//!
//! # Configuration Location
//!
//! The configuration file is stored at:
//! - Linux: `~/.config/gitlab-fingerprint/config.toml`
//! - macOS: `~/Library/Application Support/gitlab-fingerprint/config.toml`
//! - Windows: `%APPDATA%\gitlab-fingerprint\config.toml`
//!
//! # Example Configuration
//!
//! ```toml
//! knowledge_base = "/opt/gitlab-fingerprint/css_versions.json"
//! timeout_secs = 10
//! default_format = "table"
//! parallel = true
//! concurrency = 8
//!
//! [reference]
//! host = "vuldb.com"
//! vendor = "gitlab"
//! product = "gitlab"
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::fetcher::{DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT};
use crate::fingerprint::DEFAULT_CONCURRENCY;
use crate::matcher::{
    ReferenceLinker, DEFAULT_CPE_PRODUCT, DEFAULT_CPE_VENDOR, DEFAULT_REFERENCE_HOST,
};

const APP_DIR: &str = "gitlab-fingerprint";

/// Application configuration.
///
/// Every field has a default, so a partial file (or no file at all) is
/// valid. Command-line flags take precedence over these values.
///
/// # Example
///
/// ```no_run
/// use gitlab_fingerprint::Config;
///
/// let config = Config::load().unwrap();
/// println!("Knowledge base: {}", config.knowledge_base.display());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// CSS-to-version table: a JSON file or a directory of JSON shards.
    ///
    /// Default: `css_versions.json` next to the config file
    pub knowledge_base: PathBuf,

    /// Request timeout in seconds.
    ///
    /// Default: 10
    pub timeout_secs: u64,

    /// User agent sent with every request.
    pub user_agent: String,

    /// Default output format when no `--format` flag is provided.
    ///
    /// Valid values: "table", "json"
    /// Default: "table"
    pub default_format: String,

    /// Whether multiple targets are fingerprinted concurrently.
    ///
    /// Default: true
    pub parallel: bool,

    /// Upper bound on targets fetched at the same time when `parallel`
    /// is set.
    ///
    /// Default: 8
    pub concurrency: usize,

    /// Where reference links point.
    pub reference: ReferenceConfig,
}

/// Settings for the CPE reference links attached to each version.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceConfig {
    /// Host serving `/?cpe=<cpe name>` lookups.
    pub host: String,
    pub vendor: String,
    pub product: String,
}

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_REFERENCE_HOST.to_string(),
            vendor: DEFAULT_CPE_VENDOR.to_string(),
            product: DEFAULT_CPE_PRODUCT.to_string(),
        }
    }
}

impl ReferenceConfig {
    pub fn linker(&self) -> ReferenceLinker {
        ReferenceLinker::new(&self.host, &self.vendor, &self.product)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            knowledge_base: Self::config_dir().join("css_versions.json"),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            default_format: "table".to_string(),
            parallel: true,
            concurrency: DEFAULT_CONCURRENCY,
            reference: ReferenceConfig::default(),
        }
    }
}

impl Config {
    /// Loads configuration from the config file.
    ///
    /// If the config file doesn't exist, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be read or parsed.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Saves the configuration to the config file.
    ///
    /// Creates the parent directory if it doesn't exist.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source: std::io::Error| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).map_err(io_err)?;
        Ok(())
    }

    /// Returns the path to the configuration file.
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
    }

    /// Number of targets to fetch at once, `1` when parallelism is off.
    pub fn effective_concurrency(&self) -> usize {
        if self.parallel {
            self.concurrency.max(1)
        } else {
            1
        }
    }

    /// Generates a string containing the default configuration.
    pub fn generate_default_config() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

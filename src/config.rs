// Configuration loading

use eyre::{Result, WrapErr, eyre};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const APP_DIR: &str = "todolist";
const CONFIG_FILE: &str = "config.yaml";
const DATABASE_FILE: &str = "todo.db";

/// What `create` does when the underlying write fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WriteFailurePolicy {
    /// Log the failure and carry on as if nothing was written
    #[default]
    LogAndSwallow,
    /// Return the failure to the caller
    Propagate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// Path of the SQLite database file
    pub database: PathBuf,
    pub on_write_failure: WriteFailurePolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: default_database_path(),
            on_write_failure: WriteFailurePolicy::default(),
        }
    }
}

impl Config {
    /// Load configuration
    ///
    /// An explicit path must exist. Without one, the default config file is
    /// read if present, otherwise built-in defaults are used.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(eyre!("Config file not found: {}", path.display()));
            }
            return Self::from_file(path);
        }

        match default_config_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => {
                debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Parse a YAML config file
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "Loading config");
        let content = fs::read_to_string(path).wrap_err_with(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml(&content).wrap_err_with(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        // An empty document means "all defaults"
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Config = serde_yaml::from_str(content)?;
        Ok(config)
    }
}

/// `<config_dir>/todolist/config.yaml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}

/// `<data_dir>/todolist/todo.db`, or `./todo.db` when no data dir is known
pub fn default_database_path() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join(APP_DIR).join(DATABASE_FILE))
        .unwrap_or_else(|| PathBuf::from(DATABASE_FILE))
}

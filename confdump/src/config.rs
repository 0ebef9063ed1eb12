//! Configuration management for confdump
//!
//! Default config location: ~/.confdump/config.toml

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::archive::DEFAULT_COMPRESSION_LEVEL;
use crate::source::sqlite::DEFAULT_PAGE_SIZE;

/// Main configuration
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExportConfig {
    /// Version written to VERSION (default: crate version)
    #[serde(default = "default_version")]
    pub version: String,
    /// Parent directory for the temporary working directory
    #[serde(default = "default_work_dir")]
    pub work_dir: PathBuf,
    #[serde(default = "default_compression_level")]
    pub compression_level: i32,
}

fn default_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_work_dir() -> PathBuf {
    std::env::temp_dir()
}

fn default_compression_level() -> i32 {
    DEFAULT_COMPRESSION_LEVEL
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            work_dir: default_work_dir(),
            compression_level: default_compression_level(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Root of the directory-per-collection config store
    #[serde(default = "default_config_root")]
    pub config_root: PathBuf,
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".confdump")
}

fn default_config_root() -> PathBuf {
    default_data_dir().join("config")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            config_root: default_config_root(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// SQLite job database
    #[serde(default = "default_database_path")]
    pub path: PathBuf,
    /// Rows fetched per query while streaming a table
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_database_path() -> PathBuf {
    default_data_dir().join("jobs.db")
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            page_size: default_page_size(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
    pub file: Option<PathBuf>,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            file: None,
        }
    }
}

/// Expand ~ to home directory in path
pub fn expand_tilde(path: &Path) -> Result<PathBuf> {
    let s = path.to_string_lossy();
    if let Some(rest) = s.strip_prefix("~/") {
        let home = dirs::home_dir().ok_or_else(|| anyhow!("Cannot determine home directory"))?;
        Ok(home.join(rest))
    } else if s == "~" {
        dirs::home_dir().ok_or_else(|| anyhow!("Cannot determine home directory"))
    } else {
        Ok(path.to_path_buf())
    }
}

impl Config {
    /// Default config file path (~/.confdump/config.toml)
    pub fn default_path() -> PathBuf {
        default_data_dir().join("config.toml")
    }

    /// Load config from default location, falling back to defaults
    pub fn load() -> Result<Self> {
        Self::load_or_default(&Self::default_path())
    }

    /// Load config from a file that must exist
    pub fn load_from(config_path: &Path) -> Result<Self> {
        let content = fs::read_to_string(config_path)
            .map_err(|e| anyhow!("Cannot read config {:?}: {}", config_path, e))?;
        let mut config: Config = toml::from_str(&content)?;
        config.expand_paths()?;
        Ok(config)
    }

    /// Load config from file path, or use defaults if it does not exist
    pub fn load_or_default(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            Self::load_from(config_path)
        } else {
            let mut config = Config::default();
            config.expand_paths()?;
            Ok(config)
        }
    }

    /// Save config to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        Ok(())
    }

    /// Expand ~ in all paths
    fn expand_paths(&mut self) -> Result<()> {
        self.export.work_dir = expand_tilde(&self.export.work_dir)?;
        self.storage.config_root = expand_tilde(&self.storage.config_root)?;
        self.database.path = expand_tilde(&self.database.path)?;
        if let Some(ref f) = self.logging.file {
            self.logging.file = Some(expand_tilde(f)?);
        }
        Ok(())
    }
}

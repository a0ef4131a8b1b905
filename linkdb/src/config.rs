//! Store configuration.
//!
//! Supports TOML config files, environment variable overrides, and defaults.

use crate::error::{LinkDbError, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

/// Configuration for a store instance.
///
/// With `data_dir` unset the store lives purely in memory; with it set, a
/// snapshot file named after the store is written on every commit and loaded
/// on open.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Name of the store instance; also the snapshot file stem (default: "default")
    pub name: String,
    /// Directory for the snapshot file (default: none, in-memory only)
    pub data_dir: Option<PathBuf>,
    /// Enable zstd compression for snapshots (default: true)
    pub compress_snapshots: bool,
    /// Compression level for zstd (1–22, default: 3)
    pub compression_level: i32,
    /// Whether to fsync the snapshot file after writing (default: true)
    pub sync_on_write: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            data_dir: None,
            compress_snapshots: true,
            compression_level: 3,
            sync_on_write: true,
        }
    }
}

impl StoreConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration for a named on-disk store.
    pub fn on_disk(name: impl Into<String>, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            data_dir: Some(data_dir.into()),
            ..Self::default()
        }
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| LinkDbError::ConfigError(format!("Failed to read config file: {}", e)))?;
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str)
            .map_err(|e| LinkDbError::ConfigError(format!("Invalid TOML: {}", e)))
    }

    /// Saves the configuration to a TOML file.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let toml = toml::to_string_pretty(self)
            .map_err(|e| LinkDbError::ConfigError(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path.as_ref(), toml)
            .map_err(|e| LinkDbError::ConfigError(format!("Failed to write config file: {}", e)))?;
        Ok(())
    }

    /// Applies environment variable overrides, prefixed with `LINKDB_`.
    /// Example: `LINKDB_DATA_DIR=/path` overrides `data_dir`.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(val) = env::var("LINKDB_NAME") {
            self.name = val;
        }
        if let Ok(val) = env::var("LINKDB_DATA_DIR") {
            self.data_dir = Some(PathBuf::from(val));
        }
        if let Ok(val) = env::var("LINKDB_COMPRESS_SNAPSHOTS") {
            self.compress_snapshots = val.parse().map_err(|_| {
                LinkDbError::ConfigError(format!("Invalid compress_snapshots: {}", val))
            })?;
        }
        if let Ok(val) = env::var("LINKDB_COMPRESSION_LEVEL") {
            self.compression_level = val.parse().map_err(|_| {
                LinkDbError::ConfigError(format!("Invalid compression_level: {}", val))
            })?;
        }
        if let Ok(val) = env::var("LINKDB_SYNC_ON_WRITE") {
            self.sync_on_write = val
                .parse()
                .map_err(|_| LinkDbError::ConfigError(format!("Invalid sync_on_write: {}", val)))?;
        }
        Ok(())
    }

    /// Ensures the data directory exists, when one is configured.
    pub fn create_directories(&self) -> Result<()> {
        if let Some(data_dir) = &self.data_dir {
            std::fs::create_dir_all(data_dir).map_err(|e| {
                LinkDbError::ConfigError(format!("Failed to create data dir: {}", e))
            })?;
        }
        Ok(())
    }
}

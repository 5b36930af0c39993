//! Configuration management for ranime.
//!
//! This module handles loading and parsing configuration from TOML files,
//! with sensible defaults for all settings. Every section is optional so a
//! partial file only overrides what it names.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Call cache settings
    pub cache: CacheConfig,

    /// Listing API settings
    pub listing: ListingConfig,

    /// AniList GraphQL settings
    pub anilist: AniListConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

/// Call cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Enable caching of listing pages
    pub enabled: bool,

    /// Cache root directory (None = platform cache directory)
    pub dir: Option<String>,

    /// Entry lifetime in seconds
    pub expiry_seconds: u64,
}

/// Listing API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingConfig {
    /// Custom list endpoint
    pub base_url: String,

    /// Number of records the API returns per page
    pub page_size: u32,

    /// Request timeout in seconds (None = wait indefinitely)
    pub timeout_seconds: Option<u64>,
}

/// AniList configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AniListConfig {
    /// GraphQL endpoint
    pub graphql_url: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log directory path (relative to the cache root or absolute)
    pub log_dir: String,

    /// Default log level (trace, debug, info, warn, error)
    pub default_level: String,

    /// Enable console output
    pub console: bool,

    /// Enable file output
    pub file: bool,

    /// Enable JSON formatting for file logs
    pub json_format: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: None,
            expiry_seconds: 31_200,
        }
    }
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.randomanime.org/api/list/custom".to_string(),
            page_size: 50,
            timeout_seconds: None,
        }
    }
}

impl Default for AniListConfig {
    fn default() -> Self {
        Self {
            graphql_url: "https://graphql.anilist.co".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: "logs".to_string(),
            default_level: "warn".to_string(),
            console: true,
            file: false,
            json_format: false,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// If the file doesn't exist, returns the default configuration.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::debug!(
                path = %path.display(),
                "Config file not found, using defaults"
            );
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        tracing::debug!(
            path = %path.display(),
            "Configuration loaded successfully"
        );

        Ok(config)
    }

    /// Resolve the cache root.
    ///
    /// An explicit override (CLI flag or `CACHE_PATH`) wins over the config
    /// file, which wins over the platform cache directory.
    pub fn cache_root(&self, override_dir: Option<&Path>) -> Result<PathBuf> {
        if let Some(dir) = override_dir {
            return Ok(dir.to_path_buf());
        }
        if let Some(dir) = &self.cache.dir {
            return Ok(PathBuf::from(dir));
        }
        crate::paths::default_cache_root()
            .context("Could not determine a cache directory; pass --cache-dir or set CACHE_PATH")
    }

    /// Get the absolute path for the log directory
    pub fn log_dir(&self, cache_root: &Path) -> PathBuf {
        let log_path = Path::new(&self.logging.log_dir);
        if log_path.is_absolute() {
            log_path.to_path_buf()
        } else {
            cache_root.join(log_path)
        }
    }
}

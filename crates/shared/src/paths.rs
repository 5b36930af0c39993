//! File path utilities for the cache root.
//!
//! Everything ranime persists lives under one root directory: one
//! subdirectory per cached call, the credential files, and the logs.

use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// File name of the persisted auth key
pub const AUTH_KEY_FILE: &str = "auth_key";

/// File name of the persisted list id
pub const LIST_ID_FILE: &str = "id";

const PRESETS_DIR: &str = "presets";

/// Whether `name` is usable as a single directory name under the root
pub fn is_plain_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\'])
}

/// Platform cache directory for ranime (`~/.cache/ranime` on Linux)
pub fn default_cache_root() -> Option<PathBuf> {
    let project_dirs = ProjectDirs::from("", "", "ranime")?;
    Some(project_dirs.cache_dir().to_path_buf())
}

/// File path manager for the cache root
#[derive(Debug, Clone)]
pub struct CachePaths {
    root: PathBuf,
}

impl CachePaths {
    /// Create a new CachePaths with the given root directory
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    // ========== Call cache ==========

    /// Directory holding the entries of one cached function
    pub fn namespace_dir(&self, namespace: &str) -> PathBuf {
        self.root.join(namespace)
    }

    /// Entry file for a cache key inside a namespace
    pub fn entry_file(&self, namespace: &str, key: &str) -> PathBuf {
        self.namespace_dir(namespace).join(key)
    }

    // ========== Credentials ==========

    /// Directory holding credential files, scoped by preset
    pub fn credentials_dir(&self, preset: Option<&str>) -> PathBuf {
        match preset {
            Some(name) => self.root.join(PRESETS_DIR).join(name),
            None => self.root.clone(),
        }
    }

    /// Persisted auth key path
    pub fn auth_key_file(&self, preset: Option<&str>) -> PathBuf {
        self.credentials_dir(preset).join(AUTH_KEY_FILE)
    }

    /// Persisted list id path
    pub fn list_id_file(&self, preset: Option<&str>) -> PathBuf {
        self.credentials_dir(preset).join(LIST_ID_FILE)
    }

    // ========== Utility Methods ==========

    /// Create the root directory
    pub fn create_root(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.root)
    }

    /// Remove the entries of the given cache namespaces.
    ///
    /// Only the named namespace directories are touched. Returns how many
    /// of them existed and were removed.
    pub fn clear_namespaces(&self, namespaces: &[&str]) -> std::io::Result<usize> {
        let mut removed = 0;
        for namespace in namespaces {
            if !is_plain_name(namespace) || *namespace == PRESETS_DIR {
                continue;
            }
            let dir = self.namespace_dir(namespace);
            if dir.is_dir() {
                std::fs::remove_dir_all(&dir)?;
                removed += 1;
            }
        }

        Ok(removed)
    }

    /// Count entry files and their total size for one namespace
    pub fn stats(&self, namespace: &str) -> std::io::Result<CacheStats> {
        let dir = self.namespace_dir(namespace);
        let mut stats = CacheStats::default();

        if !dir.exists() {
            return Ok(stats);
        }

        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            if entry.path().is_file() {
                stats.total_files += 1;
                stats.total_size_bytes += entry.metadata()?.len();
            }
        }

        Ok(stats)
    }
}

/// Cache statistics
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    pub total_files: usize,
    pub total_size_bytes: u64,
}

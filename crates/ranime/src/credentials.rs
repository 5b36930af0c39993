//! Persisted auth key and list id.
//!
//! Values given on the command line are written under the cache root and
//! reused on later runs when the flag is omitted. A preset keeps its own pair.

use shared::paths::is_plain_name;
use shared::CachePaths;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Errors while resolving credentials
#[derive(Debug, Error)]
pub enum CredentialError {
    /// Neither the flag nor a persisted value is available
    #[error(
        "ERROR: {flag} was not provided but {location} doesn't exist yet either.\n\n\
         TIP: Run ranime with {flag} at least once."
    )]
    Missing { flag: &'static str, location: String },

    /// The preset name would not stay a single directory under the cache root
    #[error("invalid preset name `{0}`")]
    InvalidPreset(String),

    /// The credential file could not be read or written
    #[error("failed to access {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Auth key and list id to query with
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub auth_key: String,
    pub list_id: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("auth_key", &"<redacted>")
            .field("list_id", &self.list_id)
            .finish()
    }
}

/// Resolve the auth key, then the list id.
///
/// A provided value is persisted before the next one is resolved, so a run
/// that only supplies `--auth-key` still remembers it when `--id` is missing.
pub fn resolve(
    paths: &CachePaths,
    preset: Option<&str>,
    auth_key: Option<String>,
    list_id: Option<String>,
) -> Result<Credentials, CredentialError> {
    if let Some(name) = preset.filter(|name| !is_plain_name(name)) {
        return Err(CredentialError::InvalidPreset(name.to_string()));
    }

    let auth_key = resolve_one(&paths.auth_key_file(preset), auth_key, "--auth-key")?;
    let list_id = resolve_one(&paths.list_id_file(preset), list_id, "--id")?;

    Ok(Credentials { auth_key, list_id })
}

fn resolve_one(
    path: &Path,
    provided: Option<String>,
    flag: &'static str,
) -> Result<String, CredentialError> {
    match provided.filter(|value| !value.is_empty()) {
        Some(value) => {
            write_value(path, &value)?;
            debug!(path = %path.display(), flag, "Stored credential");
            Ok(value)
        }
        None => read_value(path, flag),
    }
}

fn read_value(path: &Path, flag: &'static str) -> Result<String, CredentialError> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            let value = content.trim_end().to_string();
            if value.is_empty() {
                return Err(CredentialError::Missing {
                    flag,
                    location: path.display().to_string(),
                });
            }
            debug!(path = %path.display(), flag, "Loaded stored credential");
            Ok(value)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(CredentialError::Missing {
            flag,
            location: path.display().to_string(),
        }),
        Err(source) => Err(CredentialError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn write_value(path: &Path, value: &str) -> Result<(), CredentialError> {
    let io_error = |source| CredentialError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_error)?;
    }
    std::fs::write(path, value).map_err(io_error)
}

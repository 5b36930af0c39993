//! Expiring call cache.
//!
//! Memoizes the result of an async call on disk, keyed by a SHA-256 digest of
//! the call's designated arguments. Each wrapped function gets its own
//! namespace directory under the cache root:
//!
//! ```text
//! <root>/<namespace>/<sha256 hex of "value1+value2+...">
//! ```
//!
//! Entries hold the serialized result and an absolute expiry. Expired or
//! unreadable entries are treated as absent and overwritten on the next miss.

use chrono::{DateTime, Duration, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use sha2::{Digest, Sha256};
use shared::paths::is_plain_name;
use shared::CachePaths;
use std::collections::BTreeMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Separator placed between designated argument values before hashing
pub const KEY_SEPARATOR: &str = "+";

/// Errors raised by the cache itself (never by the wrapped call)
#[derive(Debug, Error)]
pub enum CacheError {
    /// The cache was built or invoked in a way that cannot produce a key
    #[error("cache misconfigured: {0}")]
    Configuration(String),

    /// Persisting an entry failed
    #[error("failed to write cache entry {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The result could not be serialized
    #[error("failed to serialize cache entry: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Named arguments of a cached call.
///
/// Values are compared through their canonical string form, so two calls
/// whose designated arguments print the same share an entry.
pub trait CallArguments {
    /// String form of the named argument, if the call carries it
    fn argument(&self, name: &str) -> Option<String>;

    /// Whether the call carries no arguments at all
    fn is_empty(&self) -> bool;
}

/// Keyword-style argument map
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallArgs {
    values: BTreeMap<String, String>,
}

impl CallArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an argument
    pub fn with(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.values.insert(name.into(), value.to_string());
        self
    }
}

impl CallArguments for CallArgs {
    fn argument(&self, name: &str) -> Option<String> {
        self.values.get(name).cloned()
    }

    fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Source of the current time
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// On-disk entry
#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry<T> {
    result: T,
    expiry: DateTime<Utc>,
}

/// Derive the cache key for a call.
///
/// Fails if the call is empty or lacks one of the designated arguments.
pub fn cache_key<A>(designated: &[String], args: &A) -> Result<String, CacheError>
where
    A: CallArguments + ?Sized,
{
    if args.is_empty() {
        return Err(CacheError::Configuration(
            "can't make a cache key for a call without arguments".to_string(),
        ));
    }

    let values = designated
        .iter()
        .map(|name| {
            args.argument(name).ok_or_else(|| {
                CacheError::Configuration(format!("designated argument `{name}` missing from call"))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut hasher = Sha256::new();
    hasher.update(values.join(KEY_SEPARATOR).as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

/// A wrapped async call whose results are memoized on disk.
pub struct ExpiringCache<F, C = SystemClock> {
    paths: CachePaths,
    namespace: String,
    expiry: Duration,
    designated: Vec<String>,
    enabled: bool,
    call: F,
    clock: C,
}

impl<F> ExpiringCache<F, SystemClock> {
    /// Wrap `call`.
    ///
    /// `namespace` names the wrapped function and becomes its directory under
    /// `root`. `designated` lists, in order, the arguments that make up the key.
    pub fn new<I, S>(
        root: impl AsRef<Path>,
        namespace: impl Into<String>,
        expiry_seconds: u64,
        designated: I,
        call: F,
    ) -> Result<Self, CacheError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let namespace = namespace.into();
        let designated: Vec<String> = designated.into_iter().map(Into::into).collect();

        if designated.is_empty() {
            return Err(CacheError::Configuration(
                "at least one designated argument is required".to_string(),
            ));
        }
        if !is_plain_name(&namespace) {
            return Err(CacheError::Configuration(format!(
                "invalid cache namespace `{namespace}`"
            )));
        }

        let expiry_seconds = i64::try_from(expiry_seconds).map_err(|_| {
            CacheError::Configuration(format!("expiry of {expiry_seconds}s is too large"))
        })?;
        let expiry = Duration::try_seconds(expiry_seconds).ok_or_else(|| {
            CacheError::Configuration(format!("expiry of {expiry_seconds}s is too large"))
        })?;

        Ok(Self {
            paths: CachePaths::new(root),
            namespace,
            expiry,
            designated,
            enabled: true,
            call,
            clock: SystemClock,
        })
    }
}

impl<F, C> ExpiringCache<F, C> {
    /// Replace the time source
    pub fn with_clock<C2: Clock>(self, clock: C2) -> ExpiringCache<F, C2> {
        ExpiringCache {
            paths: self.paths,
            namespace: self.namespace,
            expiry: self.expiry,
            designated: self.designated,
            enabled: self.enabled,
            call: self.call,
            clock,
        }
    }

    /// Turn the cache into a pass-through when `enabled` is false
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn designated(&self) -> &[String] {
        &self.designated
    }

    /// Entry file a call maps to
    pub fn entry_path<A: CallArguments + ?Sized>(&self, args: &A) -> Result<PathBuf, CacheError> {
        let key = cache_key(&self.designated, args)?;
        Ok(self.paths.entry_file(&self.namespace, &key))
    }
}

impl<F, C: Clock> ExpiringCache<F, C> {
    /// Call through the cache.
    ///
    /// Returns the stored result when a live entry exists. Otherwise runs the
    /// wrapped call, stores its result and returns it. Errors from the call
    /// are returned untouched and leave the cache unchanged.
    pub async fn invoke<A, R, E, Fut>(&self, args: A) -> Result<R, E>
    where
        A: CallArguments,
        F: Fn(A) -> Fut,
        Fut: Future<Output = Result<R, E>>,
        R: Serialize + DeserializeOwned,
        E: From<CacheError>,
    {
        let path = self.entry_path(&args)?;

        if !self.enabled {
            return (self.call)(args).await;
        }

        if let Some(result) = self.read_live(&path) {
            debug!(namespace = %self.namespace, path = %path.display(), "Cache hit");
            return Ok(result);
        }

        debug!(namespace = %self.namespace, path = %path.display(), "Cache miss");
        let result = (self.call)(args).await?;
        self.write(&path, &result)?;

        Ok(result)
    }

    /// Read an entry, returning its result only if it has not expired
    fn read_live<R: DeserializeOwned>(&self, path: &Path) -> Option<R> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Unreadable cache entry, ignoring");
                return None;
            }
        };

        let entry: CacheEntry<R> = match serde_json::from_str(&content) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Corrupt cache entry, ignoring");
                return None;
            }
        };

        if self.clock.now() < entry.expiry {
            Some(entry.result)
        } else {
            debug!(path = %path.display(), expiry = %entry.expiry, "Cache entry expired");
            None
        }
    }

    fn write<R: Serialize>(&self, path: &Path, result: &R) -> Result<(), CacheError> {
        let entry = CacheEntry {
            result,
            expiry: self.clock.now() + self.expiry,
        };
        let content = serde_json::to_string(&entry)?;

        let dir = self.paths.namespace_dir(&self.namespace);
        std::fs::create_dir_all(&dir).map_err(|source| CacheError::Write {
            path: dir.clone(),
            source,
        })?;

        std::fs::write(path, content).map_err(|source| CacheError::Write {
            path: path.to_path_buf(),
            source,
        })?;

        debug!(path = %path.display(), expiry = %entry.expiry, "Cache stored");
        Ok(())
    }
}

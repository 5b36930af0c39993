//! Error types for ranime.

use crate::cache::CacheError;
use thiserror::Error;

/// Errors from fetching and picking an anime
#[derive(Debug, Error)]
pub enum RanimeError {
    /// Cache misconfiguration or a failed cache write
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// The listing API answered with a non-success status
    #[error("listing API returned {status}: {body}")]
    UpstreamStatus {
        status: reqwest::StatusCode,
        body: String,
    },

    /// The listing API could not be reached
    #[error("listing API request failed: {0}")]
    UpstreamTransport(#[source] reqwest::Error),

    /// The listing API answered with a body that is not a listing page
    #[error("listing API returned a malformed body: {0}")]
    UpstreamBody(#[source] serde_json::Error),

    /// No record can be picked
    #[error("cannot pick an anime: {0}")]
    Sampling(String),
}

/// Result type for ranime operations
pub type Result<T> = std::result::Result<T, RanimeError>;

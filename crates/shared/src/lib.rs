//! Shared library for ranime.
//!
//! This crate provides the ambient pieces used by the `ranime` crate:
//! - Configuration management
//! - Cache root path layout
//! - Logging infrastructure

pub mod config;
pub mod logging;
pub mod paths;

// Re-export commonly used types
pub use config::Config;
pub use logging::LogConfig;
pub use paths::{CachePaths, CacheStats};

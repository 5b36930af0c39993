//! Logging infrastructure for ranime.
//!
//! Console output goes to stderr because stdout carries the anime report.
//! File output rotates daily under the configured log directory.

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log directory path
    pub log_dir: PathBuf,
    /// Component name (used for log file naming)
    pub component: String,
    /// Default log level
    pub default_level: Level,
    /// Enable console output
    pub console: bool,
    /// Enable file output
    pub file: bool,
    /// Enable JSON formatting for file logs
    pub json_format: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from("logs"),
            component: "ranime".to_string(),
            default_level: Level::WARN,
            console: true,
            file: false,
            json_format: false,
        }
    }
}

impl LogConfig {
    /// Build from the `[logging]` config section
    pub fn from_settings(
        settings: &crate::config::LoggingConfig,
        log_dir: PathBuf,
        verbose: bool,
    ) -> Self {
        let default_level = if verbose {
            Level::DEBUG
        } else {
            parse_level(&settings.default_level)
        };

        Self {
            log_dir,
            component: "ranime".to_string(),
            default_level,
            console: settings.console,
            file: settings.file,
            json_format: settings.json_format,
        }
    }
}

/// Parse a level name, falling back to WARN for unknown values
pub fn parse_level(name: &str) -> Level {
    name.parse().unwrap_or(Level::WARN)
}

/// Initialize logging with the given configuration
///
/// Sets up tracing with:
/// - Optional console layer on stderr
/// - Optional daily-rotated file layer, plain or JSON
/// - `RUST_LOG` override of the default filter
pub fn init(config: LogConfig) -> Result<()> {
    // Default to configured level, but allow override via RUST_LOG
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "{}={},shared={},hyper=warn,reqwest=warn,h2=warn",
            config.component, config.default_level, config.default_level
        ))
    });

    let mut layers = Vec::new();

    if config.console {
        let console_layer = fmt::layer()
            .with_target(true)
            .with_level(true)
            .with_thread_ids(false)
            .with_thread_names(false)
            .with_span_events(FmtSpan::NONE)
            .with_writer(std::io::stderr)
            .boxed();
        layers.push(console_layer);
    }

    if config.file {
        std::fs::create_dir_all(&config.log_dir).with_context(|| {
            format!(
                "Failed to create log directory: {}",
                config.log_dir.display()
            )
        })?;

        let file_appender = tracing_appender::rolling::daily(&config.log_dir, &config.component);

        let file_layer = if config.json_format {
            fmt::layer()
                .json()
                .with_target(true)
                .with_level(true)
                .with_current_span(true)
                .with_span_list(false)
                .with_writer(file_appender)
                .boxed()
        } else {
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_ansi(false)
                .with_span_events(FmtSpan::CLOSE)
                .with_writer(file_appender)
                .boxed()
        };

        layers.push(file_layer);
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(layers)
        .try_init()
        .context("Failed to initialize tracing subscriber")?;

    tracing::debug!(
        component = %config.component,
        log_dir = %config.log_dir.display(),
        "Logging initialized"
    );

    Ok(())
}

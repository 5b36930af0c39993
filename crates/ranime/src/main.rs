//! ranime CLI application.

use anyhow::{Context, Result};
use clap::Parser;
use ranime::credentials::{self, CredentialError};
use ranime::discovery::{cached_listing, LISTING_NAMESPACE};
use ranime::{report, AniListClient, Discovery, ListingClient, RngSource};
use shared::{CachePaths, Config, LogConfig};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Find random anime from https://randomanime.org
#[derive(Parser, Debug)]
#[command(name = "ranime", version, about, long_about = None)]
struct Args {
    /// randomanime.org auth key; remembered for later runs
    #[arg(short, long)]
    auth_key: Option<String>,

    /// Custom list id; remembered for later runs
    #[arg(short, long)]
    id: Option<String>,

    /// Keep the auth key and list id under a named preset
    #[arg(short, long)]
    preset: Option<String>,

    /// Cache root directory
    #[arg(long, env = "CACHE_PATH")]
    cache_dir: Option<PathBuf>,

    /// Path to configuration file (defaults to config.toml in the cache root)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Remove cached listing pages before running
    #[arg(long)]
    clear_cache: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let config_path = match &args.config {
        Some(path) => path.clone(),
        None => Config::default()
            .cache_root(args.cache_dir.as_deref())?
            .join("config.toml"),
    };
    let config = Config::from_file(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    let cache_root = config.cache_root(args.cache_dir.as_deref())?;
    let paths = CachePaths::new(&cache_root);
    paths
        .create_root()
        .with_context(|| format!("Failed to create cache root {}", cache_root.display()))?;

    // Initialize logging
    shared::logging::init(LogConfig::from_settings(
        &config.logging,
        config.log_dir(&cache_root),
        args.verbose,
    ))?;

    debug!(config_file = %config_path.display(), cache_root = %cache_root.display(), "Starting ranime");

    if args.clear_cache {
        let removed = paths
            .clear_namespaces(&[LISTING_NAMESPACE])
            .context("Failed to clear cache")?;
        info!(namespaces = removed, "Cache cleared");
    }

    // Credentials come first so a missing value fails before any request
    let credentials = match credentials::resolve(&paths, args.preset.as_deref(), args.auth_key, args.id) {
        Ok(credentials) => credentials,
        Err(e @ CredentialError::Missing { .. }) => {
            println!("{e}");
            std::process::exit(1);
        }
        Err(e) => return Err(e).context("Failed to resolve credentials"),
    };

    let client = ListingClient::new(
        config.listing.base_url.clone(),
        config.listing.timeout_seconds.map(Duration::from_secs),
    )
    .context("Failed to create listing client")?;

    let listing = cached_listing(&cache_root, config.cache.expiry_seconds, client)
        .context("Failed to initialize cache")?
        .with_enabled(config.cache.enabled);

    if let Ok(stats) = paths.stats(listing.namespace()) {
        debug!(
            cached_pages = stats.total_files,
            cache_size_kb = stats.total_size_bytes / 1_000,
            "Cache statistics"
        );
    }

    let mut discovery = Discovery::new(listing, RngSource::thread(), config.listing.page_size)?;
    let anime = discovery
        .discover(&credentials.auth_key, &credentials.list_id)
        .await
        .context("Failed to pick an anime")?;

    let cover_url = match anime.ani_list_id() {
        Some(id) => {
            AniListClient::new(config.anilist.graphql_url.clone())
                .cover_image(id)
                .await
        }
        None => {
            warn!(name = anime.name(), "Anime has no AniList id, skipping cover image");
            None
        }
    };

    print!("{}", report::render(&anime, cover_url.as_deref()));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_no_args() {
        let args = Args::try_parse_from(["ranime"]).unwrap();
        assert!(args.auth_key.is_none());
        assert!(args.id.is_none());
        assert!(args.preset.is_none());
        assert!(!args.clear_cache);
    }

    #[test]
    fn test_parse_short_flags() {
        let args = Args::try_parse_from(["ranime", "-a", "token", "-i", "list-1", "-p", "work"]).unwrap();
        assert_eq!(args.auth_key.as_deref(), Some("token"));
        assert_eq!(args.id.as_deref(), Some("list-1"));
        assert_eq!(args.preset.as_deref(), Some("work"));
    }

    #[test]
    fn test_parse_long_flags() {
        let args = Args::try_parse_from([
            "ranime",
            "--auth-key",
            "token",
            "--id",
            "list-1",
            "--cache-dir",
            "/tmp/ranime",
            "--clear-cache",
        ])
        .unwrap();
        assert_eq!(args.auth_key.as_deref(), Some("token"));
        assert_eq!(args.cache_dir, Some(PathBuf::from("/tmp/ranime")));
        assert!(args.clear_cache);
    }
}

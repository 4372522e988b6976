//! Offline cache maintenance.
//!
//! # Usage
//!
//! ```bash
//! # List cache generations
//! liteshop cache status
//!
//! # Delete every cache generation
//! liteshop cache clear
//! ```
//!
//! # Environment Variables
//!
//! - `OFFLINE_CACHE_DIR` - Cache root directory
//! - `OFFLINE_CACHE_VERSION` - Generation the gateway currently serves from

use std::path::Path;

use tracing::info;

use liteshop_offline::config::OfflineConfig;
use liteshop_offline::store::CacheStore;

/// List cache generations with entry counts and disk usage.
///
/// # Errors
///
/// Returns an error if the cache root cannot be read.
pub async fn status() -> Result<(), Box<dyn std::error::Error>> {
    let config = OfflineConfig::from_env()?;
    let store = CacheStore::new(config.cache_dir.clone());

    let generations = store.generations().await?;
    if generations.is_empty() {
        info!(dir = %config.cache_dir.display(), "No cache generations");
        return Ok(());
    }

    info!("Cache Generations");
    info!("=================");
    for generation in generations {
        let (files, bytes) = dir_stats(&config.cache_dir.join(&generation))?;
        let active = if generation == config.cache_version {
            " (active)"
        } else {
            ""
        };
        info!("  {generation}{active}: {files} files, {bytes} bytes");
    }

    Ok(())
}

/// Delete every cache generation.
///
/// # Errors
///
/// Returns an error if a generation cannot be removed.
pub async fn clear() -> Result<(), Box<dyn std::error::Error>> {
    let config = OfflineConfig::from_env()?;
    let store = CacheStore::new(config.cache_dir.clone());

    let generations = store.generations().await?;
    if generations.is_empty() {
        info!("Nothing to clear");
        return Ok(());
    }

    for generation in &generations {
        store.remove(generation).await?;
        info!(%generation, "Removed cache generation");
    }
    info!(removed = generations.len(), "Cache cleared");

    Ok(())
}

/// Count files and total bytes directly under a generation directory.
fn dir_stats(dir: &Path) -> Result<(usize, u64), std::io::Error> {
    let mut files = 0;
    let mut bytes = 0;
    for entry in std::fs::read_dir(dir)? {
        let metadata = entry?.metadata()?;
        if metadata.is_file() {
            files += 1;
            bytes += metadata.len();
        }
    }
    Ok((files, bytes))
}

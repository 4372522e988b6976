//! Precache manifest: the versioned list of URLs installed ahead of use.
//!
//! The built-in list covers the storefront shell. Operators can point
//! `OFFLINE_MANIFEST` at a JSON array of paths to precache a different set
//! without rebuilding.

use std::path::Path;

use thiserror::Error;

use crate::config::OfflineConfig;

/// Shell assets precached on every install, pinned to the asset version the
/// storefront serves.
const DEFAULT_ASSETS: &[&str] = &[
    "/static/styles.css?v=4",
    "/static/app.js?v=4",
    "/manifest.webmanifest",
];

/// Errors loading a manifest file.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Failed to read manifest {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse manifest {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A named cache generation and the URLs it precaches.
#[derive(Debug, Clone)]
pub struct CacheManifest {
    /// Cache generation name, e.g. `liteshop-v4`
    pub version: String,
    /// Request paths (with query) fetched and stored during install
    pub assets: Vec<String>,
}

impl CacheManifest {
    /// The built-in storefront shell manifest.
    #[must_use]
    pub fn builtin(version: &str) -> Self {
        Self {
            version: version.to_string(),
            assets: DEFAULT_ASSETS.iter().map(ToString::to_string).collect(),
        }
    }

    /// Load a manifest from a JSON file holding an array of paths.
    ///
    /// # Errors
    ///
    /// Returns `ManifestError` if the file cannot be read or is not a JSON
    /// array of strings.
    pub fn from_file(version: &str, path: &Path) -> Result<Self, ManifestError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ManifestError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let assets = serde_json::from_str(&raw).map_err(|source| ManifestError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self {
            version: version.to_string(),
            assets,
        })
    }

    /// Manifest for the configured cache version: the configured file if one
    /// is set, otherwise the built-in list.
    ///
    /// # Errors
    ///
    /// Returns `ManifestError` if a configured manifest file fails to load.
    pub fn resolve(config: &OfflineConfig) -> Result<Self, ManifestError> {
        match &config.manifest_path {
            Some(path) => Self::from_file(&config.cache_version, path),
            None => Ok(Self::builtin(&config.cache_version)),
        }
    }
}

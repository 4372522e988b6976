//! Catalog loading.
//!
//! The catalog is read once at startup from a JSON array of product records.
//! A missing file is not an error: the storefront comes up with an empty
//! grid so a fresh checkout can boot before `liteshop-cli seed` has run. A
//! file that exists but cannot be parsed or validated is a startup error,
//! since serving a silently truncated catalog would be worse than refusing
//! to start.

use std::path::Path;

use liteshop_core::{Catalog, CatalogError, ProductRecord};
use thiserror::Error;

/// Errors from reading the catalog file.
#[derive(Debug, Error)]
pub enum CatalogLoadError {
    #[error("failed to read catalog {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse catalog {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
    #[error(transparent)]
    Invalid(#[from] CatalogError),
}

/// Load the catalog from a JSON file.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read, parsed, or
/// validated. A missing file yields an empty catalog.
pub fn load(path: &Path) -> Result<Catalog, CatalogLoadError> {
    if !path.exists() {
        tracing::warn!(path = %path.display(), "catalog file not found, serving an empty grid");
        return Ok(Catalog::empty());
    }

    let raw = std::fs::read_to_string(path).map_err(|source| CatalogLoadError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let records: Vec<ProductRecord> =
        serde_json::from_str(&raw).map_err(|source| CatalogLoadError::Parse {
            path: path.display().to_string(),
            source,
        })?;

    Ok(Catalog::new(records)?)
}

//! Storefront configuration loaded from environment variables.
//!
//! Every variable has a default so the demo boots with no environment at
//! all.
//!
//! # Environment Variables
//!
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `LITESHOP_CATALOG` - Catalog JSON path (default: data/catalog.json)
//! - `LITESHOP_DATA_DIR` - Key-value store directory (default: the platform
//!   data dir, e.g. `~/.local/share/liteshop`)
//! - `LITESHOP_ASSET_VERSION` - Cache-busting version appended to static
//!   asset URLs (default: 4)

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Path to the catalog JSON file
    pub catalog_path: PathBuf,
    /// Directory holding the persistent key-value store
    pub data_dir: PathBuf,
    /// Version string appended to static asset URLs (`?v=...`)
    pub asset_version: String,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but unparseable.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("STOREFRONT_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_HOST".to_string(), e.to_string())
            })?;
        let port = get_env_or_default("STOREFRONT_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_PORT".to_string(), e.to_string())
            })?;
        let catalog_path =
            PathBuf::from(get_env_or_default("LITESHOP_CATALOG", "data/catalog.json"));
        let data_dir = get_optional_env("LITESHOP_DATA_DIR")
            .map_or_else(default_data_dir, PathBuf::from);
        let asset_version = get_env_or_default("LITESHOP_ASSET_VERSION", "4");

        Ok(Self {
            host,
            port,
            catalog_path,
            data_dir,
            asset_version,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Path to the key-value store file inside the data directory.
    #[must_use]
    pub fn kv_path(&self) -> PathBuf {
        self.data_dir.join("kv.json")
    }
}

/// Platform data directory for the storefront, e.g. `~/.local/share/liteshop`.
fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from(".local/share"))
        .join("liteshop")
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_socket_addr() {
        let config = StorefrontConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            catalog_path: PathBuf::from("data/catalog.json"),
            data_dir: PathBuf::from("/tmp/liteshop"),
            asset_version: "4".to_string(),
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_kv_path_joins_data_dir() {
        let config = StorefrontConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            catalog_path: PathBuf::from("data/catalog.json"),
            data_dir: PathBuf::from("/var/lib/liteshop"),
            asset_version: "4".to_string(),
        };

        assert_eq!(config.kv_path(), PathBuf::from("/var/lib/liteshop/kv.json"));
    }

    #[test]
    fn test_default_data_dir_ends_with_app_name() {
        assert!(default_data_dir().ends_with("liteshop"));
    }
}

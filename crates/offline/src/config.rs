//! Offline gateway configuration loaded from environment variables.
//!
//! Every variable has a default so the demo boots with no environment at
//! all.
//!
//! # Environment Variables
//!
//! - `OFFLINE_HOST` - Bind address (default: 127.0.0.1)
//! - `OFFLINE_PORT` - Listen port (default: 3001)
//! - `OFFLINE_UPSTREAM` - Origin the gateway fronts (default:
//!   `http://127.0.0.1:3000`)
//! - `OFFLINE_CACHE_VERSION` - Name of the cache generation this process
//!   installs and serves from (default: liteshop-v4)
//! - `OFFLINE_CACHE_DIR` - Root directory for cache generations (default:
//!   the platform data dir, e.g. `~/.local/share/liteshop/cache`)
//! - `OFFLINE_MANIFEST` - Optional path to a JSON array of URLs to precache
//!   instead of the built-in asset list

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Offline gateway configuration.
#[derive(Debug, Clone)]
pub struct OfflineConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Origin server all upstream traffic goes to
    pub upstream: Url,
    /// Cache generation name this process installs and serves from
    pub cache_version: String,
    /// Root directory holding one subdirectory per cache generation
    pub cache_dir: PathBuf,
    /// Optional precache manifest file overriding the built-in asset list
    pub manifest_path: Option<PathBuf>,
}

impl OfflineConfig {
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

        let host = get_env_or_default("OFFLINE_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("OFFLINE_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("OFFLINE_PORT", "3001")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("OFFLINE_PORT".to_string(), e.to_string()))?;
        let upstream = get_env_or_default("OFFLINE_UPSTREAM", "http://127.0.0.1:3000")
            .parse::<Url>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("OFFLINE_UPSTREAM".to_string(), e.to_string())
            })?;
        let cache_version = get_env_or_default("OFFLINE_CACHE_VERSION", "liteshop-v4");
        let cache_dir = get_optional_env("OFFLINE_CACHE_DIR")
            .map_or_else(default_cache_dir, PathBuf::from);
        let manifest_path = get_optional_env("OFFLINE_MANIFEST").map(PathBuf::from);

        Ok(Self {
            host,
            port,
            upstream,
            cache_version,
            cache_dir,
            manifest_path,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Absolute upstream URL for a request path and query.
    #[must_use]
    pub fn upstream_url(&self, path_and_query: &str) -> String {
        // Url renders a bare origin with a trailing slash; trim it so the
        // path never doubles up
        format!(
            "{}{}",
            self.upstream.as_str().trim_end_matches('/'),
            path_and_query
        )
    }
}

/// Platform cache directory, e.g. `~/.local/share/liteshop/cache`.
fn default_cache_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from(".local/share"))
        .join("liteshop")
        .join("cache")
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

//! Cache worker lifecycle: install, activate, serve.
//!
//! The worker walks the same state machine a service worker does. Install
//! precaches every manifest asset into a fresh cache generation; any failure
//! abandons the install without writing a partial generation, and the worker
//! goes redundant while whatever was serving before stays in control.
//! Activate prunes every other generation so exactly one remains.

use std::fmt;
use std::time::Duration;

use reqwest::Client;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::config::OfflineConfig;
use crate::manifest::CacheManifest;
use crate::store::{Cache, CacheStore, CachedResponse, StoreError};

/// Errors from the worker lifecycle.
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("invalid lifecycle transition: {from} -> {to}")]
    InvalidTransition { from: WorkerState, to: WorkerState },
    #[error("failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("upstream returned {status} for {url}")]
    UpstreamStatus {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// Lifecycle states, in the order a healthy worker passes through them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Parsed,
    Installing,
    Installed,
    Activating,
    Activated,
    Redundant,
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Parsed => "parsed",
            Self::Installing => "installing",
            Self::Installed => "installed",
            Self::Activating => "activating",
            Self::Activated => "activated",
            Self::Redundant => "redundant",
        };
        f.write_str(name)
    }
}

/// Whether the lifecycle permits moving from one state to another.
///
/// Redundant is terminal, and a worker can only reach it once install has
/// begun.
#[must_use]
pub const fn is_valid_transition(from: WorkerState, to: WorkerState) -> bool {
    use WorkerState::{Activated, Activating, Installed, Installing, Parsed, Redundant};

    matches!(
        (from, to),
        (Parsed, Installing)
            | (Installing, Installed)
            | (Installing, Redundant)
            | (Installed, Activating)
            | (Activating, Activated)
            | (Activating, Redundant)
            | (Activated, Redundant)
    )
}

/// The offline worker: the precache manifest, the HTTP client used to reach
/// the origin, and the cache generation it serves from.
pub struct Worker {
    config: OfflineConfig,
    manifest: CacheManifest,
    client: Client,
    store: CacheStore,
    cache: Cache,
    state: RwLock<WorkerState>,
}

impl Worker {
    /// Build a worker in the `Parsed` state. Nothing touches the network or
    /// the cache directory until [`Worker::install`].
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: OfflineConfig, manifest: CacheManifest) -> Result<Self, WorkerError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(2))
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(WorkerError::Client)?;
        let store = CacheStore::new(config.cache_dir.clone());
        let cache = store.generation(&manifest.version);

        Ok(Self {
            config,
            manifest,
            client,
            store,
            cache,
            state: RwLock::new(WorkerState::Parsed),
        })
    }

    /// Current lifecycle state.
    pub async fn state(&self) -> WorkerState {
        *self.state.read().await
    }

    /// Whether fetch handling is live (install and activate both done).
    pub async fn is_serving(&self) -> bool {
        self.state().await == WorkerState::Activated
    }

    /// HTTP client used for all upstream traffic.
    #[must_use]
    pub const fn client(&self) -> &Client {
        &self.client
    }

    /// The cache generation this worker serves from.
    #[must_use]
    pub const fn cache(&self) -> &Cache {
        &self.cache
    }

    /// Gateway configuration.
    #[must_use]
    pub const fn config(&self) -> &OfflineConfig {
        &self.config
    }

    /// Precache every manifest asset into this worker's cache generation.
    ///
    /// All assets are fetched before anything is written, so a failed
    /// install leaves no partial generation behind. A non-2xx response for
    /// any asset fails the whole install.
    ///
    /// # Errors
    ///
    /// Returns the first fetch or store error; the worker is left redundant.
    pub async fn install(&self) -> Result<(), WorkerError> {
        self.transition(WorkerState::Installing).await?;

        match self.populate().await {
            Ok(count) => {
                tracing::info!(
                    version = %self.manifest.version,
                    assets = count,
                    "install complete"
                );
                self.transition(WorkerState::Installed).await
            }
            Err(error) => {
                tracing::error!(version = %self.manifest.version, %error, "install failed");
                self.transition(WorkerState::Redundant).await?;
                Err(error)
            }
        }
    }

    /// Fetch all manifest assets, then write them all.
    async fn populate(&self) -> Result<usize, WorkerError> {
        let mut fetched = Vec::with_capacity(self.manifest.assets.len());
        for asset in &self.manifest.assets {
            let url = self.config.upstream_url(asset);
            let response = self
                .client
                .get(&url)
                .send()
                .await
                .map_err(|source| WorkerError::Fetch {
                    url: url.clone(),
                    source,
                })?;
            let status = response.status();
            if !status.is_success() {
                return Err(WorkerError::UpstreamStatus { url, status });
            }
            let cached = snapshot(response)
                .await
                .map_err(|source| WorkerError::Fetch { url, source })?;
            fetched.push((asset.as_str(), cached));
        }

        let cache = self.store.open(&self.manifest.version).await?;
        for (asset, cached) in &fetched {
            cache.put(asset, cached).await?;
        }
        Ok(fetched.len())
    }

    /// Take control: prune every cache generation except this worker's so
    /// exactly one remains, then start serving.
    ///
    /// A generation that fails to delete is logged and left behind; pruning
    /// continues past it.
    ///
    /// # Errors
    ///
    /// Returns an error if generations cannot be enumerated at all; the
    /// worker is left redundant.
    pub async fn activate(&self) -> Result<(), WorkerError> {
        self.transition(WorkerState::Activating).await?;

        let generations = match self.store.generations().await {
            Ok(generations) => generations,
            Err(error) => {
                tracing::error!(%error, "activate failed to enumerate cache generations");
                self.transition(WorkerState::Redundant).await?;
                return Err(error.into());
            }
        };

        for generation in generations {
            if generation == self.manifest.version {
                continue;
            }
            match self.store.remove(&generation).await {
                Ok(()) => tracing::info!(%generation, "pruned stale cache generation"),
                Err(error) => {
                    tracing::warn!(%generation, %error, "failed to prune cache generation");
                }
            }
        }

        self.transition(WorkerState::Activated).await?;
        tracing::info!(version = %self.manifest.version, "worker activated");
        Ok(())
    }

    async fn transition(&self, to: WorkerState) -> Result<(), WorkerError> {
        let mut state = self.state.write().await;
        if !is_valid_transition(*state, to) {
            return Err(WorkerError::InvalidTransition { from: *state, to });
        }
        tracing::debug!(from = %*state, to = %to, "worker state transition");
        *state = to;
        Ok(())
    }
}

/// Buffer an upstream response into a cacheable snapshot.
pub(crate) async fn snapshot(response: reqwest::Response) -> Result<CachedResponse, reqwest::Error> {
    let status = response.status().as_u16();
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(ToString::to_string);
    let body = response.bytes().await?.to_vec();

    Ok(CachedResponse {
        status,
        content_type,
        body,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir()
            .join("liteshop-worker-tests")
            .join(uuid::Uuid::new_v4().to_string())
    }

    /// Config pointing at an unroutable upstream so every fetch fails fast.
    fn test_config(cache_dir: PathBuf) -> OfflineConfig {
        OfflineConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 0,
            upstream: "http://127.0.0.1:1".parse().unwrap(),
            cache_version: "liteshop-v4".to_string(),
            cache_dir,
            manifest_path: None,
        }
    }

    #[test]
    fn test_lifecycle_order_is_enforced() {
        assert!(is_valid_transition(WorkerState::Parsed, WorkerState::Installing));
        assert!(is_valid_transition(WorkerState::Installing, WorkerState::Installed));
        assert!(is_valid_transition(WorkerState::Installed, WorkerState::Activating));
        assert!(is_valid_transition(WorkerState::Activating, WorkerState::Activated));

        assert!(!is_valid_transition(WorkerState::Parsed, WorkerState::Activating));
        assert!(!is_valid_transition(WorkerState::Parsed, WorkerState::Installed));
        assert!(!is_valid_transition(WorkerState::Installed, WorkerState::Activated));
        assert!(!is_valid_transition(WorkerState::Activated, WorkerState::Installing));
    }

    #[test]
    fn test_redundant_is_terminal() {
        assert!(is_valid_transition(WorkerState::Installing, WorkerState::Redundant));
        assert!(is_valid_transition(WorkerState::Activating, WorkerState::Redundant));
        assert!(is_valid_transition(WorkerState::Activated, WorkerState::Redundant));

        assert!(!is_valid_transition(WorkerState::Redundant, WorkerState::Installing));
        assert!(!is_valid_transition(WorkerState::Redundant, WorkerState::Parsed));
    }

    #[tokio::test]
    async fn test_new_worker_starts_parsed() {
        let worker = Worker::new(
            test_config(scratch_dir()),
            CacheManifest::builtin("liteshop-v4"),
        )
        .unwrap();

        assert_eq!(worker.state().await, WorkerState::Parsed);
        assert!(!worker.is_serving().await);
    }

    #[tokio::test]
    async fn test_activate_requires_install() {
        let worker = Worker::new(
            test_config(scratch_dir()),
            CacheManifest::builtin("liteshop-v4"),
        )
        .unwrap();

        let err = worker.activate().await.unwrap_err();
        assert!(matches!(err, WorkerError::InvalidTransition { .. }));
        assert_eq!(worker.state().await, WorkerState::Parsed);
    }

    #[tokio::test]
    async fn test_failed_install_leaves_no_generation() {
        let dir = scratch_dir();
        let worker = Worker::new(
            test_config(dir.clone()),
            CacheManifest::builtin("liteshop-v4"),
        )
        .unwrap();

        assert!(worker.install().await.is_err());
        assert_eq!(worker.state().await, WorkerState::Redundant);
        assert!(!worker.is_serving().await);
        assert!(!dir.join("liteshop-v4").exists());
    }

    #[tokio::test]
    async fn test_redundant_worker_cannot_retry_install() {
        let worker = Worker::new(
            test_config(scratch_dir()),
            CacheManifest::builtin("liteshop-v4"),
        )
        .unwrap();

        assert!(worker.install().await.is_err());
        let err = worker.install().await.unwrap_err();
        assert!(matches!(err, WorkerError::InvalidTransition { .. }));
    }
}

//! Versioned response cache on disk.
//!
//! Each cache generation is a directory under the cache root, named by
//! version. An entry is two files keyed by the SHA-256 of the request path
//! and query: a JSON metadata sidecar and the raw body. The body lands
//! before the metadata, so metadata never points at a missing body, and
//! both writes go through a temp-file rename.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Errors from the response cache.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cache I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("cache serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A response held by the cache: just enough to replay it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

/// Metadata sidecar persisted next to each body file.
#[derive(Debug, Serialize, Deserialize)]
struct EntryMeta {
    path: String,
    status: u16,
    content_type: Option<String>,
    stored_at: DateTime<Utc>,
}

/// Root of all cache generations.
#[derive(Debug, Clone)]
pub struct CacheStore {
    root: PathBuf,
}

/// One named cache generation.
#[derive(Debug, Clone)]
pub struct Cache {
    dir: PathBuf,
}

impl CacheStore {
    #[must_use]
    pub const fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Handle to a generation directory without touching the filesystem.
    #[must_use]
    pub fn generation(&self, version: &str) -> Cache {
        Cache {
            dir: self.root.join(version),
        }
    }

    /// Open a generation for writing, creating its directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub async fn open(&self, version: &str) -> Result<Cache, StoreError> {
        let cache = self.generation(version);
        tokio::fs::create_dir_all(&cache.dir).await?;
        Ok(cache)
    }

    /// List existing generation names, sorted. A missing root reads as no
    /// generations.
    ///
    /// # Errors
    ///
    /// Returns an error if the root exists but cannot be read.
    pub async fn generations(&self) -> Result<Vec<String>, StoreError> {
        let mut dir = match tokio::fs::read_dir(&self.root).await {
            Ok(dir) => dir,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(error) => return Err(error.into()),
        };

        let mut names = Vec::new();
        while let Some(entry) = dir.next_entry().await? {
            if entry.file_type().await?.is_dir() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Delete a generation and everything in it. A generation that does not
    /// exist deletes successfully.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory exists but cannot be removed.
    pub async fn remove(&self, version: &str) -> Result<(), StoreError> {
        match tokio::fs::remove_dir_all(self.root.join(version)).await {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(error.into()),
        }
    }
}

impl Cache {
    /// Store a response under a request path and query, replacing any
    /// existing entry.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or a file write fails.
    pub async fn put(&self, path_and_query: &str, response: &CachedResponse) -> Result<(), StoreError> {
        let key = entry_key(path_and_query);
        let body_path = self.dir.join(format!("{key}.bin"));
        let meta_path = self.dir.join(format!("{key}.json"));

        write_atomic(&body_path, &response.body).await?;

        let meta = EntryMeta {
            path: path_and_query.to_string(),
            status: response.status,
            content_type: response.content_type.clone(),
            stored_at: Utc::now(),
        };
        write_atomic(&meta_path, &serde_json::to_vec_pretty(&meta)?).await?;
        Ok(())
    }

    /// Look up a response. Absent or unreadable entries read as a miss.
    pub async fn lookup(&self, path_and_query: &str) -> Option<CachedResponse> {
        let key = entry_key(path_and_query);

        let raw = tokio::fs::read(self.dir.join(format!("{key}.json"))).await.ok()?;
        let meta: EntryMeta = match serde_json::from_slice(&raw) {
            Ok(meta) => meta,
            Err(error) => {
                tracing::warn!(%error, path = path_and_query, "corrupt cache metadata, treating as miss");
                return None;
            }
        };
        let body = match tokio::fs::read(self.dir.join(format!("{key}.bin"))).await {
            Ok(body) => body,
            Err(error) => {
                tracing::warn!(%error, path = path_and_query, "cache body unreadable, treating as miss");
                return None;
            }
        };

        Some(CachedResponse {
            status: meta.status,
            content_type: meta.content_type,
            body,
        })
    }
}

/// Filesystem-safe entry name for a request path and query.
fn entry_key(path_and_query: &str) -> String {
    hex::encode(Sha256::digest(path_and_query.as_bytes()))
}

async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    tokio::fs::write(&tmp, bytes).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn scratch_root() -> PathBuf {
        std::env::temp_dir()
            .join("liteshop-cache-tests")
            .join(uuid::Uuid::new_v4().to_string())
    }

    fn css_response() -> CachedResponse {
        CachedResponse {
            status: 200,
            content_type: Some("text/css".to_string()),
            body: b"body{margin:0}".to_vec(),
        }
    }

    #[tokio::test]
    async fn test_put_then_lookup_round_trips() {
        let root = scratch_root();
        let store = CacheStore::new(root.clone());

        let cache = store.open("liteshop-v4").await.unwrap();
        cache.put("/static/styles.css?v=4", &css_response()).await.unwrap();

        let hit = cache.lookup("/static/styles.css?v=4").await.unwrap();
        assert_eq!(hit, css_response());

        std::fs::remove_dir_all(&root).unwrap();
    }

    #[tokio::test]
    async fn test_lookup_miss_is_none() {
        let root = scratch_root();
        let store = CacheStore::new(root);

        let cache = store.generation("liteshop-v4");
        assert_eq!(cache.lookup("/static/app.js?v=4").await, None);
    }

    #[tokio::test]
    async fn test_put_replaces_existing_entry() {
        let root = scratch_root();
        let store = CacheStore::new(root.clone());

        let cache = store.open("liteshop-v4").await.unwrap();
        cache.put("/a", &css_response()).await.unwrap();
        let replacement = CachedResponse {
            status: 200,
            content_type: Some("text/css".to_string()),
            body: b"body{margin:8px}".to_vec(),
        };
        cache.put("/a", &replacement).await.unwrap();

        assert_eq!(cache.lookup("/a").await.unwrap().body, replacement.body);

        std::fs::remove_dir_all(&root).unwrap();
    }

    #[tokio::test]
    async fn test_corrupt_metadata_reads_as_miss() {
        let root = scratch_root();
        let store = CacheStore::new(root.clone());

        let cache = store.open("liteshop-v4").await.unwrap();
        cache.put("/a", &css_response()).await.unwrap();

        let meta_path = root
            .join("liteshop-v4")
            .join(format!("{}.json", entry_key("/a")));
        std::fs::write(&meta_path, "{corrupt").unwrap();

        assert_eq!(cache.lookup("/a").await, None);

        std::fs::remove_dir_all(&root).unwrap();
    }

    #[tokio::test]
    async fn test_generations_lists_sorted_directories() {
        let root = scratch_root();
        let store = CacheStore::new(root.clone());

        assert_eq!(store.generations().await.unwrap(), Vec::<String>::new());

        store.open("liteshop-v4").await.unwrap();
        store.open("liteshop-v3").await.unwrap();
        assert_eq!(
            store.generations().await.unwrap(),
            vec!["liteshop-v3", "liteshop-v4"]
        );

        std::fs::remove_dir_all(&root).unwrap();
    }

    #[tokio::test]
    async fn test_remove_deletes_generation() {
        let root = scratch_root();
        let store = CacheStore::new(root.clone());

        store.open("liteshop-v3").await.unwrap();
        store.remove("liteshop-v3").await.unwrap();
        assert_eq!(store.generations().await.unwrap(), Vec::<String>::new());

        // Removing a generation that never existed is fine
        store.remove("liteshop-v0").await.unwrap();

        std::fs::remove_dir_all(&root).unwrap();
    }
}

//! JSON-file key-value store.
//!
//! One file, one JSON object, whole-file writes through a temp-file rename.
//! Values are arbitrary JSON; typed access goes through [`KvStore::get`] and
//! [`KvStore::set`]. Writers serialize on an async mutex, so a successful
//! `set` has always reached disk before the call returns.

use std::path::PathBuf;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;
use tokio::sync::Mutex;

/// Errors from the key-value store.
#[derive(Debug, Error)]
pub enum KvError {
    #[error("key-value store I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("key-value store serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// File-backed key-value store.
pub struct KvStore {
    path: PathBuf,
    entries: Mutex<Map<String, Value>>,
}

impl KvStore {
    /// Open the store, creating parent directories as needed.
    ///
    /// A missing file starts empty. A file that no longer parses as a JSON
    /// object is discarded with a warning rather than refusing to boot.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read, or the parent
    /// directory cannot be created.
    pub async fn open(path: PathBuf) -> Result<Self, KvError> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let entries = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => match serde_json::from_str::<Map<String, Value>>(&raw) {
                Ok(entries) => entries,
                Err(error) => {
                    tracing::warn!(
                        %error,
                        path = %path.display(),
                        "discarding malformed key-value store",
                    );
                    Map::new()
                }
            },
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Map::new(),
            Err(error) => return Err(error.into()),
        };

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Read and deserialize a value.
    ///
    /// Returns `None` when the key is absent or the stored value no longer
    /// deserializes to `T` (logged, treated as absent).
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.entries.lock().await.get(key)?.clone();
        match serde_json::from_value(value) {
            Ok(value) => Some(value),
            Err(error) => {
                tracing::warn!(%error, key, "stored value failed to deserialize, treating as absent");
                None
            }
        }
    }

    /// Serialize and store a value, persisting before returning.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the file write fails.
    pub async fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), KvError> {
        let mut entries = self.entries.lock().await;
        entries.insert(key.to_string(), serde_json::to_value(value)?);
        self.persist(&entries).await
    }

    /// Remove a key, persisting before returning.
    ///
    /// # Errors
    ///
    /// Returns an error if the file write fails.
    pub async fn remove(&self, key: &str) -> Result<(), KvError> {
        let mut entries = self.entries.lock().await;
        entries.remove(key);
        self.persist(&entries).await
    }

    async fn persist(&self, entries: &Map<String, Value>) -> Result<(), KvError> {
        let raw = serde_json::to_vec_pretty(entries)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &raw).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

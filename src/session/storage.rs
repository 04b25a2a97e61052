//! Per-account persistence for cart and wishlist snapshots.

use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Storage lock poisoned")]
    Poisoned,
}

/// Host key-value mechanism. Values are opaque strings.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

#[derive(Debug, Default)]
pub struct MemoryStore { entries: Mutex<HashMap<String, String>> }

impl MemoryStore {
    pub fn new() -> Self { Self::default() }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.lock().map_err(|_| StorageError::Poisoned)?.get(key).cloned())
    }
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.lock().map_err(|_| StorageError::Poisoned)?.insert(key.to_string(), value.to_string());
        Ok(())
    }
    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.lock().map_err(|_| StorageError::Poisoned)?.remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per key under a directory.
#[derive(Debug, Clone)]
pub struct FileStore { dir: PathBuf }

impl FileStore {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }
    fn path(&self, key: &str) -> PathBuf { self.dir.join(format!("{key}.json")) }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(self.path(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        std::fs::write(self.path(key), value)?;
        Ok(())
    }
    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match std::fs::remove_file(self.path(key)) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

/// Storage key for `scope` owned by `account_id`.
///
/// Every character outside `[A-Za-z0-9]` becomes `_` so the key is safe for
/// any backing store. This is charset hygiene only.
pub fn storage_key(scope: &str, account_id: &str) -> String {
    let safe: String = account_id.chars().map(|c| if c.is_ascii_alphanumeric() { c } else { '_' }).collect();
    format!("{scope}_{safe}")
}

/// Best-effort JSON snapshot persistence over a [`KeyValueStore`].
#[derive(Clone)]
pub struct SnapshotStore { backend: Arc<dyn KeyValueStore> }

impl SnapshotStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self { Self { backend } }
    pub fn in_memory() -> Self { Self::new(Arc::new(MemoryStore::new())) }
    pub fn backend(&self) -> &Arc<dyn KeyValueStore> { &self.backend }

    /// Reads the saved list. Missing, unreadable and corrupt records all
    /// yield an empty list.
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        let raw = match self.backend.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => { warn!(key, error = %e, "failed to read saved state"); return Vec::new(); }
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!(key, error = %e, "discarding unparseable saved state");
            Vec::new()
        })
    }

    /// Overwrites the saved list. Failures are logged and dropped.
    pub fn save<T: Serialize>(&self, key: &str, items: &[T]) {
        let result = serde_json::to_string(items)
            .map_err(|e| e.to_string())
            .and_then(|json| self.backend.set(key, &json).map_err(|e| e.to_string()));
        match result {
            Ok(()) => debug!(key, items = items.len(), "saved state"),
            Err(error) => warn!(key, %error, "failed to save state"),
        }
    }
}

impl std::fmt::Debug for SnapshotStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.debug_struct("SnapshotStore").finish_non_exhaustive() }
}

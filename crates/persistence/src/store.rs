//! Snapshot Store - persistence adapter interface
//!
//! Mỗi key giữ một JSON snapshot của một collection. Business layer giữ
//! state authoritative trong memory và chỉ gọi `load`/`save` qua trait này.

use crate::error::{PersistenceError, PersistenceResult};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::RwLock;

/// Key/value store of JSON snapshots.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Store name for logging
    fn name(&self) -> &str;

    /// Read the raw JSON stored under `key`
    async fn load(&self, key: &str) -> PersistenceResult<Option<String>>;

    /// Overwrite the snapshot under `key`
    async fn save(&self, key: &str, json: &str) -> PersistenceResult<()>;

    /// Delete `key`; returns whether it existed
    async fn remove(&self, key: &str) -> PersistenceResult<bool>;

    /// All stored keys, sorted
    async fn keys(&self) -> PersistenceResult<Vec<String>>;
}

pub(crate) fn check_key(key: &str) -> PersistenceResult<()> {
    if key.is_empty() {
        return Err(PersistenceError::InvalidKey(key.to_string()));
    }
    Ok(())
}

/// Load and decode a typed snapshot
pub async fn load_json<T: DeserializeOwned>(
    store: &dyn SnapshotStore,
    key: &str,
) -> PersistenceResult<Option<T>> {
    match store.load(key).await? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// Encode and save a typed snapshot
pub async fn save_json<T: Serialize + Sync>(
    store: &dyn SnapshotStore,
    key: &str,
    value: &T,
) -> PersistenceResult<()> {
    let json = serde_json::to_string(value)?;
    store.save(key, &json).await
}

/// In-memory store (tests, ephemeral sessions)
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned() -> PersistenceError {
    PersistenceError::Configuration("memory store lock poisoned".to_string())
}

#[async_trait]
impl SnapshotStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn load(&self, key: &str) -> PersistenceResult<Option<String>> {
        check_key(key)?;
        let entries = self.entries.read().map_err(|_| poisoned())?;
        Ok(entries.get(key).cloned())
    }

    async fn save(&self, key: &str, json: &str) -> PersistenceResult<()> {
        check_key(key)?;
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        entries.insert(key.to_string(), json.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> PersistenceResult<bool> {
        check_key(key)?;
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        Ok(entries.remove(key).is_some())
    }

    async fn keys(&self) -> PersistenceResult<Vec<String>> {
        let entries = self.entries.read().map_err(|_| poisoned())?;
        Ok(entries.keys().cloned().collect())
    }
}

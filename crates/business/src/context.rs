//! Shared runtime context for every store
//!
//! `KycContext` gom persistence adapter, config và hai capability ngoài.
//! `SnapshotCell` giữ một collection trong memory, load (hoặc seed) lần đầu
//! và ghi lại toàn bộ snapshot sau mỗi mutation.

use crate::capability::{DocumentIntegrityChecker, FraudClassifier};
use crate::config::KycConfig;
use crate::error::ServiceResult;
use kycdesk_persistence::{load_json, save_json, SnapshotStore};
use rand::Rng;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

/// Context for store operations - persistence, config, capabilities
pub struct KycContext {
    store: Arc<dyn SnapshotStore>,
    config: KycConfig,
    integrity: Arc<dyn DocumentIntegrityChecker>,
    classifier: Arc<dyn FraudClassifier>,
}

impl KycContext {
    pub fn new(
        store: Arc<dyn SnapshotStore>,
        config: KycConfig,
        integrity: Arc<dyn DocumentIntegrityChecker>,
        classifier: Arc<dyn FraudClassifier>,
    ) -> Self {
        Self {
            store,
            config,
            integrity,
            classifier,
        }
    }

    /// Get persistence adapter
    pub fn store(&self) -> &dyn SnapshotStore {
        self.store.as_ref()
    }

    pub fn config(&self) -> &KycConfig {
        &self.config
    }

    pub fn integrity(&self) -> &dyn DocumentIntegrityChecker {
        self.integrity.as_ref()
    }

    pub fn classifier(&self) -> &dyn FraudClassifier {
        self.classifier.as_ref()
    }

    /// Sleep for the configured latency plus jitter
    pub async fn simulate_latency(&self) {
        let delay = self.latency_sample();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    fn latency_sample(&self) -> Duration {
        let base = self.config.latency();
        if self.config.latency_jitter_ms == 0 {
            return base;
        }
        let jitter = rand::thread_rng().gen_range(0..self.config.latency_jitter_ms);
        base + Duration::from_millis(jitter)
    }
}

/// `{ success }` reply of operations with no other payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    pub success: bool,
}

impl Ack {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

/// One persisted collection, guarded by an async mutex.
///
/// The lock is held for the whole read-check-write of `update`, so two
/// concurrent mutations of the same collection never interleave. Mutations
/// run on a working copy: memory is only replaced after the save succeeds.
pub struct SnapshotCell<T> {
    key: String,
    value: Mutex<Option<T>>,
}

impl<T> SnapshotCell<T>
where
    T: Clone + Serialize + DeserializeOwned + Send + Sync,
{
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: Mutex::new(None),
        }
    }

    /// Snapshot copy of the current value
    pub async fn read<S>(&self, store: &dyn SnapshotStore, seed: S) -> ServiceResult<T>
    where
        S: FnOnce() -> T,
    {
        let mut guard = self.value.lock().await;
        self.ensure(&mut guard, store, seed).await
    }

    /// Apply `f` atomically and persist the result.
    ///
    /// If `f` fails nothing is saved; if the save fails memory is untouched.
    pub async fn update<S, F, R>(
        &self,
        store: &dyn SnapshotStore,
        seed: S,
        f: F,
    ) -> ServiceResult<R>
    where
        S: FnOnce() -> T,
        F: FnOnce(&mut T) -> ServiceResult<R>,
    {
        let mut guard = self.value.lock().await;
        let mut working = self.ensure(&mut guard, store, seed).await?;

        let out = f(&mut working)?;
        save_json(store, &self.key, &working).await?;
        *guard = Some(working);
        Ok(out)
    }

    async fn ensure<S>(
        &self,
        guard: &mut MutexGuard<'_, Option<T>>,
        store: &dyn SnapshotStore,
        seed: S,
    ) -> ServiceResult<T>
    where
        S: FnOnce() -> T,
    {
        if let Some(value) = &**guard {
            return Ok(value.clone());
        }

        let loaded = match load_json::<T>(store, &self.key).await {
            Ok(value) => value,
            Err(e) if e.is_serialization() => {
                warn!(key = %self.key, error = %e, "Unreadable snapshot, re-seeding");
                None
            }
            Err(e) => return Err(e.into()),
        };
        let value = match loaded {
            Some(value) => {
                debug!(key = %self.key, "Loaded snapshot");
                value
            }
            None => {
                let value = seed();
                save_json(store, &self.key, &value).await?;
                debug!(key = %self.key, "Seeded snapshot");
                value
            }
        };
        **guard = Some(value.clone());
        Ok(value)
    }
}

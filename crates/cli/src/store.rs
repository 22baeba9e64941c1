//! Snapshot store selection and status

use anyhow::{Context, Result};
use kycdesk_persistence::{keys, JsonDirStore, SnapshotStore, SqliteStore};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

use crate::StoreKind;

/// Open the chosen backend under `data_dir`, creating it if needed
pub async fn open(data_dir: &Path, kind: StoreKind) -> Result<Arc<dyn SnapshotStore>> {
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create data directory {:?}", data_dir))?;

    let store: Arc<dyn SnapshotStore> = match kind {
        StoreKind::Json => Arc::new(
            JsonDirStore::new(data_dir.join("snapshots"))
                .context("Failed to open snapshot directory")?,
        ),
        StoreKind::Sqlite => Arc::new(
            SqliteStore::open(data_dir.join("kycdesk.db"))
                .await
                .context("Failed to open SQLite store")?,
        ),
    };
    debug!(backend = store.name(), dir = ?data_dir, "Store opened");
    Ok(store)
}

/// Show store status
pub async fn show_status(store: &dyn SnapshotStore, data_dir: &Path) -> Result<()> {
    let stored = store.keys().await.context("Failed to list snapshot keys")?;

    println!("📊 Store Status");
    println!("   Backend: {}", store.name());
    println!("   Data dir: {:?}", data_dir);
    println!();

    if stored.is_empty() {
        println!("   (no snapshots yet)");
        return Ok(());
    }

    for key in &stored {
        match keys::documents_owner(key) {
            Some(owner) => println!("   📄 {:<24} documents of {}", key, owner),
            None => println!("   🗂️  {}", key),
        }
    }
    println!();
    println!("   Total: {} snapshot(s)", stored.len());
    Ok(())
}

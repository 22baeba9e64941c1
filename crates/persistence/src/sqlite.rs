//! SQLite snapshot store
//!
//! Bảng `snapshots(key, value, updated_at)`; save là upsert theo key.

use crate::error::PersistenceResult;
use crate::store::{check_key, SnapshotStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// Row type cho bảng `snapshots`
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct SnapshotRow {
    pub key: String,
    pub value: String,
    pub updated_at: DateTime<Utc>,
}

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Connect to a database URL (e.g. "sqlite:data/kycdesk.db") and create the schema
    pub async fn connect(db_url: &str) -> PersistenceResult<Self> {
        let options = SqliteConnectOptions::from_str(db_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;
        Self::from_pool(pool).await
    }

    /// Open a database file, creating it if missing
    pub async fn open<P: AsRef<Path>>(path: P) -> PersistenceResult<Self> {
        Self::connect(&format!("sqlite:{}", path.as_ref().display())).await
    }

    /// Private in-memory database (for testing)
    pub async fn in_memory() -> PersistenceResult<Self> {
        Self::connect("sqlite::memory:").await
    }

    pub async fn from_pool(pool: SqlitePool) -> PersistenceResult<Self> {
        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> PersistenceResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS snapshots (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at DATETIME NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        debug!("Snapshot schema ready");
        Ok(())
    }

    /// Tất cả snapshot rows (dùng cho lệnh status)
    pub async fn rows(&self) -> PersistenceResult<Vec<SnapshotRow>> {
        let rows = sqlx::query_as::<_, SnapshotRow>(
            "SELECT key, value, updated_at FROM snapshots ORDER BY key",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl SnapshotStore for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn load(&self, key: &str) -> PersistenceResult<Option<String>> {
        check_key(key)?;
        let row = sqlx::query_as::<_, (String,)>("SELECT value FROM snapshots WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|(value,)| value))
    }

    async fn save(&self, key: &str, json: &str) -> PersistenceResult<()> {
        check_key(key)?;
        sqlx::query(
            r#"
            INSERT INTO snapshots (key, value, updated_at) VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(json)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> PersistenceResult<bool> {
        check_key(key)?;
        let result = sqlx::query("DELETE FROM snapshots WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn keys(&self) -> PersistenceResult<Vec<String>> {
        let rows = sqlx::query_as::<_, (String,)>("SELECT key FROM snapshots ORDER BY key")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(|(key,)| key).collect())
    }
}

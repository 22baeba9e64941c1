//! # Kycdesk Persistence
//!
//! Persistence adapter cho Kycdesk - JSON snapshots theo key.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                  SnapshotStore (trait)                   │
//! │  ┌─────────────┐   ┌──────────────┐   ┌───────────────┐  │
//! │  │ MemoryStore │   │ JsonDirStore │   │  SqliteStore  │  │
//! │  │   (tests)   │   │ (<key>.json) │   │  (snapshots)  │  │
//! │  └─────────────┘   └──────────────┘   └───────────────┘  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use kycdesk_persistence::{keys, load_json, save_json, SqliteStore};
//!
//! let store = SqliteStore::open("data/kycdesk.db").await?;
//! save_json(&store, keys::CONSENTS, &consents).await?;
//! let consents: Option<Vec<ConsentRecord>> = load_json(&store, keys::CONSENTS).await?;
//! ```

pub mod error;
pub mod file;
pub mod keys;
pub mod sqlite;
pub mod store;

pub use error::{PersistenceError, PersistenceResult};
pub use file::JsonDirStore;
pub use sqlite::{SnapshotRow, SqliteStore};
pub use store::{load_json, save_json, MemoryStore, SnapshotStore};

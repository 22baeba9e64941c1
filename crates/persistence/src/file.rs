//! JSON directory store - mỗi key là một file `<key>.json`
//!
//! Tương đương local storage của trình duyệt nhưng bền vững trên đĩa.
//! Ghi qua file tạm rồi rename để một snapshot không bao giờ bị ghi dở.

use crate::error::PersistenceResult;
use crate::store::{check_key, SnapshotStore};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

pub struct JsonDirStore {
    base_path: PathBuf,
}

impl JsonDirStore {
    /// Tạo store, tạo thư mục nếu chưa có
    pub fn new<P: AsRef<Path>>(base_path: P) -> PersistenceResult<Self> {
        let base_path = base_path.as_ref().to_path_buf();
        std::fs::create_dir_all(&base_path)?;
        Ok(Self { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn file_path(&self, key: &str) -> PathBuf {
        self.base_path.join(format!("{}.json", encode_key(key)))
    }
}

/// Escape everything outside `[A-Za-z0-9._-]` as `%XX`
fn encode_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for b in key.bytes() {
        if b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'-') {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{:02X}", b));
        }
    }
    out
}

fn decode_key(encoded: &str) -> Option<String> {
    let bytes = encoded.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = encoded.get(i + 1..i + 3)?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}

#[async_trait]
impl SnapshotStore for JsonDirStore {
    fn name(&self) -> &str {
        "json-dir"
    }

    async fn load(&self, key: &str) -> PersistenceResult<Option<String>> {
        check_key(key)?;
        match fs::read_to_string(self.file_path(key)).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, key: &str, json: &str) -> PersistenceResult<()> {
        check_key(key)?;
        let path = self.file_path(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).await?;
        fs::rename(&tmp, &path).await?;
        debug!(key, bytes = json.len(), "Snapshot written");
        Ok(())
    }

    async fn remove(&self, key: &str) -> PersistenceResult<bool> {
        check_key(key)?;
        match fs::remove_file(self.file_path(key)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn keys(&self) -> PersistenceResult<Vec<String>> {
        let mut keys = Vec::new();
        let mut entries = fs::read_dir(&self.base_path).await?;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if let Some(stem) = name.strip_suffix(".json") {
                if let Some(key) = decode_key(stem) {
                    keys.push(key);
                }
            }
        }
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_key_encoding() {
        assert_eq!(encode_key("documents:u@x.com"), "documents%3Au%40x.com");
        assert_eq!(
            decode_key("documents%3Au%40x.com").as_deref(),
            Some("documents:u@x.com")
        );
        assert_eq!(decode_key("bad%4"), None);
    }

    #[tokio::test]
    async fn test_json_dir_roundtrip() {
        let dir = tempdir().unwrap();
        let store = JsonDirStore::new(dir.path()).unwrap();

        store.save("documents:u@x.com", "[1,2]").await.unwrap();
        store.save("profile", "{}").await.unwrap();

        assert_eq!(
            store.load("documents:u@x.com").await.unwrap().as_deref(),
            Some("[1,2]")
        );
        assert_eq!(
            store.keys().await.unwrap(),
            vec!["documents:u@x.com".to_string(), "profile".to_string()]
        );
        assert!(dir.path().join("documents%3Au%40x.com.json").exists());
    }

    #[tokio::test]
    async fn test_json_dir_persists_across_instances() {
        let dir = tempdir().unwrap();
        {
            let store = JsonDirStore::new(dir.path()).unwrap();
            store.save("consents", "[\"a\"]").await.unwrap();
        }
        let store = JsonDirStore::new(dir.path()).unwrap();
        assert_eq!(store.load("consents").await.unwrap().as_deref(), Some("[\"a\"]"));
        assert!(store.remove("consents").await.unwrap());
        assert!(store.load("consents").await.unwrap().is_none());
    }
}

//! JSON file key-value store
//!
//! Keeps every key in a single JSON object on disk. Writes merge the new
//! items into the current object and replace the file atomically.

use super::kv_store::{KeyValueStore, StoredItems};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// File-backed key-value store
#[derive(Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl JsonFileStore {
    /// Create a store backed by the given file
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Initialize the store (create the parent directory if needed)
    pub async fn initialize(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        tracing::info!("Key-value store initialized at: {:?}", self.path);
        Ok(())
    }

    /// Read the whole stored object, empty if the file does not exist yet
    async fn read_all(&self) -> Result<StoredItems> {
        if !fs::try_exists(&self.path).await? {
            return Ok(StoredItems::new());
        }

        let content = fs::read_to_string(&self.path).await?;
        match serde_json::from_str::<Value>(&content)? {
            Value::Object(items) => Ok(items),
            _ => Err(AppError::Storage(format!(
                "Store file is not a JSON object: {:?}",
                self.path
            ))),
        }
    }

    /// Replace the file contents via a temp file and rename
    async fn write_all(&self, items: &StoredItems) -> Result<()> {
        let content = serde_json::to_vec(items)?;

        let temp_path = self.path.with_extension("tmp");
        let written: Result<()> = async {
            let mut file = fs::File::create(&temp_path).await?;
            file.write_all(&content).await?;
            file.sync_all().await?;
            fs::rename(&temp_path, &self.path).await?;
            Ok(())
        }
        .await;

        if let Err(e) = written {
            // Don't leave a half-written temp file next to the store
            let _ = fs::remove_file(&temp_path).await;
            return Err(e);
        }

        tracing::debug!("Wrote store: {:?} ({} bytes)", self.path, content.len());

        Ok(())
    }

    /// Get store file path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get(&self, keys: &[&str]) -> Result<StoredItems> {
        let mut all = self.read_all().await?;

        let items = keys
            .iter()
            .filter_map(|key| all.remove(*key).map(|value| (key.to_string(), value)))
            .collect();

        Ok(items)
    }

    async fn set(&self, items: StoredItems) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let mut all = self.read_all().await?;
        all.extend(items);
        self.write_all(&all).await
    }

    async fn bytes_in_use(&self) -> Result<Option<u64>> {
        if !fs::try_exists(&self.path).await? {
            return Ok(Some(0));
        }

        let metadata = fs::metadata(&self.path).await?;
        Ok(Some(metadata.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    async fn create_test_store() -> (JsonFileStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(temp_dir.path().join("data").join("storage.json"));
        store.initialize().await.unwrap();
        (store, temp_dir)
    }

    fn items(value: Value) -> StoredItems {
        value.as_object().unwrap().clone()
    }

    #[tokio::test]
    async fn test_get_on_missing_file_is_empty() {
        let (store, _temp) = create_test_store().await;

        let stored = store.get(&["theme"]).await.unwrap();

        assert!(stored.is_empty());
        assert_eq!(store.bytes_in_use().await.unwrap(), Some(0));
    }

    #[tokio::test]
    async fn test_set_merges_keys() {
        let (store, _temp) = create_test_store().await;

        store.set(items(json!({"theme": "dark"}))).await.unwrap();
        store
            .set(items(json!({"backgroundOpacity": 0.5})))
            .await
            .unwrap();

        let stored = store
            .get(&["theme", "backgroundOpacity", "missing"])
            .await
            .unwrap();

        assert_eq!(stored.len(), 2);
        assert_eq!(stored["theme"], "dark");
        assert_eq!(stored["backgroundOpacity"], 0.5);
    }

    #[tokio::test]
    async fn test_set_overwrites_existing_key() {
        let (store, _temp) = create_test_store().await;

        store.set(items(json!({"theme": "dark"}))).await.unwrap();
        store.set(items(json!({"theme": "auto"}))).await.unwrap();

        let stored = store.get(&["theme"]).await.unwrap();
        assert_eq!(stored["theme"], "auto");
    }

    #[tokio::test]
    async fn test_bytes_in_use_tracks_file_size() {
        let (store, _temp) = create_test_store().await;

        store
            .set(items(json!({"customBackground": "https://example.com/a.jpg"})))
            .await
            .unwrap();

        let used = store.bytes_in_use().await.unwrap().unwrap();
        let on_disk = std::fs::metadata(store.path()).unwrap().len();
        assert_eq!(used, on_disk);
        assert!(used > 0);
    }

    #[tokio::test]
    async fn test_failed_write_removes_temp_file() {
        let (store, _temp) = create_test_store().await;

        // A directory in place of the file makes the final rename fail
        std::fs::create_dir(store.path()).unwrap();

        let result = store.write_all(&items(json!({"theme": "dark"}))).await;

        assert!(result.is_err());
        assert!(!store.path().with_extension("tmp").exists());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let (store, _temp) = create_test_store().await;

        std::fs::write(store.path(), "[1, 2, 3]").unwrap();

        assert!(store.get(&["theme"]).await.is_err());
    }
}

//! Key-value store abstraction
//!
//! Mirrors the extension local storage API: batched get by key set, batched
//! set by mapping, and an optional usage query. No multi-key atomicity is
//! assumed.

use crate::error::Result;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// Values keyed by storage key, as exchanged with the store
pub type StoredItems = Map<String, Value>;

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the given keys. Missing keys are simply absent from the result.
    async fn get(&self, keys: &[&str]) -> Result<StoredItems>;

    /// Write every key in `items`, leaving other keys untouched
    async fn set(&self, items: StoredItems) -> Result<()>;

    /// Bytes currently used, or `None` when the store cannot report usage
    async fn bytes_in_use(&self) -> Result<Option<u64>> {
        Ok(None)
    }
}

//! In-memory key-value store
//!
//! Used when no persistent backend is wanted and in tests. Reads and writes
//! can be made to fail, the usage capability can be hidden, and every
//! `set` call is counted.

use super::kv_store::{KeyValueStore, StoredItems};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Default)]
pub struct MemoryStore {
    items: Mutex<StoredItems>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    hide_usage: AtomicBool,
    set_calls: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `items`
    pub fn with_items(items: StoredItems) -> Self {
        Self {
            items: Mutex::new(items),
            ..Self::default()
        }
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make `bytes_in_use` report the capability as unavailable
    pub fn hide_usage(&self, hide: bool) {
        self.hide_usage.store(hide, Ordering::SeqCst);
    }

    /// Number of `set` calls so far, failed ones included
    pub fn set_calls(&self) -> usize {
        self.set_calls.load(Ordering::SeqCst)
    }

    /// Copy of everything currently stored
    pub fn items(&self) -> StoredItems {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StoredItems> {
        // Every critical section is a single map operation
        self.items.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, keys: &[&str]) -> Result<StoredItems> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(AppError::Storage("Store unavailable".to_string()));
        }

        let items = self.lock();
        Ok(keys
            .iter()
            .filter_map(|key| items.get(*key).map(|value| (key.to_string(), value.clone())))
            .collect())
    }

    async fn set(&self, items: StoredItems) -> Result<()> {
        self.set_calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::Storage("Write rejected".to_string()));
        }

        self.lock().extend(items);
        Ok(())
    }

    async fn bytes_in_use(&self) -> Result<Option<u64>> {
        if self.hide_usage.load(Ordering::SeqCst) {
            return Ok(None);
        }

        let items = self.lock();
        let used = items
            .iter()
            .map(|(key, value)| key.len() + value.to_string().len())
            .sum::<usize>();

        Ok(Some(used as u64))
    }
}

//! Backgrounds service
//!
//! Manages the uploaded background collection and picks the active
//! background. Every collection change is applied in memory first, then the
//! whole collection is written back; if the write fails the change is rolled
//! back and the error returned.
//!
//! Collection writes go through a single async mutex, so only one is in
//! flight at a time and no write can overwrite a newer collection. They also
//! wait for settings hydration, so the stored collection is never replaced
//! by one that was built before it was loaded.

use super::encoder::{EncodeOptions, ImageEncoder};
use super::state::SettingsState;
use crate::config::{KEY_LOCAL_BACKGROUNDS, STORAGE_QUOTA_BYTES};
use crate::error::{AppError, Result};
use crate::models::{BackgroundEntry, BackgroundType, StorageInfo};
use crate::storage::quota::{self, check_storage_space, estimate_base64_size, format_bytes};
use crate::storage::{KeyValueStore, StoredItems};
use rand::seq::SliceRandom;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Service for managing uploaded backgrounds
#[derive(Clone)]
pub struct BackgroundsService {
    store: Arc<dyn KeyValueStore>,
    state: SettingsState,
    encoder: Arc<dyn ImageEncoder>,
    write_queue: Arc<Mutex<()>>,
}

impl BackgroundsService {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        state: SettingsState,
        encoder: Arc<dyn ImageEncoder>,
    ) -> Self {
        Self {
            store,
            state,
            encoder,
            write_queue: Arc::new(Mutex::new(())),
        }
    }

    /// Current collection, in insertion order
    pub fn list(&self) -> Vec<BackgroundEntry> {
        self.state.read(|s| s.local_backgrounds.clone())
    }

    /// Append a new enabled background and persist the collection.
    /// Waits for settings hydration first.
    pub async fn add_local_background(&self, name: &str, data: &str) -> Result<BackgroundEntry> {
        self.state.wait_until_loaded().await;
        let _queued = self.write_queue.lock().await;

        let entry = self
            .state
            .read(|s| new_entry(name, data, &s.local_backgrounds));
        self.state.modify(|s| {
            s.local_backgrounds.push(entry.clone());
            true
        });

        tracing::info!("Adding background: {} ({})", entry.name, entry.id);

        if let Err(e) = self.persist().await {
            tracing::error!("Failed to save new background {}: {}", entry.id, e);
            self.state.modify(|s| {
                let before = s.local_backgrounds.len();
                s.local_backgrounds.retain(|b| b.id != entry.id);
                s.local_backgrounds.len() != before
            });
            return Err(e);
        }

        Ok(entry)
    }

    /// Remove a background by id. Unknown ids are ignored.
    pub async fn remove_local_background(&self, id: &str) -> Result<()> {
        self.state.wait_until_loaded().await;
        let _queued = self.write_queue.lock().await;

        let mut removed = None;
        self.state.modify(|s| {
            match s.local_backgrounds.iter().position(|b| b.id == id) {
                Some(index) => {
                    removed = Some((index, s.local_backgrounds.remove(index)));
                    true
                }
                None => false,
            }
        });
        let Some((index, entry)) = removed else {
            tracing::debug!("Background not found, nothing to remove: {}", id);
            return Ok(());
        };

        tracing::info!("Removing background: {}", id);

        if let Err(e) = self.persist().await {
            tracing::error!("Failed to save removal of background {}: {}", id, e);
            self.state.modify(|s| {
                let index = index.min(s.local_backgrounds.len());
                s.local_backgrounds.insert(index, entry);
                true
            });
            return Err(e);
        }

        Ok(())
    }

    /// Flip whether a background takes part in random selection.
    /// Unknown ids are ignored.
    pub async fn toggle_local_background(&self, id: &str) -> Result<()> {
        self.state.wait_until_loaded().await;
        let _queued = self.write_queue.lock().await;

        if !self.state.modify(|s| flip_enabled(&mut s.local_backgrounds, id)) {
            tracing::debug!("Background not found, nothing to toggle: {}", id);
            return Ok(());
        }

        if let Err(e) = self.persist().await {
            tracing::error!("Failed to save toggle of background {}: {}", id, e);
            self.state
                .modify(|s| flip_enabled(&mut s.local_backgrounds, id));
            return Err(e);
        }

        Ok(())
    }

    /// Data of a uniformly random enabled background, if any
    pub fn random_local_background(&self) -> Option<String> {
        self.state.read(|s| {
            let enabled: Vec<&BackgroundEntry> =
                s.local_backgrounds.iter().filter(|b| b.enabled).collect();
            enabled
                .choose(&mut rand::thread_rng())
                .map(|b| b.data.clone())
        })
    }

    /// Background to show right now, `None` for the built-in default
    pub fn active_background(&self) -> Option<String> {
        let (background_type, custom_background) =
            self.state.read(|s| (s.background_type, s.custom_background.clone()));

        match background_type {
            BackgroundType::Default => None,
            BackgroundType::Custom if custom_background.is_empty() => None,
            BackgroundType::Custom => Some(custom_background),
            BackgroundType::Local => self.random_local_background(),
        }
    }

    /// Whether `required_bytes` more would fit in the store
    pub async fn check_storage_space(&self, required_bytes: u64) -> bool {
        check_storage_space(self.store.as_ref(), required_bytes).await
    }

    pub async fn storage_info(&self) -> StorageInfo {
        quota::storage_info(self.store.as_ref()).await
    }

    /// Encode an uploaded image and add it if it fits under the quota
    pub async fn import_background(&self, name: &str, file: &[u8]) -> Result<BackgroundEntry> {
        let data = self.encoder.encode(file, EncodeOptions::default()).await?;
        let required = estimate_base64_size(&data);

        if !self.check_storage_space(required).await {
            let info = self.storage_info().await;
            let available = STORAGE_QUOTA_BYTES.saturating_sub(info.used);
            tracing::warn!(
                "Not enough space for background {}: need {}, {} left",
                name,
                format_bytes(required),
                format_bytes(available)
            );
            return Err(AppError::QuotaExceeded {
                required,
                available,
            });
        }

        self.add_local_background(name, &data).await
    }

    async fn persist(&self) -> Result<()> {
        let entries = self.state.read(|s| serde_json::to_value(&s.local_backgrounds))?;

        let mut items = StoredItems::new();
        items.insert(KEY_LOCAL_BACKGROUNDS.to_string(), entries);
        self.store.set(items).await
    }
}

/// Build an entry whose id is the creation instant in milliseconds, bumped
/// past any id already in use
fn new_entry(name: &str, data: &str, existing: &[BackgroundEntry]) -> BackgroundEntry {
    let created_at = chrono::Utc::now().timestamp_millis();

    let mut id = created_at;
    while existing.iter().any(|b| b.id == id.to_string()) {
        id += 1;
    }

    BackgroundEntry {
        id: id.to_string(),
        name: name.to_string(),
        data: data.to_string(),
        enabled: true,
        created_at,
    }
}

fn flip_enabled(entries: &mut [BackgroundEntry], id: &str) -> bool {
    match entries.iter_mut().find(|b| b.id == id) {
        Some(entry) => {
            entry.enabled = !entry.enabled;
            true
        }
        None => false,
    }
}

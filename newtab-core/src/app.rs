//! Application state and initialization
//!
//! This module owns the settings state and the services built on it.
//! Everything is constructed once in `setup` and handed to the presentation
//! layer through `AppState`.

use crate::config::STORE_FILE_NAME;
use crate::error::Result;
use crate::services::{
    BackgroundsService, ImageEncoder, JpegDataUrlEncoder, SettingsService, SettingsState,
    SystemThemeSignal,
};
use crate::storage::{JsonFileStore, KeyValueStore};
use std::path::PathBuf;
use std::sync::Arc;

/// Central application state holding all services
#[derive(Clone)]
pub struct AppState {
    pub settings: SettingsService,
    pub backgrounds: BackgroundsService,
}

impl AppState {
    /// Wire services around the given collaborators. Does not hydrate.
    pub fn with_parts(
        store: Arc<dyn KeyValueStore>,
        signal: Arc<dyn SystemThemeSignal>,
        encoder: Arc<dyn ImageEncoder>,
    ) -> Self {
        let state = SettingsState::new();

        Self {
            settings: SettingsService::new(store.clone(), state.clone(), signal),
            backgrounds: BackgroundsService::new(store, state, encoder),
        }
    }
}

/// Application setup - called once on startup
pub async fn setup(data_dir: PathBuf, signal: Arc<dyn SystemThemeSignal>) -> Result<AppState> {
    tracing::info!("Initializing application");
    tracing::info!("Data directory: {:?}", data_dir);

    let store = JsonFileStore::new(data_dir.join(STORE_FILE_NAME));
    store.initialize().await?;

    let state = AppState::with_parts(Arc::new(store), signal, Arc::new(JpegDataUrlEncoder));
    state.settings.initialize().await;

    tracing::info!("Application initialized successfully");

    Ok(state)
}

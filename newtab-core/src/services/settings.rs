//! Settings service
//!
//! Hydrates settings from the key-value store once at startup and applies
//! user changes optimistically. Scalar settings are written fire-and-forget:
//! a failed write is logged and the in-memory value is kept.

use super::state::SettingsState;
use super::theme::{SystemThemeSignal, ThemeWatcher};
use super::validation::{self, accept};
use crate::config::{
    KEY_BACKGROUND_OPACITY, KEY_BACKGROUND_TYPE, KEY_CUSTOM_BACKGROUND, KEY_LOCAL_BACKGROUNDS,
    KEY_SEARCH_BAR_POSITION_Y, KEY_SHOW_SEARCH_HINTS, KEY_SHOW_TIME_DISPLAY, KEY_THEME,
    MAX_BACKGROUND_OPACITY, MAX_SEARCH_BAR_POSITION_Y, MIN_BACKGROUND_OPACITY,
    MIN_SEARCH_BAR_POSITION_Y, SETTINGS_KEYS,
};
use crate::models::{BackgroundType, DisplayOptions, SettingsSnapshot, Theme};
use crate::storage::{KeyValueStore, StoredItems};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::watch;

/// Service for managing user settings
#[derive(Clone)]
pub struct SettingsService {
    store: Arc<dyn KeyValueStore>,
    state: SettingsState,
    theme: Arc<ThemeWatcher>,
}

impl SettingsService {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        state: SettingsState,
        signal: Arc<dyn SystemThemeSignal>,
    ) -> Self {
        Self {
            store,
            state,
            theme: Arc::new(ThemeWatcher::new(signal)),
        }
    }

    /// Load persisted settings into memory.
    ///
    /// Invalid stored values are ignored in favour of defaults. A failed read
    /// still completes loading, as if nothing had been stored. Only the first
    /// call hydrates.
    pub async fn initialize(&self) {
        if self.state.read(|s| s.is_settings_loaded) {
            tracing::debug!("Settings already loaded, skipping hydration");
            return;
        }

        match self.store.get(SETTINGS_KEYS).await {
            Ok(stored) => {
                self.state.modify(|s| {
                    hydrate(s, &stored);
                    true
                });
                tracing::info!("Settings loaded ({} stored keys)", stored.len());
            }
            Err(e) => {
                tracing::error!("Failed to load settings, using defaults: {}", e);
            }
        }

        self.theme.refresh(&self.state);

        self.state.modify(|s| {
            s.is_settings_loaded = true;
            true
        });
    }

    /// Copy of the current settings
    pub fn snapshot(&self) -> SettingsSnapshot {
        self.state.snapshot()
    }

    /// Receiver notified after every settings change
    pub fn subscribe(&self) -> watch::Receiver<SettingsSnapshot> {
        self.state.subscribe()
    }

    /// Wait until hydration has completed, successfully or not
    pub async fn wait_until_loaded(&self) {
        self.state.wait_until_loaded().await;
    }

    pub async fn set_theme(&self, theme: Theme) {
        self.theme.set_theme(theme, &self.state);

        self.persist(KEY_THEME, items([(KEY_THEME, Value::from(theme.as_str()))]))
            .await;
    }

    /// Switch background source, optionally replacing the custom URL
    pub async fn set_background(&self, background_type: BackgroundType, custom_url: Option<String>) {
        let custom_background = self.state.read(|s| s.custom_background.clone());
        let custom_background = custom_url.unwrap_or(custom_background);

        self.state.modify(|s| {
            let kind_changed = replace(&mut s.background_type, background_type);
            let url_changed = replace(&mut s.custom_background, custom_background.clone());
            kind_changed || url_changed
        });

        self.persist(
            "background",
            items([
                (KEY_BACKGROUND_TYPE, Value::from(background_type.as_str())),
                (KEY_CUSTOM_BACKGROUND, Value::from(custom_background)),
            ]),
        )
        .await;
    }

    /// Set background opacity, clamped to 0..=1
    pub async fn set_background_opacity(&self, opacity: f64) {
        let Some(opacity) = clamp(opacity, MIN_BACKGROUND_OPACITY, MAX_BACKGROUND_OPACITY) else {
            tracing::debug!("Ignoring non-numeric background opacity");
            return;
        };

        self.state
            .modify(|s| replace(&mut s.background_opacity, opacity));

        self.persist(
            KEY_BACKGROUND_OPACITY,
            items([(KEY_BACKGROUND_OPACITY, Value::from(opacity))]),
        )
        .await;
    }

    pub async fn set_display_options(&self, options: DisplayOptions) {
        let (show_time_display, show_search_hints) = self.state.read(|s| {
            (
                options.show_time_display.unwrap_or(s.show_time_display),
                options.show_search_hints.unwrap_or(s.show_search_hints),
            )
        });

        self.state.modify(|s| {
            let time_changed = replace(&mut s.show_time_display, show_time_display);
            let hints_changed = replace(&mut s.show_search_hints, show_search_hints);
            time_changed || hints_changed
        });

        self.persist(
            "display options",
            items([
                (KEY_SHOW_TIME_DISPLAY, Value::from(show_time_display)),
                (KEY_SHOW_SEARCH_HINTS, Value::from(show_search_hints)),
            ]),
        )
        .await;
    }

    /// Set and persist the search bar position, clamped to 0..=100
    pub async fn set_search_bar_position_y(&self, position_y: f64) {
        let Some(position_y) = self.apply_search_bar_position_y(position_y) else {
            return;
        };

        self.persist(
            KEY_SEARCH_BAR_POSITION_Y,
            items([(KEY_SEARCH_BAR_POSITION_Y, Value::from(position_y))]),
        )
        .await;
    }

    /// Update the search bar position in memory only, for continuous dragging.
    /// Call `set_search_bar_position_y` when the drag ends.
    pub fn update_search_bar_position_y(&self, position_y: f64) {
        self.apply_search_bar_position_y(position_y);
    }

    fn apply_search_bar_position_y(&self, position_y: f64) -> Option<f64> {
        let position_y = clamp(position_y, MIN_SEARCH_BAR_POSITION_Y, MAX_SEARCH_BAR_POSITION_Y);
        match position_y {
            Some(position_y) => {
                self.state
                    .modify(|s| replace(&mut s.search_bar_position_y, position_y));
            }
            None => tracing::debug!("Ignoring non-numeric search bar position"),
        }
        position_y
    }

    async fn persist(&self, setting: &str, values: StoredItems) {
        match self.store.set(values).await {
            Ok(()) => tracing::debug!("Saved {} setting", setting),
            Err(e) => tracing::error!("Failed to save {} setting: {}", setting, e),
        }
    }
}

/// Apply every valid stored value to `s`, leaving defaults for the rest
fn hydrate(s: &mut SettingsSnapshot, stored: &StoredItems) {
    if let Some(theme) = accept(stored, KEY_THEME, validation::theme) {
        s.theme = theme;
    }
    if let Some(kind) = accept(stored, KEY_BACKGROUND_TYPE, validation::background_type) {
        s.background_type = kind;
    }
    if let Some(url) = accept(stored, KEY_CUSTOM_BACKGROUND, validation::string) {
        s.custom_background = url;
    }
    if let Some(entries) = accept(stored, KEY_LOCAL_BACKGROUNDS, validation::local_backgrounds) {
        s.local_backgrounds = entries;
    }
    if let Some(opacity) = accept(stored, KEY_BACKGROUND_OPACITY, validation::background_opacity) {
        s.background_opacity = opacity;
    }
    if let Some(show) = accept(stored, KEY_SHOW_TIME_DISPLAY, validation::boolean) {
        s.show_time_display = show;
    }
    if let Some(show) = accept(stored, KEY_SHOW_SEARCH_HINTS, validation::boolean) {
        s.show_search_hints = show;
    }
    if let Some(position) = accept(
        stored,
        KEY_SEARCH_BAR_POSITION_Y,
        validation::search_bar_position_y,
    ) {
        s.search_bar_position_y = position;
    }
}

/// Clamp into `min..=max`; NaN is rejected
fn clamp(value: f64, min: f64, max: f64) -> Option<f64> {
    if value.is_nan() {
        None
    } else {
        Some(value.clamp(min, max))
    }
}

/// Assign and report whether the value changed
fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}

fn items<const N: usize>(pairs: [(&str, Value); N]) -> StoredItems {
    pairs
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

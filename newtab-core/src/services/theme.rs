//! Theme resolution
//!
//! Resolves the effective dark-mode flag and keeps a single system
//! preference listener installed while the theme is `auto`.

use super::state::SettingsState;
use crate::models::Theme;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// Callback receiving the new "prefers dark" value
pub type PreferenceListener = Arc<dyn Fn(bool) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Source of the system dark-mode preference
pub trait SystemThemeSignal: Send + Sync {
    fn prefers_dark(&self) -> bool;

    fn subscribe(&self, listener: PreferenceListener) -> ListenerId;

    fn unsubscribe(&self, id: ListenerId);
}

/// Dark-mode flag for `theme` given the current system preference
pub fn resolve_dark_mode(theme: Theme, system_prefers_dark: bool) -> bool {
    match theme {
        Theme::Dark => true,
        Theme::Light => false,
        Theme::Auto => system_prefers_dark,
    }
}

/// Owns the system preference subscription for one settings state
pub struct ThemeWatcher {
    signal: Arc<dyn SystemThemeSignal>,
    active: Mutex<Option<ListenerId>>,
}

impl ThemeWatcher {
    pub fn new(signal: Arc<dyn SystemThemeSignal>) -> Self {
        Self {
            signal,
            active: Mutex::new(None),
        }
    }

    /// Store `theme` in `state`, install or remove the listener as needed,
    /// then recompute `is_dark_mode`. Concurrent calls are serialized, so the
    /// listener and the dark-mode flag always match the last theme written.
    pub fn set_theme(&self, theme: Theme, state: &SettingsState) {
        let mut active = self.lock();
        self.apply(&mut active, theme, state);
    }

    /// Re-apply whatever theme `state` currently holds
    pub fn refresh(&self, state: &SettingsState) {
        let mut active = self.lock();
        let theme = state.read(|s| s.theme);
        self.apply(&mut active, theme, state);
    }

    /// Whether a system preference listener is currently installed
    #[cfg(test)]
    pub(crate) fn is_listening(&self) -> bool {
        self.lock().is_some()
    }

    fn apply(&self, active: &mut Option<ListenerId>, theme: Theme, state: &SettingsState) {
        self.sync_listener(active, theme, state);

        state.modify(|s| {
            let dark = resolve_dark_mode(theme, self.signal.prefers_dark());
            if s.theme == theme && s.is_dark_mode == dark {
                return false;
            }
            s.theme = theme;
            s.is_dark_mode = dark;
            true
        });
    }

    fn sync_listener(&self, active: &mut Option<ListenerId>, theme: Theme, state: &SettingsState) {
        match (theme, *active) {
            (Theme::Auto, None) => {
                let state = state.clone();
                let listener: PreferenceListener = Arc::new(move |prefers_dark| {
                    state.modify(|s| {
                        if s.theme != Theme::Auto || s.is_dark_mode == prefers_dark {
                            return false;
                        }
                        s.is_dark_mode = prefers_dark;
                        true
                    });
                });
                *active = Some(self.signal.subscribe(listener));
                tracing::debug!("System theme listener installed");
            }
            (Theme::Light | Theme::Dark, Some(id)) => {
                self.signal.unsubscribe(id);
                *active = None;
                tracing::debug!("System theme listener removed");
            }
            _ => {}
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<ListenerId>> {
        self.active.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for ThemeWatcher {
    fn drop(&mut self) {
        if let Some(id) = self.lock().take() {
            self.signal.unsubscribe(id);
        }
    }
}

/// Preference signal driven by the host, e.g. from a `prefers-color-scheme`
/// media query bridge. `set_prefers_dark` fans out to every listener.
#[derive(Default)]
pub struct ManualThemeSignal {
    prefers_dark: AtomicBool,
    next_id: AtomicU64,
    listeners: Mutex<HashMap<ListenerId, PreferenceListener>>,
}

impl ManualThemeSignal {
    pub fn new(prefers_dark: bool) -> Self {
        Self {
            prefers_dark: AtomicBool::new(prefers_dark),
            ..Self::default()
        }
    }

    pub fn set_prefers_dark(&self, prefers_dark: bool) {
        let previous = self.prefers_dark.swap(prefers_dark, Ordering::SeqCst);
        if previous == prefers_dark {
            return;
        }

        // Call outside the lock so listeners may (un)subscribe
        let listeners: Vec<PreferenceListener> = self.lock().values().cloned().collect();
        for listener in listeners {
            listener(prefers_dark);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<ListenerId, PreferenceListener>> {
        self.listeners.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SystemThemeSignal for ManualThemeSignal {
    fn prefers_dark(&self) -> bool {
        self.prefers_dark.load(Ordering::SeqCst)
    }

    fn subscribe(&self, listener: PreferenceListener) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.lock().insert(id, listener);
        id
    }

    fn unsubscribe(&self, id: ListenerId) {
        self.lock().remove(&id);
    }
}

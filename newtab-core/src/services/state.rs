//! Shared settings state
//!
//! The single owned copy of [`SettingsSnapshot`], shared by the settings and
//! background services. Every effective change is published to subscribers
//! through a `tokio::sync::watch` channel.

use crate::models::SettingsSnapshot;
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Clone)]
pub struct SettingsState {
    tx: Arc<watch::Sender<SettingsSnapshot>>,
}

impl SettingsState {
    pub fn new() -> Self {
        Self {
            tx: Arc::new(watch::Sender::new(SettingsSnapshot::default())),
        }
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> SettingsSnapshot {
        self.tx.borrow().clone()
    }

    /// Read a value without cloning the whole snapshot
    pub fn read<R>(&self, f: impl FnOnce(&SettingsSnapshot) -> R) -> R {
        f(&self.tx.borrow())
    }

    /// Receiver notified after every effective change
    pub fn subscribe(&self) -> watch::Receiver<SettingsSnapshot> {
        self.tx.subscribe()
    }

    /// Wait until hydration has completed, successfully or not
    pub async fn wait_until_loaded(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives as long as `self`, so this cannot fail
        let _ = rx.wait_for(|s| s.is_settings_loaded).await;
    }

    /// Mutate the state in place. `f` returns whether anything changed;
    /// subscribers are only notified when it did.
    pub(crate) fn modify(&self, f: impl FnOnce(&mut SettingsSnapshot) -> bool) -> bool {
        self.tx.send_if_modified(f)
    }
}

impl Default for SettingsState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscribers_see_effective_changes_only() {
        let state = SettingsState::new();
        let mut rx = state.subscribe();

        state.modify(|_| false);
        assert!(!rx.has_changed().unwrap());

        state.modify(|s| {
            s.show_time_display = false;
            true
        });
        assert!(rx.has_changed().unwrap());
        assert!(!rx.borrow_and_update().show_time_display);
    }

    #[tokio::test]
    async fn test_wait_until_loaded_returns_once_loaded() {
        let state = SettingsState::new();

        let waiter = {
            let state = state.clone();
            tokio::spawn(async move { state.wait_until_loaded().await })
        };
        tokio::task::yield_now().await;
        assert!(!waiter.is_finished());

        state.modify(|s| {
            s.is_settings_loaded = true;
            true
        });
        waiter.await.unwrap();

        // Already loaded: returns immediately
        state.wait_until_loaded().await;
    }

    #[test]
    fn test_modify_without_subscribers() {
        let state = SettingsState::new();

        state.modify(|s| {
            s.background_opacity = 0.3;
            true
        });

        assert_eq!(state.read(|s| s.background_opacity), 0.3);
    }
}

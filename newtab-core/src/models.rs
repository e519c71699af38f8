//! Settings models
//!
//! Rust structs representing persisted and observable settings.
//! All models use serde with camelCase names, matching the storage keys.

use crate::config::{DEFAULT_BACKGROUND_OPACITY, DEFAULT_SEARCH_BAR_POSITION_Y};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Color theme preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
    /// Follow the system dark-mode preference
    Auto,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::Auto => "auto",
        }
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            "auto" => Ok(Theme::Auto),
            other => Err(format!("Unknown theme: {}", other)),
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the page background comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundType {
    #[default]
    Default,
    /// A user-supplied image URL
    Custom,
    /// One of the uploaded local backgrounds, picked at random
    Local,
}

impl BackgroundType {
    pub fn as_str(self) -> &'static str {
        match self {
            BackgroundType::Default => "default",
            BackgroundType::Custom => "custom",
            BackgroundType::Local => "local",
        }
    }
}

impl FromStr for BackgroundType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "default" => Ok(BackgroundType::Default),
            "custom" => Ok(BackgroundType::Custom),
            "local" => Ok(BackgroundType::Local),
            other => Err(format!("Unknown background type: {}", other)),
        }
    }
}

/// An uploaded background image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackgroundEntry {
    pub id: String,
    pub name: String,
    /// Base64 data URL of the encoded image
    pub data: String,
    /// Only enabled entries take part in random selection
    pub enabled: bool,
    /// Creation instant in milliseconds since the Unix epoch
    pub created_at: i64,
}

/// Display toggles, `None` leaves the current value untouched
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayOptions {
    pub show_time_display: Option<bool>,
    pub show_search_hints: Option<bool>,
}

/// Live settings state, as observed by the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsSnapshot {
    pub theme: Theme,
    pub is_dark_mode: bool,
    pub background_type: BackgroundType,
    /// Empty string means no custom background is set
    pub custom_background: String,
    pub local_backgrounds: Vec<BackgroundEntry>,
    pub background_opacity: f64,
    pub show_time_display: bool,
    pub show_search_hints: bool,
    pub search_bar_position_y: f64,
    pub is_settings_loaded: bool,
}

impl Default for SettingsSnapshot {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            is_dark_mode: false,
            background_type: BackgroundType::default(),
            custom_background: String::new(),
            local_backgrounds: Vec::new(),
            background_opacity: DEFAULT_BACKGROUND_OPACITY,
            show_time_display: true,
            show_search_hints: true,
            search_bar_position_y: DEFAULT_SEARCH_BAR_POSITION_Y,
            is_settings_loaded: false,
        }
    }
}

/// Storage usage summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StorageInfo {
    pub used: u64,
    pub total: u64,
    /// Rounded to the nearest whole percent
    pub percentage: u32,
}

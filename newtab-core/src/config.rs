//! Application configuration constants
//!
//! Central location for storage keys, value ranges, defaults and
//! resource limits used throughout the crate.

// ===== Storage Keys =====

pub const KEY_THEME: &str = "theme";
pub const KEY_BACKGROUND_TYPE: &str = "backgroundType";
pub const KEY_CUSTOM_BACKGROUND: &str = "customBackground";
pub const KEY_LOCAL_BACKGROUNDS: &str = "localBackgrounds";
pub const KEY_BACKGROUND_OPACITY: &str = "backgroundOpacity";
pub const KEY_SHOW_TIME_DISPLAY: &str = "showTimeDisplay";
pub const KEY_SHOW_SEARCH_HINTS: &str = "showSearchHints";
pub const KEY_SEARCH_BAR_POSITION_Y: &str = "searchBarPositionY";

/// Every key read during hydration, fetched in one batched request
pub const SETTINGS_KEYS: &[&str] = &[
    KEY_THEME,
    KEY_BACKGROUND_TYPE,
    KEY_CUSTOM_BACKGROUND,
    KEY_LOCAL_BACKGROUNDS,
    KEY_BACKGROUND_OPACITY,
    KEY_SHOW_TIME_DISPLAY,
    KEY_SHOW_SEARCH_HINTS,
    KEY_SEARCH_BAR_POSITION_Y,
];

// ===== Value Ranges =====

pub const MIN_BACKGROUND_OPACITY: f64 = 0.0;
pub const MAX_BACKGROUND_OPACITY: f64 = 1.0;

/// Search bar vertical position, as a percentage of the viewport height
pub const MIN_SEARCH_BAR_POSITION_Y: f64 = 0.0;
pub const MAX_SEARCH_BAR_POSITION_Y: f64 = 100.0;

// ===== Defaults =====

pub const DEFAULT_BACKGROUND_OPACITY: f64 = 0.8;
pub const DEFAULT_SEARCH_BAR_POSITION_Y: f64 = 30.0;

// ===== Storage Quota =====

/// Extension local storage ceiling (5 MiB in most browsers)
pub const STORAGE_QUOTA_BYTES: u64 = 5 * 1024 * 1024;

// ===== Image Encoding =====

pub const DEFAULT_IMAGE_MAX_WIDTH: u32 = 1920;
pub const DEFAULT_IMAGE_MAX_HEIGHT: u32 = 1080;

/// JPEG quality in the 0..=1 range
pub const DEFAULT_IMAGE_QUALITY: f32 = 0.8;

// ===== Runtime =====

/// Environment variable overriding the data directory used by the binary
pub const DATA_DIR_ENV: &str = "NEWTAB_DATA_DIR";
pub const DEFAULT_DATA_DIR: &str = "newtab-data";

/// File name of the JSON key-value store inside the data directory
pub const STORE_FILE_NAME: &str = "storage.json";

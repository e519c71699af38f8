//! Services module
//!
//! Settings and background logic on top of the shared settings state.

pub mod backgrounds;
pub mod encoder;
pub mod settings;
pub mod state;
pub mod theme;
pub mod validation;

pub use backgrounds::BackgroundsService;
pub use encoder::{EncodeOptions, ImageEncoder, JpegDataUrlEncoder};
pub use settings::SettingsService;
pub use state::SettingsState;
pub use theme::{ManualThemeSignal, SystemThemeSignal};

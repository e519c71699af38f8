// newtab-core - settings host for the new-tab extension
// Entry point: hydrates settings from the data directory and reports them

use newtab_core::config::{DATA_DIR_ENV, DEFAULT_DATA_DIR};
use newtab_core::services::ManualThemeSignal;
use newtab_core::storage::quota::format_bytes;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "newtab_core=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting newtab-core");

    let data_dir = std::env::var_os(DATA_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

    let signal = Arc::new(ManualThemeSignal::new(false));
    let state = newtab_core::app::setup(data_dir, signal).await?;

    let snapshot = state.settings.snapshot();
    let usage = state.backgrounds.storage_info().await;

    tracing::info!(
        "Theme: {} (dark mode: {}), background: {}, {} local backgrounds",
        snapshot.theme,
        snapshot.is_dark_mode,
        snapshot.background_type.as_str(),
        snapshot.local_backgrounds.len()
    );
    tracing::info!(
        "Storage: {} of {} used ({}%)",
        format_bytes(usage.used),
        format_bytes(usage.total),
        usage.percentage
    );

    println!("{}", serde_json::to_string_pretty(&snapshot)?);

    Ok(())
}

//! Storage quota helpers
//!
//! The admission check is advisory: when usage cannot be queried the write is
//! assumed to fit, and the store itself stays the real enforcement point.

use super::kv_store::KeyValueStore;
use crate::config::STORAGE_QUOTA_BYTES;
use crate::models::StorageInfo;

/// Check whether `required_bytes` more would still fit under the quota
pub async fn check_storage_space(store: &dyn KeyValueStore, required_bytes: u64) -> bool {
    match store.bytes_in_use().await {
        Ok(Some(used)) => used.saturating_add(required_bytes) <= STORAGE_QUOTA_BYTES,
        Ok(None) => true,
        Err(e) => {
            tracing::error!("Failed to check storage space: {}", e);
            true
        }
    }
}

/// Current usage against the quota. Reports zero usage if it cannot be queried.
pub async fn storage_info(store: &dyn KeyValueStore) -> StorageInfo {
    let used = match store.bytes_in_use().await {
        Ok(Some(used)) => used,
        Ok(None) => 0,
        Err(e) => {
            tracing::error!("Failed to get storage info: {}", e);
            0
        }
    };

    let percentage = ((used as f64 / STORAGE_QUOTA_BYTES as f64) * 100.0).round() as u32;

    StorageInfo {
        used,
        total: STORAGE_QUOTA_BYTES,
        percentage,
    }
}

/// Estimate decoded size of a base64 payload, ignoring any data-URL prefix
pub fn estimate_base64_size(data: &str) -> u64 {
    let payload = data.split_once(',').map_or(data, |(_, payload)| payload);
    (payload.len() as u64 * 3) / 4
}

/// Format a byte count for display, e.g. `1.5 KB`
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = format!("{:.2}", value);
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use serde_json::json;

    fn store_using(bytes: usize) -> MemoryStore {
        // "k" plus the quoted string value
        let filler = "x".repeat(bytes - 3);
        let items = json!({ "k": filler }).as_object().unwrap().clone();
        MemoryStore::with_items(items)
    }

    #[tokio::test]
    async fn test_fits_under_quota() {
        let store = store_using(1024);

        assert!(check_storage_space(&store, 1024).await);
        assert!(check_storage_space(&store, STORAGE_QUOTA_BYTES - 1024).await);
        assert!(!check_storage_space(&store, STORAGE_QUOTA_BYTES - 1023).await);
    }

    #[tokio::test]
    async fn test_missing_capability_fits() {
        let store = store_using(1024);
        store.hide_usage(true);

        assert!(check_storage_space(&store, STORAGE_QUOTA_BYTES * 2).await);

        let info = storage_info(&store).await;
        assert_eq!(info.used, 0);
        assert_eq!(info.percentage, 0);
    }

    #[tokio::test]
    async fn test_storage_info_percentage() {
        let store = store_using(STORAGE_QUOTA_BYTES as usize / 4);

        let info = storage_info(&store).await;

        assert_eq!(info.total, STORAGE_QUOTA_BYTES);
        assert_eq!(info.used, STORAGE_QUOTA_BYTES / 4);
        assert_eq!(info.percentage, 25);
    }

    #[test]
    fn test_estimate_base64_size() {
        assert_eq!(estimate_base64_size("data:image/jpeg;base64,AAAA"), 3);
        assert_eq!(estimate_base64_size("AAAAAAAA"), 6);
        assert_eq!(estimate_base64_size("data:image/png;base64,"), 0);
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1024), "1 KB");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5 MB");
        assert_eq!(format_bytes(3 * 1024 * 1024 * 1024), "3 GB");
    }
}

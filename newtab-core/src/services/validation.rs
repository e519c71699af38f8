//! Validation of stored values
//!
//! Everything read back from the store is untrusted. Each validator turns a
//! raw JSON value into either a typed value or a rejection; rejected values
//! leave the in-memory default in place.

use crate::config::{
    MAX_BACKGROUND_OPACITY, MAX_SEARCH_BAR_POSITION_Y, MIN_BACKGROUND_OPACITY,
    MIN_SEARCH_BAR_POSITION_Y,
};
use crate::models::{BackgroundEntry, BackgroundType, Theme};
use crate::storage::StoredItems;
use serde_json::Value;
use std::collections::HashSet;

/// Outcome of validating one stored value
#[derive(Debug, Clone, PartialEq)]
pub enum Validated<T> {
    Valid(T),
    Rejected(String),
}

impl<T> Validated<T> {
    pub fn ok(self) -> Option<T> {
        match self {
            Validated::Valid(value) => Some(value),
            Validated::Rejected(_) => None,
        }
    }
}

/// Validate `key` if present in `stored`. Absent keys yield `None` silently,
/// rejected ones yield `None` with a warning.
pub fn accept<T>(
    stored: &StoredItems,
    key: &str,
    validate: fn(&Value) -> Validated<T>,
) -> Option<T> {
    let value = stored.get(key)?;
    match validate(value) {
        Validated::Valid(value) => Some(value),
        Validated::Rejected(reason) => {
            tracing::warn!("Ignoring stored {}: {}", key, reason);
            None
        }
    }
}

pub fn theme(value: &Value) -> Validated<Theme> {
    match value.as_str().map(str::parse::<Theme>) {
        Some(Ok(theme)) => Validated::Valid(theme),
        Some(Err(e)) => Validated::Rejected(e),
        None => Validated::Rejected(format!("expected a string, got {}", value)),
    }
}

pub fn background_type(value: &Value) -> Validated<BackgroundType> {
    match value.as_str().map(str::parse::<BackgroundType>) {
        Some(Ok(kind)) => Validated::Valid(kind),
        Some(Err(e)) => Validated::Rejected(e),
        None => Validated::Rejected(format!("expected a string, got {}", value)),
    }
}

pub fn string(value: &Value) -> Validated<String> {
    match value.as_str() {
        Some(s) => Validated::Valid(s.to_string()),
        None => Validated::Rejected(format!("expected a string, got {}", value)),
    }
}

pub fn boolean(value: &Value) -> Validated<bool> {
    match value.as_bool() {
        Some(b) => Validated::Valid(b),
        None => Validated::Rejected(format!("expected a boolean, got {}", value)),
    }
}

fn number_in_range(value: &Value, min: f64, max: f64) -> Validated<f64> {
    match value.as_f64() {
        Some(n) if (min..=max).contains(&n) => Validated::Valid(n),
        Some(n) => Validated::Rejected(format!("{} is outside {}..={}", n, min, max)),
        None => Validated::Rejected(format!("expected a number, got {}", value)),
    }
}

pub fn background_opacity(value: &Value) -> Validated<f64> {
    number_in_range(value, MIN_BACKGROUND_OPACITY, MAX_BACKGROUND_OPACITY)
}

pub fn search_bar_position_y(value: &Value) -> Validated<f64> {
    number_in_range(value, MIN_SEARCH_BAR_POSITION_Y, MAX_SEARCH_BAR_POSITION_Y)
}

/// The whole collection is rejected if any element is malformed or ids repeat
pub fn local_backgrounds(value: &Value) -> Validated<Vec<BackgroundEntry>> {
    if !value.is_array() {
        return Validated::Rejected(format!("expected an array, got {}", kind_of(value)));
    }

    let entries: Vec<BackgroundEntry> = match serde_json::from_value(value.clone()) {
        Ok(entries) => entries,
        Err(e) => return Validated::Rejected(format!("malformed entry: {}", e)),
    };

    let mut seen = HashSet::new();
    if let Some(dup) = entries.iter().find(|entry| !seen.insert(entry.id.as_str())) {
        return Validated::Rejected(format!("duplicate id {}", dup.id));
    }

    Validated::Valid(entries)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_theme_values() {
        assert_eq!(theme(&json!("dark")), Validated::Valid(Theme::Dark));
        assert!(theme(&json!("purple")).ok().is_none());
        assert!(theme(&json!(1)).ok().is_none());
    }

    #[test]
    fn test_ranges_are_inclusive() {
        assert_eq!(background_opacity(&json!(0)), Validated::Valid(0.0));
        assert_eq!(background_opacity(&json!(1)), Validated::Valid(1.0));
        assert!(background_opacity(&json!(2)).ok().is_none());
        assert!(background_opacity(&json!(-0.1)).ok().is_none());
        assert!(background_opacity(&json!("0.5")).ok().is_none());

        assert_eq!(search_bar_position_y(&json!(100)), Validated::Valid(100.0));
        assert!(search_bar_position_y(&json!(100.5)).ok().is_none());
    }

    #[test]
    fn test_boolean_is_strict() {
        assert_eq!(boolean(&json!(false)), Validated::Valid(false));
        assert!(boolean(&json!("false")).ok().is_none());
        assert!(boolean(&json!(0)).ok().is_none());
    }

    #[test]
    fn test_local_backgrounds_valid() {
        let value = json!([
            {"id": "1", "name": "a", "data": "data:,", "enabled": true, "createdAt": 1},
            {"id": "2", "name": "b", "data": "data:,", "enabled": false, "createdAt": 2}
        ]);

        let entries = local_backgrounds(&value).ok().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].id, "2");
        assert!(!entries[1].enabled);
    }

    #[test]
    fn test_local_backgrounds_rejected_wholesale() {
        // Second element has a string flag
        let value = json!([
            {"id": "1", "name": "a", "data": "data:,", "enabled": true, "createdAt": 1},
            {"id": "2", "name": "b", "data": "data:,", "enabled": "yes", "createdAt": 2}
        ]);
        assert!(local_backgrounds(&value).ok().is_none());

        let missing_field = json!([{"id": "1", "name": "a", "enabled": true, "createdAt": 1}]);
        assert!(local_backgrounds(&missing_field).ok().is_none());

        assert!(local_backgrounds(&json!({"id": "1"})).ok().is_none());
    }

    #[test]
    fn test_local_backgrounds_duplicate_ids() {
        let value = json!([
            {"id": "1", "name": "a", "data": "data:,", "enabled": true, "createdAt": 1},
            {"id": "1", "name": "b", "data": "data:,", "enabled": true, "createdAt": 1}
        ]);

        assert!(matches!(local_backgrounds(&value), Validated::Rejected(_)));
    }

    #[test]
    fn test_accept_skips_absent_keys() {
        let stored = json!({"theme": "purple", "showSearchHints": false})
            .as_object()
            .unwrap()
            .clone();

        assert_eq!(accept(&stored, "theme", theme), None);
        assert_eq!(accept(&stored, "showSearchHints", boolean), Some(false));
        assert_eq!(accept(&stored, "showTimeDisplay", boolean), None);
    }
}

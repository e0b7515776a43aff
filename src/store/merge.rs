use serde_json::{Map, Value};

use crate::models::AppData;

/// Merges `source` onto `target`.
///
/// Objects merge key by key, recursively. Everything else in `source`,
/// arrays and nulls included, replaces what `target` had.
pub fn deep_merge(target: &Value, source: &Value) -> Value {
    let Value::Object(source) = source else {
        return source.clone();
    };

    let mut result = match target {
        Value::Object(target) => target.clone(),
        _ => Map::new(),
    };

    for (key, value) in source {
        let merged = match value {
            Value::Object(_) => deep_merge(result.get(key).unwrap_or(&Value::Null), value),
            _ => value.clone(),
        };
        result.insert(key.clone(), merged);
    }

    Value::Object(result)
}

/// Overlays a stored document onto the defaults document.
pub fn merge_with_defaults(stored: &Value) -> Value {
    deep_merge(&AppData::defaults(), stored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_objects_merge_recursively() {
        let target = json!({"a": {"x": 1, "y": 2}, "b": 1});
        let source = json!({"a": {"y": 3, "z": 4}});

        assert_eq!(
            deep_merge(&target, &source),
            json!({"a": {"x": 1, "y": 3, "z": 4}, "b": 1})
        );
    }

    #[test]
    fn test_arrays_and_primitives_overwrite() {
        let target = json!({"list": [1, 2, 3], "n": 1, "o": {"k": 1}});
        let source = json!({"list": [9], "n": null, "o": "flat"});

        assert_eq!(
            deep_merge(&target, &source),
            json!({"list": [9], "n": null, "o": "flat"})
        );
    }

    #[test]
    fn test_empty_document_yields_defaults() {
        assert_eq!(merge_with_defaults(&json!({})), AppData::defaults());
    }

    #[test]
    fn test_merge_is_idempotent() {
        let stored = json!({
            "preferences": {"theme": "dark"},
            "workoutHistory": [],
            "legacy": {"kept": true}
        });

        let once = merge_with_defaults(&stored);
        let twice = merge_with_defaults(&once);
        assert_eq!(once, twice);
        assert_eq!(once["preferences"]["theme"], "dark");
        assert_eq!(once["preferences"]["notifications"], true);
        assert_eq!(once["legacy"]["kept"], true);
    }

    #[test]
    fn test_stored_leaf_wins_over_default() {
        let stored = json!({"weightTracking": {"profile": {"height": 180}}});
        let merged = merge_with_defaults(&stored);

        assert_eq!(merged["weightTracking"]["profile"]["height"], 180);
        assert!(merged["weightTracking"]["profile"]["targetWeight"].is_null());
        assert!(merged["weightTracking"]["history"].is_array());
    }
}

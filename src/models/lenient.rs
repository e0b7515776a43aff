//! Forgiving number handling for form-style input, and record-by-record
//! decoding of stored collections.
//!
//! Documents written by older clients carry durations and calories as
//! numbers, numeric strings, or not at all. These helpers accept all of them.
//! A record the typed model cannot read is dropped with a warning; it never
//! takes the rest of the document down with it.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;

/// Parses the leading integer of `s` the way form input is read: leading
/// whitespace and an optional sign, then digits. Trailing text is ignored.
pub fn parse_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    let value: i64 = digits.parse().ok()?;
    Some(if negative { -value } else { value })
}

/// Parses the leading decimal number of `s`, ignoring trailing text.
pub fn parse_float(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;
    for (i, c) in s.char_indices() {
        match c {
            '+' | '-' if i == 0 => {}
            '0'..='9' => seen_digit = true,
            '.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end = i + c.len_utf8();
    }
    if !seen_digit {
        return None;
    }
    s[..end].parse().ok()
}

/// Non-negative integer from user input; anything unparseable or negative is 0.
pub fn non_negative(s: &str) -> u32 {
    parse_int(s)
        .map(|n| n.clamp(0, u32::MAX as i64) as u32)
        .unwrap_or(0)
}

/// Deserializes a count stored as a number, a numeric string, or null.
pub fn count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => {
            let n = n
                .as_i64()
                .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
                .unwrap_or(0);
            n.clamp(0, u32::MAX as i64) as u32
        }
        Value::String(s) => non_negative(&s),
        _ => 0,
    })
}

/// Deserializes free text that may have been stored as a number or null.
pub fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// Deserializes an optional string, mapping blank strings to `None`.
pub fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

fn keep_readable<T: DeserializeOwned>(value: Value, section: &str) -> Vec<T> {
    let items = match value {
        Value::Array(items) => items,
        Value::Null => return Vec::new(),
        other => {
            tracing::warn!(section, found = %other, "Expected a list, ignoring");
            return Vec::new();
        }
    };

    items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value(item) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(section, index, error = %e, "Skipping unreadable record");
                None
            }
        })
        .collect()
}

fn readable_entries<K, V>(
    value: Value,
    section: &str,
    decode: impl Fn(Value, &str) -> Result<V, serde_json::Error>,
) -> BTreeMap<K, V>
where
    K: DeserializeOwned + Ord,
{
    let entries = match value {
        Value::Object(entries) => entries,
        Value::Null => return BTreeMap::new(),
        other => {
            tracing::warn!(section, found = %other, "Expected an object, ignoring");
            return BTreeMap::new();
        }
    };

    let mut out = BTreeMap::new();
    for (key, value) in entries {
        let entry = serde_json::from_value::<K>(Value::String(key.clone()))
            .and_then(|k| decode(value, &key).map(|v| (k, v)));
        match entry {
            Ok((k, v)) => {
                out.insert(k, v);
            }
            Err(e) => tracing::warn!(section, key = %key, error = %e, "Skipping unreadable entry"),
        }
    }
    out
}

/// Deserializes a list, dropping elements that do not decode.
pub fn skip_invalid<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(keep_readable(value, std::any::type_name::<T>()))
}

/// Deserializes a map, dropping entries whose key or value does not decode.
pub fn skip_invalid_entries<'de, D, K, V>(deserializer: D) -> Result<BTreeMap<K, V>, D::Error>
where
    D: Deserializer<'de>,
    K: DeserializeOwned + Ord,
    V: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(readable_entries(value, std::any::type_name::<V>(), |v, _| {
        serde_json::from_value(v)
    }))
}

/// Deserializes a map of lists, dropping unreadable keys and, within each
/// list, unreadable elements.
pub fn skip_invalid_lists<'de, D, K, T>(deserializer: D) -> Result<BTreeMap<K, Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    K: DeserializeOwned + Ord,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(readable_entries(value, std::any::type_name::<T>(), |v, key| {
        Ok(keep_readable(v, key))
    }))
}

/// Deserializes a value, falling back to its default when it does not decode.
pub fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_else(|e| {
        tracing::warn!(
            section = std::any::type_name::<T>(),
            error = %e,
            "Unreadable value, using default"
        );
        T::default()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_int() {
        assert_eq!(parse_int("45"), Some(45));
        assert_eq!(parse_int("  30min"), Some(30));
        assert_eq!(parse_int("-5"), Some(-5));
        assert_eq!(parse_int("abc"), None);
        assert_eq!(parse_int(""), None);
        assert_eq!(parse_int("12.9"), Some(12));
    }

    #[test]
    fn test_parse_float() {
        assert_eq!(parse_float("80.5"), Some(80.5));
        assert_eq!(parse_float("80.5kg"), Some(80.5));
        assert_eq!(parse_float(" 72"), Some(72.0));
        assert_eq!(parse_float("kg"), None);
        assert_eq!(parse_float("."), None);
    }

    #[test]
    fn test_non_negative() {
        assert_eq!(non_negative("450"), 450);
        assert_eq!(non_negative("lots"), 0);
        assert_eq!(non_negative("-20"), 0);
    }

    #[derive(Deserialize)]
    struct Sample {
        #[serde(default, deserialize_with = "count")]
        calories: u32,
        #[serde(default, deserialize_with = "text")]
        sets: String,
    }

    #[test]
    fn test_count_accepts_numbers_and_strings() {
        let a: Sample = serde_json::from_str(r#"{"calories": 500, "sets": 3}"#).unwrap();
        assert_eq!(a.calories, 500);
        assert_eq!(a.sets, "3");

        let b: Sample = serde_json::from_str(r#"{"calories": "350", "sets": "4"}"#).unwrap();
        assert_eq!(b.calories, 350);
        assert_eq!(b.sets, "4");

        let c: Sample = serde_json::from_str(r#"{"calories": null, "sets": null}"#).unwrap();
        assert_eq!(c.calories, 0);
        assert_eq!(c.sets, "");
    }

    #[derive(Debug, PartialEq, Deserialize)]
    struct Entry {
        day: chrono::NaiveDate,
        weight: f64,
    }

    #[derive(Deserialize)]
    struct Log {
        #[serde(default, deserialize_with = "skip_invalid")]
        entries: Vec<Entry>,
        #[serde(default, deserialize_with = "skip_invalid_entries")]
        focus: BTreeMap<chrono::NaiveDate, String>,
        #[serde(default, deserialize_with = "skip_invalid_lists")]
        sets: BTreeMap<String, Vec<u32>>,
        #[serde(default, deserialize_with = "or_default")]
        goal: Option<f64>,
    }

    #[test]
    fn test_unreadable_records_are_dropped() {
        let log: Log = serde_json::from_value(serde_json::json!({
            "entries": [
                { "day": "2024-01-01", "weight": 80.5 },
                { "day": "2024-01-02", "weight": null },
                { "day": "", "weight": 79.0 },
                { "day": "2024-01-03", "weight": 79.5 }
            ],
            "focus": { "2024-01-01": "Arms", "someday": "Legs", "2024-01-02": 7 },
            "sets": { "bench": [5, "x", 5], "squat": "heavy" },
            "goal": "lots"
        }))
        .unwrap();

        assert_eq!(log.entries.len(), 2);
        assert_eq!(log.entries[1].weight, 79.5);
        assert_eq!(log.focus.len(), 1);
        assert_eq!(log.sets["bench"], vec![5, 5]);
        assert!(log.sets["squat"].is_empty());
        assert_eq!(log.goal, None);
    }

    #[test]
    fn test_wrong_shapes_become_empty() {
        let log: Log = serde_json::from_value(serde_json::json!({
            "entries": { "not": "a list" },
            "focus": null,
            "sets": [1, 2]
        }))
        .unwrap();

        assert!(log.entries.is_empty());
        assert!(log.focus.is_empty());
        assert!(log.sets.is_empty());
    }
}

use serde::{Deserialize, Serialize};

use super::lenient;

pub const DEFAULT_SUPPLEMENT_TIME: &str = "08:00";

fn default_time() -> String {
    DEFAULT_SUPPLEMENT_TIME.to_string()
}

fn default_true() -> bool {
    true
}

/// A supplement, either user-defined (custom, with a persisted id) or
/// projected from the static schedule (no id).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Supplement {
    #[serde(default)]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub dosage: String,
    #[serde(default = "default_time")]
    pub time: String,
    #[serde(default)]
    pub taken: bool,
    #[serde(default = "default_true")]
    pub is_custom: bool,
}

impl Supplement {
    pub fn has_valid_name(&self) -> bool {
        !self.name.trim().is_empty()
    }

    /// Whether `key` refers to this supplement, by id or by name.
    pub fn is_identified_by(&self, key: &str) -> bool {
        (!self.id.is_empty() && self.id == key) || self.name == key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supplement_defaults() {
        let supplement: Supplement =
            serde_json::from_str(r#"{"id": "1", "name": "Creatine"}"#).unwrap();
        assert_eq!(supplement.time, "08:00");
        assert!(supplement.is_custom);
        assert!(!supplement.taken);
    }

    #[test]
    fn test_identified_by_id_or_name() {
        let supplement: Supplement =
            serde_json::from_str(r#"{"id": "17", "name": "Zinc"}"#).unwrap();
        assert!(supplement.is_identified_by("17"));
        assert!(supplement.is_identified_by("Zinc"));
        assert!(!supplement.is_identified_by("zinc"));
    }

    #[test]
    fn test_blank_name_is_invalid() {
        let supplement: Supplement = serde_json::from_str(r#"{"id": "1", "name": "  "}"#).unwrap();
        assert!(!supplement.has_valid_name());
    }
}

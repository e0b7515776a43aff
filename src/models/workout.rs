use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::lenient;

/// A logged workout session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workout {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub date: NaiveDate,
    /// Minutes.
    #[serde(default, deserialize_with = "lenient::count")]
    pub duration: u32,
    #[serde(default, deserialize_with = "lenient::text")]
    pub exercises: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub notes: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,
}

impl Workout {
    pub fn matches_filter(&self, filter: &str) -> bool {
        self.kind.to_lowercase().contains(&filter.to_lowercase())
    }
}

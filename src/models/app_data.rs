use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use super::{lenient, DayOfWeek, Exercise, Meal, Preferences, Supplement, WeightTracking, Workout};

pub const WORKOUT_HISTORY_CAP: usize = 50;
pub const MEAL_HISTORY_CAP: usize = 100;
pub const WEIGHT_HISTORY_CAP: usize = 365;

/// Taken-state per supplement key (id or name) for one day.
pub type DayTracking = BTreeMap<String, bool>;

/// The whole of a user's tracked data, persisted and synced as one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppData {
    #[serde(deserialize_with = "lenient::or_default")]
    pub preferences: Preferences,
    #[serde(deserialize_with = "lenient::skip_invalid_entries")]
    pub supplement_tracking: BTreeMap<NaiveDate, DayTracking>,
    /// Most recent first.
    #[serde(deserialize_with = "lenient::skip_invalid")]
    pub workout_history: Vec<Workout>,
    /// Most recent first.
    #[serde(deserialize_with = "lenient::skip_invalid")]
    pub meal_history: Vec<Meal>,
    #[serde(deserialize_with = "lenient::skip_invalid")]
    pub custom_supplements: Vec<Supplement>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub weight_tracking: WeightTracking,
    #[serde(deserialize_with = "lenient::skip_invalid_lists")]
    pub planned_exercises: BTreeMap<DayOfWeek, Vec<Exercise>>,
    #[serde(deserialize_with = "lenient::skip_invalid_entries")]
    pub custom_workout_plan: BTreeMap<DayOfWeek, String>,
    #[serde(
        deserialize_with = "lenient::or_default",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_updated: Option<DateTime<Utc>>,
    /// Top-level keys this version does not model, kept so they survive a save.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AppData {
    /// The canonical empty document, as JSON.
    pub fn defaults() -> Value {
        serde_json::to_value(AppData::default()).unwrap_or_else(|_| Value::Object(Map::new()))
    }
}

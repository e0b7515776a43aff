//! Boundary types for tracker mutations.
//!
//! Numeric fields arrive as text the way a form or command line hands them
//! over, and are parsed leniently when a record is built.

use chrono::NaiveDate;
use serde::Deserialize;

use crate::models::MealType;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutInput {
    #[serde(rename = "type")]
    pub kind: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub exercises: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Fields to overlay on an existing workout. Blank type, date and duration
/// keep the current value; exercises and notes replace it when present.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkoutPatch {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub date: Option<NaiveDate>,
    pub duration: Option<String>,
    pub exercises: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealInput {
    #[serde(rename = "type")]
    pub kind: MealType,
    #[serde(default)]
    pub time: Option<String>,
    pub date: NaiveDate,
    #[serde(default)]
    pub food: String,
    #[serde(default)]
    pub calories: String,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SupplementInput {
    pub name: String,
    pub dosage: Option<String>,
    pub time: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ExerciseInput {
    pub name: String,
    pub sets: Option<String>,
    pub reps: Option<String>,
    pub weight: Option<String>,
    pub notes: Option<String>,
}

/// Fields to overlay on a planned exercise; `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ExercisePatch {
    pub name: Option<String>,
    pub sets: Option<String>,
    pub reps: Option<String>,
    pub weight: Option<String>,
    pub notes: Option<String>,
}

/// Returns the trimmed value when it is not blank.
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

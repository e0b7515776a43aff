use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::lenient;
use super::MealType;

/// A logged meal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meal {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: MealType,
    /// Clock time as entered ("10:30").
    #[serde(
        default,
        deserialize_with = "lenient::blank_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub time: Option<String>,
    pub date: NaiveDate,
    #[serde(default, deserialize_with = "lenient::text")]
    pub food: String,
    #[serde(default, deserialize_with = "lenient::count")]
    pub calories: u32,
    #[serde(default, deserialize_with = "lenient::text")]
    pub notes: String,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meal_blank_time_is_none() {
        let meal: Meal = serde_json::from_value(serde_json::json!({
            "id": "1",
            "type": "breakfast",
            "time": "",
            "date": "2024-01-01",
            "food": "Eggs",
            "calories": "abc",
            "timestamp": "2024-01-01T09:00:00Z"
        }))
        .unwrap();

        assert_eq!(meal.kind, MealType::Breakfast);
        assert_eq!(meal.time, None);
        assert_eq!(meal.calories, 0);
        assert_eq!(meal.notes, "");
    }
}

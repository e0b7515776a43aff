use serde::{Deserialize, Serialize};

use super::{DayOfWeek, MealType};

/// Supplements taken together at one time of day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplementSlot {
    pub time: String,
    #[serde(default)]
    pub dosage: String,
    pub supplements: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedMeal {
    pub time: String,
    pub meal: MealType,
    pub food: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanDay {
    pub day: DayOfWeek,
    pub focus: String,
}

/// Static configuration the tracker projects its views over: the default
/// supplement schedule, the meal plan, and the weekly workout split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Schedule {
    pub supplements: Vec<SupplementSlot>,
    pub meal_plan: Vec<PlannedMeal>,
    pub workout_plan: Vec<PlanDay>,
}

impl Default for Schedule {
    fn default() -> Self {
        let push = "Push (Chest, Shoulders, Triceps)";
        let pull = "Pull (Back, Biceps)";
        let legs = "Legs (Quads, Hamstrings, Glutes)";
        let day = |day, focus: &str| PlanDay {
            day,
            focus: focus.to_string(),
        };

        Self {
            supplements: Vec::new(),
            meal_plan: vec![
                PlannedMeal {
                    time: "10:00".to_string(),
                    meal: MealType::Breakfast,
                    food: "Eggs, bacon, avocado, spinach".to_string(),
                },
                PlannedMeal {
                    time: "18:00".to_string(),
                    meal: MealType::Dinner,
                    food: "Steak, zucchini noodles, butter, salad".to_string(),
                },
            ],
            workout_plan: vec![
                day(DayOfWeek::Monday, push),
                day(DayOfWeek::Tuesday, pull),
                day(DayOfWeek::Wednesday, legs),
                day(DayOfWeek::Thursday, push),
                day(DayOfWeek::Friday, pull),
                day(DayOfWeek::Saturday, legs),
                day(DayOfWeek::Sunday, "Rest / Recovery"),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_schedule_covers_week() {
        let schedule = Schedule::default();
        assert_eq!(schedule.workout_plan.len(), 7);
        assert_eq!(schedule.meal_plan.len(), 2);
        assert!(schedule.supplements.is_empty());
    }

    #[test]
    fn test_schedule_from_yaml() {
        let yaml = r#"
supplements:
  - time: "08:00"
    dosage: "1 tab"
    supplements: [Vitamin D, Omega 3]
workout_plan:
  - day: monday
    focus: Full Body
"#;
        let schedule: Schedule = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(schedule.supplements[0].supplements.len(), 2);
        assert_eq!(schedule.workout_plan[0].day, DayOfWeek::Monday);
        // Unset sections keep their defaults
        assert_eq!(schedule.meal_plan.len(), 2);
    }
}

mod app_data;
mod exercise;
pub mod lenient;
mod meal;
mod meal_type;
mod preferences;
mod schedule;
mod supplement;
mod weekday;
mod weight;
mod workout;

pub use app_data::{
    AppData, DayTracking, MEAL_HISTORY_CAP, WEIGHT_HISTORY_CAP, WORKOUT_HISTORY_CAP,
};
pub use exercise::Exercise;
pub use meal::Meal;
pub use meal_type::MealType;
pub use preferences::{Preference, Preferences, Theme};
pub use schedule::{PlanDay, PlannedMeal, Schedule, SupplementSlot};
pub use supplement::{Supplement, DEFAULT_SUPPLEMENT_TIME};
pub use weekday::DayOfWeek;
pub use weight::{bmi, BmiCategory, Direction, WeightEntry, WeightProfile, WeightProgress, WeightTracking};
pub use workout::Workout;

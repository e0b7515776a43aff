//! Read-only projections over the tracker's document.

use chrono::{Datelike, Duration, Local, Months, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;

use super::{today, Tracker};
use crate::models::{
    DayOfWeek, DayTracking, Exercise, Meal, MealType, PlanDay, PlannedMeal, Preferences,
    Supplement, WeightEntry, WeightProfile, WeightProgress, Workout,
};
use crate::store::StorageInfo;

pub const REST_DAY: &str = "Rest Day";

/// Window for progress views, counted back from today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Timeframe {
    Week,
    Month,
    ThreeMonths,
    Year,
    #[default]
    All,
}

impl Timeframe {
    /// Unknown names mean everything.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "week" => Timeframe::Week,
            "month" => Timeframe::Month,
            "3months" => Timeframe::ThreeMonths,
            "year" => Timeframe::Year,
            _ => Timeframe::All,
        }
    }

    /// First date inside the window, or `None` for no bound.
    pub fn start(&self, today: NaiveDate) -> Option<NaiveDate> {
        match self {
            Timeframe::Week => Some(today - Duration::days(7)),
            Timeframe::Month => today.checked_sub_months(Months::new(1)),
            Timeframe::ThreeMonths => today.checked_sub_months(Months::new(3)),
            Timeframe::Year => today.checked_sub_months(Months::new(12)),
            Timeframe::All => None,
        }
    }

    fn contains(&self, date: NaiveDate, today: NaiveDate) -> bool {
        self.start(today).map_or(true, |start| date >= start)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MealPlanStatus {
    pub time: String,
    pub meal: MealType,
    pub food: String,
    pub logged: bool,
    pub logged_meal: Option<Meal>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressStats {
    pub total_workouts: usize,
    pub weight_change: f64,
    pub average_workout_duration: u32,
    pub workout_types: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataStats {
    pub storage: Option<StorageInfo>,
    pub supplement_days: usize,
    pub supplement_entries: usize,
    pub workouts: usize,
    pub meals: usize,
    pub custom_supplements: usize,
    pub weight_entries: usize,
    pub planned_exercises: usize,
}

impl Tracker {
    /// Scheduled supplements followed by custom ones, with today's state.
    pub fn todays_supplements(&self) -> Vec<Supplement> {
        let tracking = self.data.supplement_tracking.get(&today());
        let taken = |key: &str| tracking.and_then(|day| day.get(key)).copied();

        let scheduled = self.schedule.supplements.iter().flat_map(|slot| {
            slot.supplements.iter().map(move |name| Supplement {
                id: String::new(),
                name: name.clone(),
                dosage: slot.dosage.clone(),
                time: slot.time.clone(),
                taken: taken(name).unwrap_or(false),
                is_custom: false,
            })
        });

        let custom = self.data.custom_supplements.iter().map(|s| Supplement {
            taken: taken(&s.id).unwrap_or(false) || taken(&s.name).unwrap_or(false) || s.taken,
            is_custom: true,
            ..s.clone()
        });

        scheduled.chain(custom).collect()
    }

    /// The meal plan, marking which planned meals were logged today.
    pub fn todays_meals(&self) -> Vec<MealPlanStatus> {
        let today = today();
        let todays: Vec<&Meal> = self
            .data
            .meal_history
            .iter()
            .filter(|m| m.date == today)
            .collect();

        self.schedule
            .meal_plan
            .iter()
            .map(|planned| {
                let logged_meal = todays
                    .iter()
                    .find(|m| m.kind == planned.meal)
                    .map(|m| (*m).clone());
                MealPlanStatus {
                    time: planned.time.clone(),
                    meal: planned.meal.clone(),
                    food: planned.food.clone(),
                    logged: logged_meal.is_some(),
                    logged_meal,
                }
            })
            .collect()
    }

    pub fn meal_plan(&self) -> &[PlannedMeal] {
        &self.schedule.meal_plan
    }

    /// Default weekly plan with the user's per-day overrides applied.
    pub fn workout_plan(&self) -> Vec<PlanDay> {
        self.schedule
            .workout_plan
            .iter()
            .map(|plan| PlanDay {
                day: plan.day,
                focus: self
                    .data
                    .custom_workout_plan
                    .get(&plan.day)
                    .cloned()
                    .unwrap_or_else(|| plan.focus.clone()),
            })
            .collect()
    }

    pub fn workout_focus(&self, day: DayOfWeek) -> String {
        self.workout_plan()
            .into_iter()
            .find(|plan| plan.day == day)
            .map(|plan| plan.focus)
            .unwrap_or_else(|| REST_DAY.to_string())
    }

    /// Focus for the local weekday.
    pub fn todays_workout(&self) -> String {
        self.workout_focus(DayOfWeek::of(Local::now().date_naive()))
    }

    /// Workouts whose type contains `filter`; "all" returns everything.
    pub fn workout_history(&self, filter: &str) -> Vec<&Workout> {
        self.data
            .workout_history
            .iter()
            .filter(|w| filter == "all" || w.matches_filter(filter))
            .collect()
    }

    pub fn meal_history(&self, filter: &str) -> Vec<&Meal> {
        self.data
            .meal_history
            .iter()
            .filter(|m| filter == "all" || m.kind.matches_filter(filter))
            .collect()
    }

    pub fn workout(&self, id: &str) -> Option<&Workout> {
        self.data.workout_history.iter().find(|w| w.id == id)
    }

    pub fn planned_exercises(&self, day: DayOfWeek) -> &[Exercise] {
        self.data
            .planned_exercises
            .get(&day)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn weight_profile(&self) -> &WeightProfile {
        &self.data.weight_tracking.profile
    }

    pub fn weight_progress(&self) -> Option<WeightProgress> {
        self.weight_profile().progress()
    }

    /// Newest weigh-ins first, by when they were recorded.
    pub fn weight_history(&self, limit: usize) -> Vec<WeightEntry> {
        let mut history = self.data.weight_tracking.history.clone();
        history.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        history.truncate(limit);
        history
    }

    /// Tracking maps for Monday to Sunday of the current week.
    pub fn weekly_supplement_data(&self) -> BTreeMap<NaiveDate, DayTracking> {
        let today = today();
        let monday = today - Duration::days(today.weekday().num_days_from_monday() as i64);
        (0..7)
            .map(|offset| {
                let date = monday + Duration::days(offset);
                let day = self
                    .data
                    .supplement_tracking
                    .get(&date)
                    .cloned()
                    .unwrap_or_default();
                (date, day)
            })
            .collect()
    }

    /// Weigh-ins inside the window, oldest date first.
    pub fn filtered_weight_data(&self, timeframe: Timeframe) -> Vec<WeightEntry> {
        let today = today();
        let mut entries: Vec<WeightEntry> = self
            .data
            .weight_tracking
            .history
            .iter()
            .filter(|e| timeframe.contains(e.date, today))
            .cloned()
            .collect();
        entries.sort_by_key(|e| e.date);
        entries
    }

    /// Workouts inside the window, oldest date first.
    pub fn filtered_workout_data(&self, timeframe: Timeframe) -> Vec<Workout> {
        let today = today();
        let mut workouts: Vec<Workout> = self
            .data
            .workout_history
            .iter()
            .filter(|w| timeframe.contains(w.date, today))
            .cloned()
            .collect();
        workouts.sort_by_key(|w| w.date);
        workouts
    }

    pub fn progress_stats(&self, timeframe: Timeframe) -> ProgressStats {
        let weights = self.filtered_weight_data(timeframe);
        let workouts = self.filtered_workout_data(timeframe);

        let weight_change = match (weights.first(), weights.last()) {
            (Some(first), Some(last)) if weights.len() > 1 => last.weight - first.weight,
            _ => 0.0,
        };

        let average_workout_duration = if workouts.is_empty() {
            0
        } else {
            let total: u64 = workouts.iter().map(|w| w.duration as u64).sum();
            (total as f64 / workouts.len() as f64).round() as u32
        };

        let mut workout_types = BTreeMap::new();
        for workout in &workouts {
            *workout_types.entry(workout.kind.clone()).or_insert(0) += 1;
        }

        ProgressStats {
            total_workouts: workouts.len(),
            weight_change,
            average_workout_duration,
            workout_types,
        }
    }

    pub fn preferences(&self) -> &Preferences {
        &self.data.preferences
    }

    pub fn data_stats(&self) -> DataStats {
        let storage = match self.store.info() {
            Ok(info) => Some(info),
            Err(e) => {
                tracing::warn!(error = %e, "Could not read storage info");
                None
            }
        };

        DataStats {
            storage,
            supplement_days: self.data.supplement_tracking.len(),
            supplement_entries: self.data.supplement_tracking.values().map(|d| d.len()).sum(),
            workouts: self.data.workout_history.len(),
            meals: self.data.meal_history.len(),
            custom_supplements: self.data.custom_supplements.len(),
            weight_entries: self.data.weight_tracking.history.len(),
            planned_exercises: self.data.planned_exercises.values().map(|e| e.len()).sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Schedule, SupplementSlot};
    use crate::store::{LocalStore, DATA_KEY};
    use crate::tracker::{MealInput, SupplementInput, WorkoutInput};
    use serde_json::json;

    fn tracker_with(doc: serde_json::Value, schedule: Schedule) -> Tracker {
        let store = LocalStore::in_memory();
        store.set_item(DATA_KEY, &doc.to_string()).unwrap();
        Tracker::open(store, schedule)
    }

    fn workout(id: &str, kind: &str, date: NaiveDate, duration: u32) -> serde_json::Value {
        json!({
            "id": id, "type": kind, "date": date, "duration": duration,
            "timestamp": "2024-01-01T00:00:00Z"
        })
    }

    #[test]
    fn test_timeframe_parse() {
        assert_eq!(Timeframe::parse("week"), Timeframe::Week);
        assert_eq!(Timeframe::parse("3months"), Timeframe::ThreeMonths);
        assert_eq!(Timeframe::parse("YEAR"), Timeframe::Year);
        assert_eq!(Timeframe::parse("all"), Timeframe::All);
        assert_eq!(Timeframe::parse("decade"), Timeframe::All);
    }

    #[test]
    fn test_timeframe_start() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        assert_eq!(
            Timeframe::Week.start(today),
            NaiveDate::from_ymd_opt(2024, 3, 24)
        );
        // Clamped to the end of a shorter month
        assert_eq!(
            Timeframe::Month.start(today),
            NaiveDate::from_ymd_opt(2024, 2, 29)
        );
        assert_eq!(
            Timeframe::Year.start(today),
            NaiveDate::from_ymd_opt(2023, 3, 31)
        );
        assert_eq!(Timeframe::All.start(today), None);
    }

    #[test]
    fn test_todays_supplements_overlay() {
        let schedule = Schedule {
            supplements: vec![SupplementSlot {
                time: "08:00".to_string(),
                dosage: "1 tab".to_string(),
                supplements: vec!["Vitamin D".to_string()],
            }],
            ..Schedule::default()
        };
        let mut tracker = tracker_with(json!({}), schedule);
        let custom = tracker
            .add_supplement(SupplementInput {
                name: "Creatine".to_string(),
                ..Default::default()
            })
            .unwrap();
        tracker.toggle_supplement("Vitamin D", true);

        let supplements = tracker.todays_supplements();
        assert_eq!(supplements.len(), 2);
        assert_eq!(supplements[0].name, "Vitamin D");
        assert!(supplements[0].taken);
        assert!(!supplements[0].is_custom);
        assert_eq!(supplements[1].id, custom.id);
        assert!(!supplements[1].taken);
        assert!(supplements[1].is_custom);
    }

    #[test]
    fn test_custom_supplement_taken_under_either_key() {
        let tracker = tracker_with(
            json!({
                "customSupplements": [
                    { "id": "1", "name": "Creatine", "dosage": "5g", "time": "08:00" },
                    { "id": "2", "name": "Zinc", "dosage": "15mg", "time": "20:00", "taken": true }
                ],
                "supplementTracking": {
                    (today().to_string()): { "1": false, "Creatine": true, "2": false, "Zinc": false }
                }
            }),
            Schedule::default(),
        );

        let supplements = tracker.todays_supplements();
        assert_eq!(supplements.len(), 2);
        assert!(supplements[0].taken);
        assert!(supplements[1].taken);
    }

    #[test]
    fn test_todays_meals_marks_logged() {
        let mut tracker = tracker_with(json!({}), Schedule::default());
        tracker.log_meal(MealInput {
            kind: MealType::Breakfast,
            time: Some("09:30".to_string()),
            date: today(),
            food: "Omelette".to_string(),
            calories: "400".to_string(),
            notes: None,
        });

        let meals = tracker.todays_meals();
        assert_eq!(meals.len(), 2);
        assert!(meals[0].logged);
        assert_eq!(meals[0].logged_meal.as_ref().unwrap().food, "Omelette");
        assert!(!meals[1].logged);
    }

    #[test]
    fn test_workout_plan_overrides() {
        let tracker = tracker_with(
            json!({"customWorkoutPlan": {"Monday": "Arms"}}),
            Schedule::default(),
        );

        let plan = tracker.workout_plan();
        assert_eq!(plan.len(), 7);
        assert_eq!(plan[0].focus, "Arms");
        assert_eq!(plan[1].focus, "Pull (Back, Biceps)");
        assert_eq!(tracker.workout_focus(DayOfWeek::Sunday), "Rest / Recovery");
    }

    #[test]
    fn test_missing_plan_day_is_rest_day() {
        let schedule = Schedule {
            workout_plan: Vec::new(),
            ..Schedule::default()
        };
        let tracker = tracker_with(json!({}), schedule);
        assert_eq!(tracker.todays_workout(), REST_DAY);
    }

    #[test]
    fn test_history_filters() {
        let mut tracker = tracker_with(json!({}), Schedule::default());
        for kind in ["Push", "Pull", "push day"] {
            tracker.log_workout(WorkoutInput {
                kind: kind.to_string(),
                date: today(),
                duration: "30".to_string(),
                exercises: None,
                notes: None,
            });
        }

        assert_eq!(tracker.workout_history("all").len(), 3);
        assert_eq!(tracker.workout_history("PUSH").len(), 2);
        assert!(tracker.workout_history("legs").is_empty());

        let id = tracker.workout_history("pull")[0].id.clone();
        assert_eq!(tracker.workout(&id).unwrap().kind, "Pull");
        assert!(tracker.workout("missing").is_none());
    }

    #[test]
    fn test_weight_history_by_timestamp() {
        let tracker = tracker_with(
            json!({"weightTracking": {"history": [
                {"date": "2024-01-05", "weight": 80.0, "timestamp": "2024-01-05T08:00:00Z"},
                {"date": "2024-01-01", "weight": 82.0, "timestamp": "2024-01-06T08:00:00Z"},
                {"date": "2024-01-03", "weight": 81.0, "timestamp": "2024-01-03T08:00:00Z"}
            ]}}),
            Schedule::default(),
        );

        let history = tracker.weight_history(2);
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].weight, 82.0);
        assert_eq!(history[1].weight, 80.0);
    }

    #[test]
    fn test_weekly_supplement_data_covers_week() {
        let mut tracker = tracker_with(json!({}), Schedule::default());
        tracker.toggle_supplement("Fish Oil", true);

        let week = tracker.weekly_supplement_data();
        assert_eq!(week.len(), 7);
        let first = *week.keys().next().unwrap();
        assert_eq!(first.weekday(), chrono::Weekday::Mon);
        assert_eq!(week[&today()].get("Fish Oil"), Some(&true));
    }

    #[test]
    fn test_progress_stats_within_timeframe() {
        let today = today();
        let old = today - Duration::days(40);
        let recent = today - Duration::days(3);

        let tracker = tracker_with(
            json!({
                "workoutHistory": [
                    workout("3", "Push", today, 45),
                    workout("2", "Pull", recent, 30),
                    workout("1", "Push", old, 60)
                ],
                "weightTracking": {"history": [
                    {"date": today, "weight": 79.5, "timestamp": "2024-01-03T00:00:00Z"},
                    {"date": recent, "weight": 80.0, "timestamp": "2024-01-02T00:00:00Z"},
                    {"date": old, "weight": 83.0, "timestamp": "2024-01-01T00:00:00Z"}
                ]}
            }),
            Schedule::default(),
        );

        let week = tracker.progress_stats(Timeframe::Week);
        assert_eq!(week.total_workouts, 2);
        assert_eq!(week.average_workout_duration, 38);
        assert_eq!(week.weight_change, -0.5);
        assert_eq!(week.workout_types["Push"], 1);
        assert_eq!(week.workout_types["Pull"], 1);

        let all = tracker.progress_stats(Timeframe::All);
        assert_eq!(all.total_workouts, 3);
        assert_eq!(all.weight_change, -3.5);
        assert_eq!(all.workout_types["Push"], 2);

        let dates: Vec<NaiveDate> = tracker
            .filtered_workout_data(Timeframe::All)
            .iter()
            .map(|w| w.date)
            .collect();
        assert_eq!(dates, vec![old, recent, today]);
    }

    #[test]
    fn test_progress_stats_single_weight_has_no_change() {
        let tracker = tracker_with(
            json!({"weightTracking": {"history": [
                {"date": today(), "weight": 80.0, "timestamp": "2024-01-01T00:00:00Z"}
            ]}}),
            Schedule::default(),
        );
        let stats = tracker.progress_stats(Timeframe::All);
        assert_eq!(stats.weight_change, 0.0);
        assert_eq!(stats.total_workouts, 0);
        assert_eq!(stats.average_workout_duration, 0);
    }

    #[test]
    fn test_data_stats() {
        let mut tracker = tracker_with(json!({}), Schedule::default());
        tracker.toggle_supplement("A", true);
        tracker.toggle_supplement("B", false);

        let stats = tracker.data_stats();
        assert_eq!(stats.supplement_days, 1);
        assert_eq!(stats.supplement_entries, 2);
        assert!(stats.storage.unwrap().size_in_bytes > 0);
    }
}

//! The in-memory owner of the app document.
//!
//! Every successful mutation is persisted through the [`LocalStore`] right
//! away. Mutations that find invalid input or a missing record fail before
//! touching any state.

mod input;
mod intent;
mod views;

pub use input::{ExerciseInput, ExercisePatch, MealInput, SupplementInput, WorkoutInput, WorkoutPatch};
pub use intent::{Applied, ChangeSet, Intent, Outcome, Section};
pub use views::{DataStats, MealPlanStatus, ProgressStats, Timeframe};

use chrono::{DateTime, NaiveDate, Utc};

use crate::models::{
    lenient, AppData, DayOfWeek, Exercise, Meal, Preference, Schedule, Supplement, Theme,
    WeightEntry, WeightProfile, Workout, DEFAULT_SUPPLEMENT_TIME, MEAL_HISTORY_CAP,
    WEIGHT_HISTORY_CAP, WORKOUT_HISTORY_CAP,
};
use crate::store::LocalStore;
use input::non_blank;

#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("{0}")]
    Validation(String),
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },
}

impl TrackerError {
    fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        TrackerError::NotFound {
            kind,
            id: id.into(),
        }
    }
}

/// Calendar date used for "today" in tracking keys.
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

#[derive(Debug)]
pub struct Tracker {
    data: AppData,
    store: LocalStore,
    schedule: Schedule,
    last_id: i64,
}

impl Tracker {
    /// Loads the stored document and drops custom supplements with blank names.
    pub fn open(store: LocalStore, schedule: Schedule) -> Self {
        let data = store.get();
        let last_id = highest_id(&data);
        let mut tracker = Self {
            data,
            store,
            schedule,
            last_id,
        };
        tracker.cleanup_invalid_supplements();
        tracker
    }

    pub fn data(&self) -> &AppData {
        &self.data
    }

    pub fn store(&self) -> &LocalStore {
        &self.store
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    /// Re-reads the document from the store, e.g. after a pull.
    pub fn reload(&mut self) -> &AppData {
        let before = self.data.workout_history.len();
        self.data = self.store.get();
        self.last_id = self.last_id.max(highest_id(&self.data));
        tracing::debug!(
            before,
            after = self.data.workout_history.len(),
            "Reloaded document from store"
        );
        &self.data
    }

    fn persist(&mut self) -> bool {
        match self.store.save(&self.data) {
            Ok(stamp) => {
                self.data.last_updated = Some(stamp);
                true
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to persist document");
                false
            }
        }
    }

    /// Time-based id, kept strictly increasing within this tracker.
    fn next_id(&mut self) -> String {
        let id = Utc::now().timestamp_millis().max(self.last_id + 1);
        self.last_id = id;
        id.to_string()
    }

    fn cleanup_invalid_supplements(&mut self) {
        let before = self.data.custom_supplements.len();
        self.data
            .custom_supplements
            .retain(Supplement::has_valid_name);
        let removed = before - self.data.custom_supplements.len();
        if removed > 0 {
            tracing::info!(removed, "Removed supplements with blank names");
            self.persist();
        }
    }

    // Workouts

    pub fn log_workout(&mut self, input: WorkoutInput) -> Workout {
        let workout = Workout {
            id: self.next_id(),
            kind: input.kind,
            date: input.date,
            duration: lenient::non_negative(&input.duration),
            exercises: input.exercises.unwrap_or_default(),
            notes: input.notes.unwrap_or_default(),
            timestamp: Utc::now(),
            last_modified: None,
        };
        tracing::debug!(id = %workout.id, kind = %workout.kind, "Logging workout");

        self.data.workout_history.insert(0, workout.clone());
        self.data.workout_history.truncate(WORKOUT_HISTORY_CAP);
        self.persist();
        workout
    }

    pub fn update_workout(&mut self, id: &str, patch: WorkoutPatch) -> Result<Workout, TrackerError> {
        let workout = self
            .data
            .workout_history
            .iter_mut()
            .find(|w| w.id == id)
            .ok_or_else(|| TrackerError::not_found("Workout", id))?;

        if let Some(kind) = non_blank(patch.kind.as_deref()) {
            workout.kind = kind.to_string();
        }
        if let Some(date) = patch.date {
            workout.date = date;
        }
        if let Some(duration) = non_blank(patch.duration.as_deref()).and_then(lenient::parse_int) {
            workout.duration = duration.clamp(0, u32::MAX as i64) as u32;
        }
        if let Some(exercises) = patch.exercises {
            workout.exercises = exercises;
        }
        if let Some(notes) = patch.notes {
            workout.notes = notes;
        }
        workout.last_modified = Some(Utc::now());

        let updated = workout.clone();
        self.persist();
        Ok(updated)
    }

    pub fn delete_workout(&mut self, id: &str) -> Result<Workout, TrackerError> {
        let index = self
            .data
            .workout_history
            .iter()
            .position(|w| w.id == id)
            .ok_or_else(|| TrackerError::not_found("Workout", id))?;

        let removed = self.data.workout_history.remove(index);
        self.persist();
        Ok(removed)
    }

    // Meals

    pub fn log_meal(&mut self, input: MealInput) -> Meal {
        let meal = Meal {
            id: self.next_id(),
            kind: input.kind,
            time: non_blank(input.time.as_deref()).map(str::to_string),
            date: input.date,
            food: input.food,
            calories: lenient::non_negative(&input.calories),
            notes: input.notes.unwrap_or_default(),
            timestamp: Utc::now(),
        };

        self.data.meal_history.insert(0, meal.clone());
        self.data.meal_history.truncate(MEAL_HISTORY_CAP);
        self.persist();
        meal
    }

    pub fn delete_meal(&mut self, id: &str) -> Result<Meal, TrackerError> {
        let index = self
            .data
            .meal_history
            .iter()
            .position(|m| m.id == id)
            .ok_or_else(|| TrackerError::not_found("Meal", id))?;

        let removed = self.data.meal_history.remove(index);
        self.persist();
        Ok(removed)
    }

    // Supplements

    pub fn add_supplement(&mut self, input: SupplementInput) -> Result<Supplement, TrackerError> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(TrackerError::Validation(
                "Supplement name is required".to_string(),
            ));
        }

        let supplement = Supplement {
            id: self.next_id(),
            name: name.to_string(),
            dosage: input
                .dosage
                .map(|d| d.trim().to_string())
                .unwrap_or_default(),
            time: non_blank(input.time.as_deref())
                .unwrap_or(DEFAULT_SUPPLEMENT_TIME)
                .to_string(),
            taken: false,
            is_custom: true,
        };

        self.data.custom_supplements.push(supplement.clone());
        self.persist();
        Ok(supplement)
    }

    /// Removes a custom supplement by id or name.
    pub fn remove_supplement(&mut self, key: &str) -> Result<Supplement, TrackerError> {
        let index = self
            .data
            .custom_supplements
            .iter()
            .position(|s| s.is_identified_by(key))
            .ok_or_else(|| TrackerError::not_found("Supplement", key))?;

        let removed = self.data.custom_supplements.remove(index);
        self.persist();
        Ok(removed)
    }

    /// Sets today's taken-state. Custom supplements are tracked under both
    /// their id and name; scheduled ones under the key given.
    pub fn toggle_supplement(&mut self, key: &str, taken: bool) {
        let today = today();
        let custom = self
            .data
            .custom_supplements
            .iter_mut()
            .find(|s| s.is_identified_by(key));

        let keys = match custom {
            Some(supplement) => {
                supplement.taken = taken;
                vec![supplement.id.clone(), supplement.name.clone()]
            }
            None => vec![key.to_string()],
        };

        let day = self.data.supplement_tracking.entry(today).or_default();
        for key in keys {
            day.insert(key, taken);
        }
        self.persist();
    }

    /// Sets the taken-state for any date, looking custom supplements up by name.
    pub fn toggle_supplement_for_date(&mut self, name: &str, date: NaiveDate, taken: bool) {
        let is_today = date == today();
        let custom = self
            .data
            .custom_supplements
            .iter_mut()
            .find(|s| s.name == name);

        let keys = match custom {
            Some(supplement) => {
                if is_today {
                    supplement.taken = taken;
                }
                vec![supplement.id.clone(), supplement.name.clone()]
            }
            None => vec![name.to_string()],
        };

        let day = self.data.supplement_tracking.entry(date).or_default();
        for key in keys {
            day.insert(key, taken);
        }
        self.persist();
    }

    // Workout plan

    pub fn update_workout_day(&mut self, day: DayOfWeek, focus: &str) -> Result<(), TrackerError> {
        let focus = focus.trim();
        if focus.is_empty() {
            return Err(TrackerError::Validation(
                "Workout focus cannot be empty".to_string(),
            ));
        }
        tracing::debug!(%day, focus, "Updating workout plan");
        self.data.custom_workout_plan.insert(day, focus.to_string());
        self.persist();
        Ok(())
    }

    pub fn add_planned_exercise(
        &mut self,
        day: DayOfWeek,
        input: ExerciseInput,
    ) -> Result<Exercise, TrackerError> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(TrackerError::Validation(
                "Exercise name is required".to_string(),
            ));
        }

        let exercise = Exercise {
            id: self.next_id(),
            name: name.to_string(),
            sets: input.sets.unwrap_or_default(),
            reps: input.reps.unwrap_or_default(),
            weight: input.weight.unwrap_or_default(),
            notes: input.notes.unwrap_or_default(),
        };

        self.data
            .planned_exercises
            .entry(day)
            .or_default()
            .push(exercise.clone());
        self.persist();
        Ok(exercise)
    }

    fn planned_exercise_mut(
        &mut self,
        day: DayOfWeek,
        id: &str,
    ) -> Result<&mut Exercise, TrackerError> {
        self.data
            .planned_exercises
            .get_mut(&day)
            .and_then(|exercises| exercises.iter_mut().find(|e| e.id == id))
            .ok_or_else(|| TrackerError::not_found("Exercise", id))
    }

    pub fn update_planned_exercise(
        &mut self,
        day: DayOfWeek,
        id: &str,
        patch: ExercisePatch,
    ) -> Result<Exercise, TrackerError> {
        if let Some(name) = &patch.name {
            if name.trim().is_empty() {
                return Err(TrackerError::Validation(
                    "Exercise name is required".to_string(),
                ));
            }
        }

        let exercise = self.planned_exercise_mut(day, id)?;
        if let Some(name) = patch.name {
            exercise.name = name.trim().to_string();
        }
        if let Some(sets) = patch.sets {
            exercise.sets = sets;
        }
        if let Some(reps) = patch.reps {
            exercise.reps = reps;
        }
        if let Some(weight) = patch.weight {
            exercise.weight = weight;
        }
        if let Some(notes) = patch.notes {
            exercise.notes = notes;
        }

        let updated = exercise.clone();
        self.persist();
        Ok(updated)
    }

    pub fn delete_planned_exercise(
        &mut self,
        day: DayOfWeek,
        id: &str,
    ) -> Result<Exercise, TrackerError> {
        let exercises = self
            .data
            .planned_exercises
            .get_mut(&day)
            .ok_or_else(|| TrackerError::not_found("Exercise", id))?;
        let index = exercises
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| TrackerError::not_found("Exercise", id))?;

        let removed = exercises.remove(index);
        self.persist();
        Ok(removed)
    }

    // Weight

    /// Stores the profile. A changed current weight is mirrored into
    /// today's history entry, creating one when today has none.
    pub fn update_weight_profile(&mut self, profile: WeightProfile) -> WeightProfile {
        let positive = |v: Option<f64>| v.filter(|w| w.is_finite() && *w > 0.0);
        let profile = WeightProfile {
            height: positive(profile.height),
            current_weight: positive(profile.current_weight),
            target_weight: positive(profile.target_weight),
        };

        let tracking = &mut self.data.weight_tracking;
        let previous = tracking.profile.current_weight;
        tracking.profile = profile.clone();

        if let Some(weight) = profile.current_weight.filter(|w| Some(*w) != previous) {
            let today = today();
            let now = Utc::now();
            let duplicate = tracking
                .history
                .iter()
                .any(|e| e.date == today && e.weight == weight);

            if !duplicate {
                match tracking.history.iter_mut().find(|e| e.date == today) {
                    Some(entry) => {
                        entry.weight = weight;
                        entry.timestamp = now;
                    }
                    None => {
                        tracking.history.insert(
                            0,
                            WeightEntry {
                                date: today,
                                weight,
                                timestamp: now,
                            },
                        );
                        tracking.history.truncate(WEIGHT_HISTORY_CAP);
                    }
                }
            }
        }

        self.persist();
        profile
    }

    /// Adds a weigh-in. Returns `None` without saving when the same date and
    /// weight are already recorded.
    pub fn add_weight_entry(
        &mut self,
        date: NaiveDate,
        weight: f64,
    ) -> Result<Option<WeightEntry>, TrackerError> {
        if !weight.is_finite() || weight <= 0.0 {
            return Err(TrackerError::Validation(
                "Weight must be a positive number".to_string(),
            ));
        }

        let tracking = &mut self.data.weight_tracking;
        if tracking
            .history
            .iter()
            .any(|e| e.date == date && e.weight == weight)
        {
            tracing::debug!(%date, weight, "Skipping duplicate weight entry");
            return Ok(None);
        }

        let entry = WeightEntry {
            date,
            weight,
            timestamp: Utc::now(),
        };
        tracking.history.insert(0, entry.clone());
        tracking.history.truncate(WEIGHT_HISTORY_CAP);

        if let Some(newest) = tracking.history.iter().max_by_key(|e| e.timestamp) {
            tracking.profile.current_weight = Some(newest.weight);
        }

        self.persist();
        Ok(Some(entry))
    }

    pub fn delete_weight_entry(
        &mut self,
        timestamp: DateTime<Utc>,
    ) -> Result<WeightEntry, TrackerError> {
        let history = &mut self.data.weight_tracking.history;
        let index = history
            .iter()
            .position(|e| e.timestamp == timestamp)
            .ok_or_else(|| TrackerError::not_found("Weight entry", timestamp.to_rfc3339()))?;

        let removed = history.remove(index);
        self.persist();
        Ok(removed)
    }

    // Preferences

    pub fn set_preference(&mut self, preference: Preference) {
        self.data.preferences.apply(preference);
        self.persist();
    }

    pub fn toggle_theme(&mut self) -> Theme {
        let theme = self.data.preferences.theme.toggled();
        self.set_preference(Preference::Theme(theme));
        theme
    }
}

/// Largest numeric id in the document, so new ids never collide with old ones.
fn highest_id(data: &AppData) -> i64 {
    let workouts = data.workout_history.iter().map(|w| w.id.as_str());
    let meals = data.meal_history.iter().map(|m| m.id.as_str());
    let supplements = data.custom_supplements.iter().map(|s| s.id.as_str());
    let exercises = data
        .planned_exercises
        .values()
        .flatten()
        .map(|e| e.id.as_str());

    workouts
        .chain(meals)
        .chain(supplements)
        .chain(exercises)
        .filter_map(|id| id.parse::<i64>().ok())
        .max()
        .unwrap_or(0)
}

//! Single entry point for mutations.
//!
//! Front ends build an [`Intent`], hand it to [`Tracker::apply`], and use the
//! returned [`ChangeSet`] to decide what to redraw or whether to sync.

use chrono::{DateTime, NaiveDate, Utc};
use std::collections::BTreeSet;

use super::{
    ExerciseInput, ExercisePatch, MealInput, SupplementInput, Tracker, TrackerError, WorkoutInput,
    WorkoutPatch,
};
use crate::models::{
    DayOfWeek, Exercise, Meal, Preference, Supplement, Theme, WeightEntry, WeightProfile, Workout,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    LogWorkout(WorkoutInput),
    UpdateWorkout { id: String, patch: WorkoutPatch },
    DeleteWorkout { id: String },
    LogMeal(MealInput),
    DeleteMeal { id: String },
    AddSupplement(SupplementInput),
    RemoveSupplement { key: String },
    ToggleSupplement { key: String, taken: bool },
    ToggleSupplementForDate { name: String, date: NaiveDate, taken: bool },
    UpdateWorkoutDay { day: DayOfWeek, focus: String },
    AddPlannedExercise { day: DayOfWeek, input: ExerciseInput },
    UpdatePlannedExercise { day: DayOfWeek, id: String, patch: ExercisePatch },
    DeletePlannedExercise { day: DayOfWeek, id: String },
    UpdateWeightProfile(WeightProfile),
    AddWeightEntry { date: NaiveDate, weight: f64 },
    DeleteWeightEntry { timestamp: DateTime<Utc> },
    SetPreference(Preference),
    ToggleTheme,
    Reload,
}

/// Parts of the document a front end may need to refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Section {
    Workouts,
    Meals,
    Supplements,
    WorkoutPlan,
    Weight,
    Preferences,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet(BTreeSet<Section>);

impl ChangeSet {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn of(sections: &[Section]) -> Self {
        Self(sections.iter().copied().collect())
    }

    pub fn all() -> Self {
        Self::of(&[
            Section::Workouts,
            Section::Meals,
            Section::Supplements,
            Section::WorkoutPlan,
            Section::Weight,
            Section::Preferences,
        ])
    }

    pub fn contains(&self, section: Section) -> bool {
        self.0.contains(&section)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Section> + '_ {
        self.0.iter().copied()
    }
}

/// The record an intent produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Applied {
    Workout(Workout),
    Meal(Meal),
    Supplement(Supplement),
    Exercise(Exercise),
    WeightProfile(WeightProfile),
    WeightEntry(WeightEntry),
    Theme(Theme),
    Done,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub applied: Applied,
    pub changes: ChangeSet,
}

impl Outcome {
    fn new(applied: Applied, sections: &[Section]) -> Self {
        Self {
            applied,
            changes: ChangeSet::of(sections),
        }
    }
}

impl Tracker {
    /// Applies one intent. Failed intents leave the document untouched.
    pub fn apply(&mut self, intent: Intent) -> Result<Outcome, TrackerError> {
        use Section::*;

        let outcome = match intent {
            Intent::LogWorkout(input) => {
                Outcome::new(Applied::Workout(self.log_workout(input)), &[Workouts])
            }
            Intent::UpdateWorkout { id, patch } => Outcome::new(
                Applied::Workout(self.update_workout(&id, patch)?),
                &[Workouts],
            ),
            Intent::DeleteWorkout { id } => {
                Outcome::new(Applied::Workout(self.delete_workout(&id)?), &[Workouts])
            }
            Intent::LogMeal(input) => Outcome::new(Applied::Meal(self.log_meal(input)), &[Meals]),
            Intent::DeleteMeal { id } => {
                Outcome::new(Applied::Meal(self.delete_meal(&id)?), &[Meals])
            }
            Intent::AddSupplement(input) => Outcome::new(
                Applied::Supplement(self.add_supplement(input)?),
                &[Supplements],
            ),
            Intent::RemoveSupplement { key } => Outcome::new(
                Applied::Supplement(self.remove_supplement(&key)?),
                &[Supplements],
            ),
            Intent::ToggleSupplement { key, taken } => {
                self.toggle_supplement(&key, taken);
                Outcome::new(Applied::Done, &[Supplements])
            }
            Intent::ToggleSupplementForDate { name, date, taken } => {
                self.toggle_supplement_for_date(&name, date, taken);
                Outcome::new(Applied::Done, &[Supplements])
            }
            Intent::UpdateWorkoutDay { day, focus } => {
                self.update_workout_day(day, &focus)?;
                Outcome::new(Applied::Done, &[WorkoutPlan])
            }
            Intent::AddPlannedExercise { day, input } => Outcome::new(
                Applied::Exercise(self.add_planned_exercise(day, input)?),
                &[WorkoutPlan],
            ),
            Intent::UpdatePlannedExercise { day, id, patch } => Outcome::new(
                Applied::Exercise(self.update_planned_exercise(day, &id, patch)?),
                &[WorkoutPlan],
            ),
            Intent::DeletePlannedExercise { day, id } => Outcome::new(
                Applied::Exercise(self.delete_planned_exercise(day, &id)?),
                &[WorkoutPlan],
            ),
            Intent::UpdateWeightProfile(profile) => Outcome::new(
                Applied::WeightProfile(self.update_weight_profile(profile)),
                &[Weight],
            ),
            Intent::AddWeightEntry { date, weight } => match self.add_weight_entry(date, weight)? {
                Some(entry) => Outcome::new(Applied::WeightEntry(entry), &[Weight]),
                None => Outcome::new(Applied::Done, &[]),
            },
            Intent::DeleteWeightEntry { timestamp } => Outcome::new(
                Applied::WeightEntry(self.delete_weight_entry(timestamp)?),
                &[Weight],
            ),
            Intent::SetPreference(preference) => {
                self.set_preference(preference);
                Outcome::new(Applied::Done, &[Preferences])
            }
            Intent::ToggleTheme => Outcome::new(Applied::Theme(self.toggle_theme()), &[Preferences]),
            Intent::Reload => {
                self.reload();
                Outcome {
                    applied: Applied::Done,
                    changes: ChangeSet::all(),
                }
            }
        };

        Ok(outcome)
    }
}

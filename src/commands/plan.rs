use clap::{Args, Subcommand};

use super::{CommandResult, OutputFormat};
use gains::models::{DayOfWeek, Exercise};
use gains::tracker::{Applied, ChangeSet, ExerciseInput, ExercisePatch, Intent, Tracker};

#[derive(Args)]
pub struct PlanCommand {
    #[command(subcommand)]
    pub command: PlanSubcommand,
}

#[derive(Subcommand)]
pub enum PlanSubcommand {
    /// Show the weekly workout plan
    Show {
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Set the focus for a day (e.g. `plan set monday "Upper body"`)
    Set { day: DayOfWeek, focus: String },

    /// List planned exercises for a day
    Exercises {
        day: DayOfWeek,

        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Add a planned exercise to a day
    AddExercise {
        day: DayOfWeek,
        name: String,

        #[arg(long)]
        sets: Option<String>,

        #[arg(long)]
        reps: Option<String>,

        #[arg(long)]
        weight: Option<String>,

        #[arg(long)]
        notes: Option<String>,
    },

    /// Edit a planned exercise
    EditExercise {
        day: DayOfWeek,
        id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        sets: Option<String>,

        #[arg(long)]
        reps: Option<String>,

        #[arg(long)]
        weight: Option<String>,

        #[arg(long)]
        notes: Option<String>,
    },

    /// Remove a planned exercise
    RemoveExercise { day: DayOfWeek, id: String },

    /// Show the static meal plan
    Meals {
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

impl PlanCommand {
    pub fn run(&self, tracker: &mut Tracker) -> CommandResult<ChangeSet> {
        match &self.command {
            PlanSubcommand::Show { format } => {
                let plan = tracker.workout_plan();
                match format {
                    OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&plan)?),
                    OutputFormat::Text => {
                        let today = tracker.todays_workout();
                        for day in &plan {
                            let exercises = tracker.planned_exercises(day.day).len();
                            let extra = if exercises > 0 {
                                format!(" ({} exercise(s))", exercises)
                            } else {
                                String::new()
                            };
                            println!("{:<10} {}{}", day.day.name(), day.focus, extra);
                        }
                        println!("\nToday: {}", today);
                    }
                }
                Ok(ChangeSet::none())
            }
            PlanSubcommand::Set { day, focus } => {
                let outcome = tracker.apply(Intent::UpdateWorkoutDay {
                    day: *day,
                    focus: focus.clone(),
                })?;
                println!("{}: {}", day.name(), tracker.workout_focus(*day));
                Ok(outcome.changes)
            }
            PlanSubcommand::Exercises { day, format } => {
                let exercises = tracker.planned_exercises(*day);
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(exercises)?)
                    }
                    OutputFormat::Text => {
                        if exercises.is_empty() {
                            println!("No exercises planned for {}", day.name());
                        }
                        for e in exercises {
                            print_exercise(e);
                        }
                    }
                }
                Ok(ChangeSet::none())
            }
            PlanSubcommand::AddExercise {
                day,
                name,
                sets,
                reps,
                weight,
                notes,
            } => {
                let input = ExerciseInput {
                    name: name.clone(),
                    sets: sets.clone(),
                    reps: reps.clone(),
                    weight: weight.clone(),
                    notes: notes.clone(),
                };
                let outcome = tracker.apply(Intent::AddPlannedExercise { day: *day, input })?;
                if let Applied::Exercise(e) = &outcome.applied {
                    println!("Added to {}:", day.name());
                    print_exercise(e);
                }
                Ok(outcome.changes)
            }
            PlanSubcommand::EditExercise {
                day,
                id,
                name,
                sets,
                reps,
                weight,
                notes,
            } => {
                let patch = ExercisePatch {
                    name: name.clone(),
                    sets: sets.clone(),
                    reps: reps.clone(),
                    weight: weight.clone(),
                    notes: notes.clone(),
                };
                let outcome = tracker.apply(Intent::UpdatePlannedExercise {
                    day: *day,
                    id: id.clone(),
                    patch,
                })?;
                if let Applied::Exercise(e) = &outcome.applied {
                    println!("Updated:");
                    print_exercise(e);
                }
                Ok(outcome.changes)
            }
            PlanSubcommand::RemoveExercise { day, id } => {
                let outcome = tracker.apply(Intent::DeletePlannedExercise {
                    day: *day,
                    id: id.clone(),
                })?;
                if let Applied::Exercise(e) = &outcome.applied {
                    println!("Removed {} from {}", e.name, day.name());
                }
                Ok(outcome.changes)
            }
            PlanSubcommand::Meals { format } => {
                let meals = tracker.meal_plan();
                match format {
                    OutputFormat::Json => println!("{}", serde_json::to_string_pretty(meals)?),
                    OutputFormat::Text => {
                        for m in meals {
                            println!("{} {:10} {}", m.time, m.meal.to_string(), m.food);
                        }
                    }
                }
                Ok(ChangeSet::none())
            }
        }
    }
}

fn print_exercise(e: &Exercise) {
    let mut detail = Vec::new();
    if !e.sets.is_empty() || !e.reps.is_empty() {
        detail.push(format!("{}x{}", e.sets, e.reps));
    }
    if !e.weight.is_empty() {
        detail.push(format!("@ {}", e.weight));
    }
    println!("  {} {} [{}]", e.name, detail.join(" "), e.id);
    if !e.notes.is_empty() {
        println!("    Notes: {}", e.notes);
    }
}

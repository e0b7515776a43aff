use clap::{Args, Subcommand};

use super::{parse_date, truncate, CommandResult, OutputFormat};
use gains::models::Workout;
use gains::tracker::{Applied, ChangeSet, Intent, Tracker, WorkoutInput, WorkoutPatch};

#[derive(Args)]
pub struct WorkoutCommand {
    #[command(subcommand)]
    pub command: WorkoutSubcommand,
}

#[derive(Subcommand)]
pub enum WorkoutSubcommand {
    /// Log a workout
    Log {
        /// Workout type (e.g. Push, Pull, Legs, Cardio)
        #[arg(long = "type", short = 't', value_name = "TYPE")]
        kind: String,

        /// Date (YYYY-MM-DD), defaults to today
        #[arg(long, short)]
        date: Option<String>,

        /// Duration in minutes
        #[arg(long, default_value = "")]
        duration: String,

        /// Exercises performed
        #[arg(long, short)]
        exercises: Option<String>,

        #[arg(long)]
        notes: Option<String>,
    },

    /// Edit a logged workout
    Edit {
        id: String,

        #[arg(long = "type", short = 't', value_name = "TYPE")]
        kind: Option<String>,

        #[arg(long, short)]
        date: Option<String>,

        #[arg(long)]
        duration: Option<String>,

        #[arg(long, short)]
        exercises: Option<String>,

        #[arg(long)]
        notes: Option<String>,
    },

    /// Delete a logged workout
    Delete { id: String },

    /// List workout history, newest first
    List {
        /// Case-insensitive match on workout type ("all" for everything)
        #[arg(long, default_value = "all")]
        filter: String,

        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show one workout
    Show {
        id: String,

        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show today's planned workout focus
    Today,
}

impl WorkoutCommand {
    pub fn run(&self, tracker: &mut Tracker) -> CommandResult<ChangeSet> {
        match &self.command {
            WorkoutSubcommand::Log {
                kind,
                date,
                duration,
                exercises,
                notes,
            } => {
                let input = WorkoutInput {
                    kind: kind.clone(),
                    date: parse_date(date.as_deref())?,
                    duration: duration.clone(),
                    exercises: exercises.clone(),
                    notes: notes.clone(),
                };
                let outcome = tracker.apply(Intent::LogWorkout(input))?;
                if let Applied::Workout(workout) = &outcome.applied {
                    println!("Logged workout:");
                    print_workout(workout);
                }
                Ok(outcome.changes)
            }
            WorkoutSubcommand::Edit {
                id,
                kind,
                date,
                duration,
                exercises,
                notes,
            } => {
                let date = match date {
                    Some(d) => Some(parse_date(Some(d))?),
                    None => None,
                };
                let patch = WorkoutPatch {
                    kind: kind.clone(),
                    date,
                    duration: duration.clone(),
                    exercises: exercises.clone(),
                    notes: notes.clone(),
                };
                let outcome = tracker.apply(Intent::UpdateWorkout {
                    id: id.clone(),
                    patch,
                })?;
                if let Applied::Workout(workout) = &outcome.applied {
                    println!("Updated workout:");
                    print_workout(workout);
                }
                Ok(outcome.changes)
            }
            WorkoutSubcommand::Delete { id } => {
                let outcome = tracker.apply(Intent::DeleteWorkout { id: id.clone() })?;
                if let Applied::Workout(workout) = &outcome.applied {
                    println!("Deleted {} workout from {}", workout.kind, workout.date);
                }
                Ok(outcome.changes)
            }
            WorkoutSubcommand::List { filter, format } => {
                let workouts = tracker.workout_history(filter);
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&workouts)?);
                    }
                    OutputFormat::Text => {
                        if workouts.is_empty() {
                            println!("No workouts found");
                            return Ok(ChangeSet::none());
                        }
                        println!(
                            "{:<15}  {:<10}  {:<15}  {:>8}  EXERCISES",
                            "ID", "DATE", "TYPE", "MINUTES"
                        );
                        println!("{}", "-".repeat(80));
                        for w in &workouts {
                            println!(
                                "{:<15}  {:<10}  {:<15}  {:>8}  {}",
                                w.id,
                                w.date,
                                truncate(&w.kind, 15),
                                w.duration,
                                truncate(&w.exercises, 30)
                            );
                        }
                        println!("\nTotal: {} workout(s)", workouts.len());
                    }
                }
                Ok(ChangeSet::none())
            }
            WorkoutSubcommand::Show { id, format } => {
                let workout = tracker
                    .workout(id)
                    .ok_or_else(|| format!("Workout not found: {}", id))?;
                match format {
                    OutputFormat::Json => println!("{}", serde_json::to_string_pretty(workout)?),
                    OutputFormat::Text => print_workout(workout),
                }
                Ok(ChangeSet::none())
            }
            WorkoutSubcommand::Today => {
                println!("Today: {}", tracker.todays_workout());
                Ok(ChangeSet::none())
            }
        }
    }
}

fn print_workout(w: &Workout) {
    println!("  Date: {}", w.date);
    println!("  Type: {}", w.kind);
    println!("  Duration: {} min", w.duration);
    if !w.exercises.is_empty() {
        println!("  Exercises: {}", w.exercises);
    }
    if !w.notes.is_empty() {
        println!("  Notes: {}", w.notes);
    }
    if let Some(modified) = w.last_modified {
        println!("  Last modified: {}", modified.format("%Y-%m-%d %H:%M"));
    }
    println!();
    println!("Workout ID: {}", w.id);
}

use clap::Args;

use super::{CommandResult, OutputFormat};
use gains::tracker::{Timeframe, Tracker};

/// Show progress stats for a timeframe
#[derive(Args)]
pub struct ProgressCommand {
    /// week, month, 3months, year or all
    #[arg(long, short, default_value = "month")]
    timeframe: String,

    #[arg(long, short, value_enum, default_value = "text")]
    format: OutputFormat,
}

impl ProgressCommand {
    pub fn run(&self, tracker: &Tracker) -> CommandResult<()> {
        let timeframe = Timeframe::parse(&self.timeframe);
        let stats = tracker.progress_stats(timeframe);
        let weights = tracker.filtered_weight_data(timeframe);

        match self.format {
            OutputFormat::Json => {
                let body = serde_json::json!({
                    "stats": stats,
                    "weights": weights,
                    "workouts": tracker.filtered_workout_data(timeframe),
                });
                println!("{}", serde_json::to_string_pretty(&body)?);
            }
            OutputFormat::Text => {
                println!("Progress ({})", self.timeframe);
                println!("{}", "=".repeat(20));
                println!("Workouts: {}", stats.total_workouts);
                println!("Average duration: {} min", stats.average_workout_duration);
                println!("Weight change: {:+.1} kg", stats.weight_change);

                if !stats.workout_types.is_empty() {
                    println!("\nBy type:");
                    for (kind, count) in &stats.workout_types {
                        println!("  {:<15} {}", kind, count);
                    }
                }

                if !weights.is_empty() {
                    println!("\nWeight:");
                    for entry in &weights {
                        println!("  {}  {:.1}", entry.date, entry.weight);
                    }
                }
            }
        }
        Ok(())
    }
}

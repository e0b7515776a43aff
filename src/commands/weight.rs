use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};

use super::{parse_date, CommandResult, OutputFormat};
use gains::models::{BmiCategory, WeightProfile};
use gains::tracker::{Applied, ChangeSet, Intent, Tracker};

#[derive(Args)]
pub struct WeightCommand {
    #[command(subcommand)]
    pub command: WeightSubcommand,
}

#[derive(Subcommand)]
pub enum WeightSubcommand {
    /// Record a weigh-in
    Log {
        weight: f64,

        /// Date (YYYY-MM-DD), defaults to today
        #[arg(long, short)]
        date: Option<String>,
    },

    /// Delete an entry by its timestamp (as shown by `weight history`)
    Delete { timestamp: String },

    /// Show or update height, current and target weight
    Profile {
        /// Height in cm
        #[arg(long)]
        height: Option<f64>,

        #[arg(long)]
        current: Option<f64>,

        #[arg(long)]
        target: Option<f64>,

        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show recent entries, newest first
    History {
        #[arg(long, short = 'n', default_value = "10")]
        limit: usize,

        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

impl WeightCommand {
    pub fn run(&self, tracker: &mut Tracker) -> CommandResult<ChangeSet> {
        match &self.command {
            WeightSubcommand::Log { weight, date } => {
                let date = parse_date(date.as_deref())?;
                let outcome = tracker.apply(Intent::AddWeightEntry {
                    date,
                    weight: *weight,
                })?;
                match &outcome.applied {
                    Applied::WeightEntry(entry) => {
                        println!("Recorded {} on {}", entry.weight, entry.date)
                    }
                    _ => println!("{} on {} is already recorded", weight, date),
                }
                Ok(outcome.changes)
            }
            WeightSubcommand::Delete { timestamp } => {
                let timestamp = DateTime::parse_from_rfc3339(timestamp)
                    .map_err(|_| format!("Invalid timestamp '{}'. Use RFC 3339.", timestamp))?
                    .with_timezone(&Utc);
                let outcome = tracker.apply(Intent::DeleteWeightEntry { timestamp })?;
                if let Applied::WeightEntry(entry) = &outcome.applied {
                    println!("Deleted {} from {}", entry.weight, entry.date);
                }
                Ok(outcome.changes)
            }
            WeightSubcommand::Profile {
                height,
                current,
                target,
                format,
            } => {
                let mut changes = ChangeSet::none();
                if height.is_some() || current.is_some() || target.is_some() {
                    let existing = tracker.weight_profile().clone();
                    let profile = WeightProfile {
                        height: height.or(existing.height),
                        current_weight: current.or(existing.current_weight),
                        target_weight: target.or(existing.target_weight),
                    };
                    changes = tracker.apply(Intent::UpdateWeightProfile(profile))?.changes;
                }

                let profile = tracker.weight_profile();
                match format {
                    OutputFormat::Json => {
                        let body = serde_json::json!({
                            "profile": profile,
                            "bmi": profile.bmi(),
                            "progress": tracker.weight_progress(),
                        });
                        println!("{}", serde_json::to_string_pretty(&body)?);
                    }
                    OutputFormat::Text => print_profile(profile, tracker),
                }
                Ok(changes)
            }
            WeightSubcommand::History { limit, format } => {
                let history = tracker.weight_history(*limit);
                match format {
                    OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&history)?),
                    OutputFormat::Text => {
                        if history.is_empty() {
                            println!("No weight entries");
                            return Ok(ChangeSet::none());
                        }
                        println!("{:<10}  {:>8}  RECORDED", "DATE", "WEIGHT");
                        println!("{}", "-".repeat(50));
                        for entry in &history {
                            println!(
                                "{:<10}  {:>8.1}  {}",
                                entry.date,
                                entry.weight,
                                entry.timestamp.to_rfc3339()
                            );
                        }
                    }
                }
                Ok(ChangeSet::none())
            }
        }
    }
}

fn print_profile(profile: &WeightProfile, tracker: &Tracker) {
    let show = |v: Option<f64>, unit: &str| match v {
        Some(v) => format!("{:.1} {}", v, unit),
        None => "not set".to_string(),
    };
    println!("Height: {}", show(profile.height, "cm"));
    println!("Current weight: {}", show(profile.current_weight, "kg"));
    println!("Target weight: {}", show(profile.target_weight, "kg"));

    if let Some(bmi) = profile.bmi() {
        println!("BMI: {:.1} ({})", bmi, BmiCategory::of(bmi));
    }
    if let Some(progress) = tracker.weight_progress() {
        println!(
            "To go: {:.1} kg ({:?})",
            progress.progress, progress.direction
        );
    }
}

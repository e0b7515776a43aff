use clap::{Args, Subcommand};

use super::{CommandResult, OutputFormat};
use gains::tracker::{Applied, ChangeSet, Intent, SupplementInput, Tracker};

#[derive(Args)]
pub struct SupplementCommand {
    #[command(subcommand)]
    pub command: SupplementSubcommand,
}

#[derive(Subcommand)]
pub enum SupplementSubcommand {
    /// Add a custom supplement
    Add {
        name: String,

        #[arg(long)]
        dosage: Option<String>,

        /// Time of day (HH:MM), defaults to 08:00
        #[arg(long)]
        time: Option<String>,
    },

    /// Remove a custom supplement by id or name
    Remove { supplement: String },

    /// Mark a supplement as taken today (or on --date)
    Take {
        /// Supplement id or name
        supplement: String,

        /// Date (YYYY-MM-DD); marks by name on that date
        #[arg(long, short)]
        date: Option<String>,

        /// Mark as not taken instead
        #[arg(long)]
        undo: bool,
    },

    /// Show today's supplements
    Today {
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show this week's tracking (Monday to Sunday)
    Week {
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

impl SupplementCommand {
    pub fn run(&self, tracker: &mut Tracker) -> CommandResult<ChangeSet> {
        match &self.command {
            SupplementSubcommand::Add { name, dosage, time } => {
                let outcome = tracker.apply(Intent::AddSupplement(SupplementInput {
                    name: name.clone(),
                    dosage: dosage.clone(),
                    time: time.clone(),
                }))?;
                if let Applied::Supplement(s) = &outcome.applied {
                    println!("Added supplement: {} ({}) at {}", s.name, s.dosage, s.time);
                    println!("Supplement ID: {}", s.id);
                }
                Ok(outcome.changes)
            }
            SupplementSubcommand::Remove { supplement } => {
                let outcome = tracker.apply(Intent::RemoveSupplement {
                    key: supplement.clone(),
                })?;
                if let Applied::Supplement(s) = &outcome.applied {
                    println!("Removed supplement: {}", s.name);
                }
                Ok(outcome.changes)
            }
            SupplementSubcommand::Take {
                supplement,
                date,
                undo,
            } => {
                let taken = !undo;
                let intent = match date {
                    Some(d) => Intent::ToggleSupplementForDate {
                        name: supplement.clone(),
                        date: super::parse_date(Some(d))?,
                        taken,
                    },
                    None => Intent::ToggleSupplement {
                        key: supplement.clone(),
                        taken,
                    },
                };
                let outcome = tracker.apply(intent)?;
                println!(
                    "Marked {} as {}",
                    supplement,
                    if taken { "taken" } else { "not taken" }
                );
                Ok(outcome.changes)
            }
            SupplementSubcommand::Today { format } => {
                let supplements = tracker.todays_supplements();
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&supplements)?)
                    }
                    OutputFormat::Text => {
                        if supplements.is_empty() {
                            println!("No supplements scheduled");
                            return Ok(ChangeSet::none());
                        }
                        for s in &supplements {
                            let mark = if s.taken { "x" } else { " " };
                            let custom = if s.is_custom { " (custom)" } else { "" };
                            println!("[{}] {} {} {}{}", mark, s.time, s.name, s.dosage, custom);
                        }
                        let taken = supplements.iter().filter(|s| s.taken).count();
                        println!("\nTaken: {}/{}", taken, supplements.len());
                    }
                }
                Ok(ChangeSet::none())
            }
            SupplementSubcommand::Week { format } => {
                let week = tracker.weekly_supplement_data();
                match format {
                    OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&week)?),
                    OutputFormat::Text => {
                        if week.is_empty() {
                            println!("Nothing tracked this week");
                        }
                        for (date, day) in &week {
                            let taken: Vec<&str> = day
                                .iter()
                                .filter(|(_, taken)| **taken)
                                .map(|(key, _)| key.as_str())
                                .collect();
                            println!("{} {:9} {}", date, date.format("%A").to_string(), taken.join(", "));
                        }
                    }
                }
                Ok(ChangeSet::none())
            }
        }
    }
}

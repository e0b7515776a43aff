use clap::{Args, Subcommand};
use std::path::PathBuf;

use super::{prompt, CommandResult, OutputFormat};
use gains::tracker::{ChangeSet, Intent, Tracker};

#[derive(Args)]
pub struct DataCommand {
    #[command(subcommand)]
    pub command: DataSubcommand,
}

#[derive(Subcommand)]
pub enum DataSubcommand {
    /// Write a JSON backup (to stdout unless --output is given)
    Export {
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Restore a JSON backup, replacing current data
    Import { path: PathBuf },

    /// Delete all tracked data (the login session is kept)
    Clear {
        /// Skip confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },

    /// Show record counts and storage usage
    Stats {
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

impl DataCommand {
    pub fn run(&self, tracker: &mut Tracker) -> CommandResult<ChangeSet> {
        match &self.command {
            DataSubcommand::Export { output } => {
                let backup = tracker.store().export()?;
                match output {
                    Some(path) => {
                        std::fs::write(path, backup)?;
                        eprintln!("Exported to {}", path.display());
                    }
                    None => println!("{}", backup),
                }
                Ok(ChangeSet::none())
            }
            DataSubcommand::Import { path } => {
                let contents = std::fs::read_to_string(path)
                    .map_err(|e| format!("Failed to read '{}': {}", path.display(), e))?;
                tracker.store().import(&contents)?;
                let outcome = tracker.apply(Intent::Reload)?;
                println!("Imported {}", path.display());
                Ok(outcome.changes)
            }
            DataSubcommand::Clear { yes } => {
                if !yes {
                    let answer = prompt("Delete all tracked data? [y/N] ")?;
                    if !answer.trim().eq_ignore_ascii_case("y") {
                        println!("Cancelled.");
                        return Ok(ChangeSet::none());
                    }
                }
                tracker.store().clear_app_data()?;
                let outcome = tracker.apply(Intent::Reload)?;
                println!("All tracked data cleared.");
                Ok(outcome.changes)
            }
            DataSubcommand::Stats { format } => {
                let stats = tracker.data_stats();
                match format {
                    OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
                    OutputFormat::Text => {
                        println!("Workouts:            {}", stats.workouts);
                        println!("Meals:               {}", stats.meals);
                        println!("Custom supplements:  {}", stats.custom_supplements);
                        println!(
                            "Supplement tracking: {} day(s), {} entr(ies)",
                            stats.supplement_days, stats.supplement_entries
                        );
                        println!("Weight entries:      {}", stats.weight_entries);
                        println!("Planned exercises:   {}", stats.planned_exercises);
                        if let Some(storage) = &stats.storage {
                            println!("Storage:             {:.2} KB", storage.size_in_kb());
                            if let Some(updated) = storage.last_updated {
                                println!(
                                    "Last updated:        {}",
                                    updated.format("%Y-%m-%d %H:%M:%S UTC")
                                );
                            }
                        }
                    }
                }
                Ok(ChangeSet::none())
            }
        }
    }
}

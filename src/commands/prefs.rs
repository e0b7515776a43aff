use clap::{Args, Subcommand};

use super::{CommandResult, OutputFormat};
use gains::models::{DayOfWeek, Preference, Theme};
use gains::tracker::{Applied, ChangeSet, Intent, Tracker};

#[derive(Args)]
pub struct PrefsCommand {
    #[command(subcommand)]
    pub command: PrefsSubcommand,
}

#[derive(Subcommand)]
pub enum PrefsSubcommand {
    /// Show preferences
    Show {
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Set the theme (light or dark)
    Theme { theme: Theme },

    /// Switch between light and dark
    ToggleTheme,

    /// First day of the week
    StartWeekOn { day: DayOfWeek },

    /// Turn reminders on or off
    Notifications {
        #[arg(action = clap::ArgAction::Set)]
        enabled: bool,
    },
}

impl PrefsCommand {
    pub fn run(&self, tracker: &mut Tracker) -> CommandResult<ChangeSet> {
        let intent = match &self.command {
            PrefsSubcommand::Show { format } => {
                let prefs = tracker.preferences();
                match format {
                    OutputFormat::Json => println!("{}", serde_json::to_string_pretty(prefs)?),
                    OutputFormat::Text => {
                        println!("theme: {}", prefs.theme);
                        println!("start_week_on: {}", prefs.start_week_on.name());
                        println!("notifications: {}", prefs.notifications);
                    }
                }
                return Ok(ChangeSet::none());
            }
            PrefsSubcommand::Theme { theme } => Intent::SetPreference(Preference::Theme(*theme)),
            PrefsSubcommand::ToggleTheme => Intent::ToggleTheme,
            PrefsSubcommand::StartWeekOn { day } => {
                Intent::SetPreference(Preference::StartWeekOn(*day))
            }
            PrefsSubcommand::Notifications { enabled } => {
                Intent::SetPreference(Preference::Notifications(*enabled))
            }
        };

        let outcome = tracker.apply(intent)?;
        match &outcome.applied {
            Applied::Theme(theme) => println!("Theme: {}", theme),
            _ => println!("Preferences updated"),
        }
        Ok(outcome.changes)
    }
}

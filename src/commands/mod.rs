mod auth;
mod config_cmd;
mod data;
mod meal;
mod plan;
mod prefs;
mod progress;
mod supplement;
mod sync_cmd;
mod weight;
mod workout;

pub use auth::AuthCommand;
pub use config_cmd::ConfigCommand;
pub use data::DataCommand;
pub use meal::MealCommand;
pub use plan::PlanCommand;
pub use prefs::PrefsCommand;
pub use progress::ProgressCommand;
pub use supplement::SupplementCommand;
pub use sync_cmd::SyncCommand;
pub use weight::WeightCommand;
pub use workout::WorkoutCommand;

use chrono::NaiveDate;
use clap::ValueEnum;
use std::io::{self, Write};

use gains::config::Config;
use gains::sync::SyncClient;
use gains::tracker::today;

pub type CommandResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Parses `YYYY-MM-DD`, defaulting to today.
pub fn parse_date(date: Option<&str>) -> Result<NaiveDate, String> {
    match date {
        Some(d) => NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d")
            .map_err(|_| format!("Invalid date format '{}'. Use YYYY-MM-DD.", d)),
        None => Ok(today()),
    }
}

/// Reads one line from stdin after printing `label`.
pub fn prompt(label: &str) -> io::Result<String> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Builds a client for the configured server.
pub fn sync_client(config: &Config, store: &gains::store::LocalStore) -> CommandResult<SyncClient> {
    let base_url = config.sync.api_base_url().ok_or(
        "Sync server not configured. Set sync.server_url (or sync.deployed_url) in config.",
    )?;
    Ok(SyncClient::new(base_url, store.clone()))
}

/// Shortens long ids for tables.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date(Some("2024-01-01")).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
        );
        assert_eq!(parse_date(None).unwrap(), today());
        assert!(parse_date(Some("01/01/2024")).is_err());
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a very long name", 10), "a very ...");
    }
}

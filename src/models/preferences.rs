use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::DayOfWeek;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Light => write!(f, "light"),
            Theme::Dark => write!(f, "dark"),
        }
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            _ => Err(format!("Invalid theme '{}'. Valid options: light, dark", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Preferences {
    pub theme: Theme,
    pub start_week_on: DayOfWeek,
    pub notifications: bool,
    pub first_run: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            theme: Theme::Light,
            start_week_on: DayOfWeek::Monday,
            notifications: true,
            first_run: true,
        }
    }
}

/// A single preference change.
#[derive(Debug, Clone, PartialEq)]
pub enum Preference {
    Theme(Theme),
    StartWeekOn(DayOfWeek),
    Notifications(bool),
    FirstRun(bool),
}

impl Preferences {
    pub fn apply(&mut self, preference: Preference) {
        match preference {
            Preference::Theme(theme) => self.theme = theme,
            Preference::StartWeekOn(day) => self.start_week_on = day,
            Preference::Notifications(on) => self.notifications = on,
            Preference::FirstRun(first) => self.first_run = first,
        }
    }
}

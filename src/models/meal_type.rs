use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of meal. Anything outside the usual four is kept verbatim as `Other`
/// so documents written by other clients never fail to load.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
    Other(String),
}

impl MealType {
    /// Case-insensitive substring match used by history filters.
    pub fn matches_filter(&self, filter: &str) -> bool {
        self.to_string()
            .to_lowercase()
            .contains(&filter.to_lowercase())
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MealType::Breakfast => write!(f, "Breakfast"),
            MealType::Lunch => write!(f, "Lunch"),
            MealType::Dinner => write!(f, "Dinner"),
            MealType::Snack => write!(f, "Snack"),
            MealType::Other(name) => write!(f, "{}", name),
        }
    }
}

impl FromStr for MealType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.to_lowercase().as_str() {
            "" => Err("Meal type cannot be empty".to_string()),
            "breakfast" => Ok(MealType::Breakfast),
            "lunch" => Ok(MealType::Lunch),
            "dinner" => Ok(MealType::Dinner),
            "snack" => Ok(MealType::Snack),
            _ => Ok(MealType::Other(trimmed.to_string())),
        }
    }
}

impl TryFrom<String> for MealType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MealType> for String {
    fn from(value: MealType) -> Self {
        value.to_string()
    }
}

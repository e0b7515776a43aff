use serde::{Deserialize, Serialize};

use super::lenient;

/// An exercise planned for a weekday. Sets, reps and weight are kept as the
/// user typed them ("3", "8-12", "bodyweight").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub sets: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub reps: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub weight: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub notes: String,
}

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::lenient;

/// A single weigh-in. Several entries may share a date, but never the same
/// (date, weight) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightEntry {
    pub date: NaiveDate,
    /// Kilograms.
    pub weight: f64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightProfile {
    /// Centimetres.
    pub height: Option<f64>,
    pub current_weight: Option<f64>,
    pub target_weight: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightTracking {
    #[serde(deserialize_with = "lenient::or_default")]
    pub profile: WeightProfile,
    /// Most recent first.
    #[serde(deserialize_with = "lenient::skip_invalid")]
    pub history: Vec<WeightEntry>,
}

/// Body-mass index from kilograms and centimetres.
pub fn bmi(weight: f64, height_cm: f64) -> Option<f64> {
    if weight <= 0.0 || height_cm <= 0.0 {
        return None;
    }
    let metres = height_cm / 100.0;
    Some(weight / (metres * metres))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl BmiCategory {
    pub fn of(bmi: f64) -> Self {
        if bmi < 18.5 {
            BmiCategory::Underweight
        } else if bmi < 25.0 {
            BmiCategory::Normal
        } else if bmi < 30.0 {
            BmiCategory::Overweight
        } else {
            BmiCategory::Obese
        }
    }
}

impl fmt::Display for BmiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BmiCategory::Underweight => write!(f, "underweight"),
            BmiCategory::Normal => write!(f, "normal"),
            BmiCategory::Overweight => write!(f, "overweight"),
            BmiCategory::Obese => write!(f, "obese"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Losing,
    Gaining,
}

/// Distance between current and target weight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeightProgress {
    /// current - target
    pub difference: f64,
    pub progress: f64,
    pub direction: Direction,
}

impl WeightProfile {
    pub fn bmi(&self) -> Option<f64> {
        bmi(self.current_weight?, self.height?)
    }

    pub fn progress(&self) -> Option<WeightProgress> {
        let current = self.current_weight.filter(|w| *w != 0.0)?;
        let target = self.target_weight.filter(|w| *w != 0.0)?;
        let difference = current - target;
        Some(WeightProgress {
            difference,
            progress: difference.abs(),
            direction: if difference > 0.0 {
                Direction::Losing
            } else {
                Direction::Gaining
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bmi() {
        let value = bmi(80.0, 180.0).unwrap();
        assert!((value - 24.69).abs() < 0.01);
        assert_eq!(bmi(80.0, 0.0), None);
    }

    #[test]
    fn test_bmi_category_boundaries() {
        assert_eq!(BmiCategory::of(18.4), BmiCategory::Underweight);
        assert_eq!(BmiCategory::of(18.5), BmiCategory::Normal);
        assert_eq!(BmiCategory::of(25.0), BmiCategory::Overweight);
        assert_eq!(BmiCategory::of(30.0), BmiCategory::Obese);
    }

    #[test]
    fn test_weight_progress() {
        let profile = WeightProfile {
            height: Some(180.0),
            current_weight: Some(85.0),
            target_weight: Some(80.0),
        };
        let progress = profile.progress().unwrap();
        assert_eq!(progress.difference, 5.0);
        assert_eq!(progress.progress, 5.0);
        assert_eq!(progress.direction, Direction::Losing);

        let bulking = WeightProfile {
            target_weight: Some(90.0),
            ..profile
        };
        assert_eq!(bulking.progress().unwrap().direction, Direction::Gaining);
    }

    #[test]
    fn test_weight_progress_needs_both_weights() {
        let profile = WeightProfile {
            height: None,
            current_weight: Some(85.0),
            target_weight: None,
        };
        assert!(profile.progress().is_none());
    }

    #[test]
    fn test_profile_nulls_round_trip() {
        let profile: WeightProfile =
            serde_json::from_str(r#"{"height":null,"currentWeight":80.5,"targetWeight":null}"#)
                .unwrap();
        assert_eq!(profile.current_weight, Some(80.5));
        let value = serde_json::to_value(&profile).unwrap();
        assert!(value["height"].is_null());
    }
}

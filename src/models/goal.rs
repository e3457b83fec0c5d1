use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GoalCategory {
  Weight,
  Strength,
  Frequency,
  Duration,
  #[serde(rename = "Body Fat")]
  BodyFat,
}

impl GoalCategory {
  /// Weight and body fat goals are met by going down, the rest by going up
  pub fn lower_is_better(&self) -> bool {
    matches!(self, Self::Weight | Self::BodyFat)
  }
}

impl std::fmt::Display for GoalCategory {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Weight => write!(f, "Weight"),
      Self::Strength => write!(f, "Strength"),
      Self::Frequency => write!(f, "Frequency"),
      Self::Duration => write!(f, "Duration"),
      Self::BodyFat => write!(f, "Body Fat"),
    }
  }
}

impl std::str::FromStr for GoalCategory {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_lowercase().replace(['_', '-'], " ").as_str() {
      "weight" => Ok(Self::Weight),
      "strength" => Ok(Self::Strength),
      "frequency" => Ok(Self::Frequency),
      "duration" => Ok(Self::Duration),
      "body fat" | "bodyfat" => Ok(Self::BodyFat),
      _ => Err(format!("Unknown goal category: {}", s)),
    }
  }
}

/// A user-defined goal. Progress is derived, see [`crate::goals::progress`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
  pub id: String,
  pub title: String,
  pub target_value: f64,
  pub current_value: f64,
  pub unit: String,
  pub deadline: NaiveDate,
  #[serde(rename = "type")]
  pub category: GoalCategory,
}

/// For creating new goals (without id)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewGoal {
  pub title: String,
  pub target_value: f64,
  pub current_value: f64,
  pub unit: String,
  pub deadline: NaiveDate,
  pub category: GoalCategory,
}

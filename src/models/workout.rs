use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single set within an exercise log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Set {
  pub id: String,
  pub weight: f64,
  pub reps: u32,
  pub completed: bool,
}

impl Set {
  /// Training volume contributed by this set (weight x reps)
  pub fn volume(&self) -> f64 {
    self.weight * self.reps as f64
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutLog {
  pub id: String,
  pub exercise_id: String,
  pub exercise_name: String,
  pub sets: Vec<Set>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub notes: Option<String>,
}

impl WorkoutLog {
  /// Heaviest weight across all sets; an empty log counts as 0
  pub fn max_weight(&self) -> f64 {
    self.sets.iter().map(|s| s.weight).fold(0.0, f64::max)
  }

  pub fn volume(&self) -> f64 {
    self.sets.iter().map(Set::volume).sum()
  }
}

/// A completed workout. Immutable once saved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutSession {
  pub id: String,
  pub date: DateTime<Utc>,
  pub name: String,
  pub logs: Vec<WorkoutLog>,
  #[serde(default)]
  pub notes: String,
  /// Duration in minutes
  pub duration: u32,
}

impl WorkoutSession {
  /// Total training volume for the session
  pub fn volume(&self) -> f64 {
    self.logs.iter().map(WorkoutLog::volume).sum()
  }

  pub fn exercise_names(&self) -> Vec<&str> {
    self.logs.iter().map(|l| l.exercise_name.as_str()).collect()
  }
}

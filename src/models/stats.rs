use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Exercise id -> heaviest weight ever logged
pub type PersonalRecords = BTreeMap<String, f64>;

/// Exercise id -> chronological record points
pub type PrHistory = BTreeMap<String, Vec<PrHistoryPoint>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrHistoryPoint {
  pub date: DateTime<Utc>,
  pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightEntry {
  pub date: NaiveDate,
  pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
  pub name: String,
  pub age: u32,
  /// Body weight in kg
  pub weight: f64,
  /// Height in cm
  pub height: f64,
  pub body_fat_percentage: f64,
  pub blood_group: String,
  pub gender: String,
  pub activity_level: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub avatar_url: Option<String>,
}

impl Default for UserProfile {
  fn default() -> Self {
    Self {
      name: "New User".to_string(),
      age: 28,
      weight: 75.0,
      height: 180.0,
      body_fat_percentage: 18.0,
      blood_group: "O+".to_string(),
      gender: "Other".to_string(),
      activity_level: "Moderate".to_string(),
      avatar_url: None,
    }
  }
}

/// AI-generated weekly routine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyPlan {
  pub routine_name: String,
  pub weekly_schedule: Vec<PlanDay>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanDay {
  pub day: String,
  pub focus: String,
  #[serde(default)]
  pub exercises: Vec<PlanExercise>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanExercise {
  pub name: String,
  pub sets: u32,
  pub reps: String,
  #[serde(default)]
  pub tips: String,
}

/// Aggregate root for everything derived from the user's training
///
/// Missing fields deserialize to their defaults, so older or partial
/// snapshots are merged over [`UserStats::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserStats {
  pub profile: UserProfile,
  pub weight_history: Vec<WeightEntry>,
  pub personal_records: PersonalRecords,
  pub pr_history: PrHistory,
  pub streak: u32,
  pub total_workouts: u32,
  pub badges: Vec<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub active_plan: Option<WeeklyPlan>,
  pub health_sync_enabled: bool,
}

impl Default for UserStats {
  fn default() -> Self {
    let profile = UserProfile::default();
    Self {
      weight_history: vec![WeightEntry {
        date: Utc::now().date_naive(),
        value: profile.weight,
      }],
      profile,
      personal_records: PersonalRecords::new(),
      pr_history: PrHistory::new(),
      streak: 0,
      total_workouts: 0,
      badges: vec!["first_workout".to_string()],
      active_plan: None,
      health_sync_enabled: false,
    }
  }
}

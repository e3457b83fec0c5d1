pub mod backup;
pub mod coach;
pub mod goals;

use crate::biometrics::{self, Biometrics};
use crate::db::AppState;
use crate::exercises;
use crate::models::{Exercise, ExerciseCategory, PrHistoryPoint, WeeklyPlan, WorkoutSession};
use crate::stats::{recent_volume, NewRecord, PrSummary, VolumePoint};
use serde::Serialize;

/// Sessions shown in the dashboard volume chart
const DASHBOARD_VOLUME_SESSIONS: usize = 7;

/// ---------------------------------------------------------------------------
/// Workouts
/// ---------------------------------------------------------------------------

pub fn get_workouts(state: &AppState, limit: Option<usize>) -> Vec<WorkoutSession> {
  let workouts = state.store.workouts();
  workouts
    .iter()
    .take(limit.unwrap_or(workouts.len()))
    .cloned()
    .collect()
}

pub async fn save_workout(
  state: &mut AppState,
  session: WorkoutSession,
) -> Result<Vec<NewRecord>, String> {
  state
    .store
    .save_session(session)
    .await
    .map_err(|e| format!("Failed to save workout: {}", e))
}

/// ---------------------------------------------------------------------------
/// Dashboard
/// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct PersonalRecordEntry {
  pub exercise_id: String,
  pub name: String,
  pub weight: f64,
}

#[derive(Debug, Serialize)]
pub struct DashboardSummary {
  pub total_workouts: u32,
  pub streak: u32,
  pub recent_volume: Vec<VolumePoint>,
  pub personal_records: Vec<PersonalRecordEntry>,
  pub active_plan: Option<WeeklyPlan>,
}

pub fn get_dashboard(state: &AppState) -> DashboardSummary {
  let stats = state.store.stats();
  DashboardSummary {
    total_workouts: stats.total_workouts,
    streak: stats.streak,
    recent_volume: recent_volume(state.store.workouts(), DASHBOARD_VOLUME_SESSIONS),
    personal_records: stats
      .personal_records
      .iter()
      .map(|(id, weight)| PersonalRecordEntry {
        exercise_id: id.clone(),
        name: exercises::display_name(id),
        weight: *weight,
      })
      .collect(),
    active_plan: stats.active_plan.clone(),
  }
}

#[derive(Debug, Serialize)]
pub struct PrDetails {
  pub exercise_id: String,
  pub name: String,
  pub history: Vec<PrHistoryPoint>,
  pub summary: PrSummary,
}

pub fn get_pr_details(state: &AppState, exercise_id: &str) -> PrDetails {
  let history = state
    .store
    .stats()
    .pr_history
    .get(exercise_id)
    .cloned()
    .unwrap_or_default();

  PrDetails {
    exercise_id: exercise_id.to_string(),
    name: exercises::display_name(exercise_id),
    summary: PrSummary::compute(&history),
    history,
  }
}

pub fn get_biometrics(state: &AppState) -> Biometrics {
  biometrics::compute(&state.store.stats().profile)
}

pub fn search_exercises(
  term: &str,
  category: Option<&str>,
) -> Result<Vec<&'static Exercise>, String> {
  let category = category
    .map(|c| c.parse::<ExerciseCategory>())
    .transpose()?;
  Ok(exercises::search(term, category))
}

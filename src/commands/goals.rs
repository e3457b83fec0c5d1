use crate::db::AppState;
use crate::goals;
use crate::models::goal::NewGoal;
use crate::models::Goal;
use serde::Serialize;

/// A goal with its derived progress, for display
#[derive(Debug, Serialize)]
pub struct GoalView {
  #[serde(flatten)]
  pub goal: Goal,
  pub progress: f64,
  pub secured: bool,
  pub label: String,
}

impl From<&Goal> for GoalView {
  fn from(goal: &Goal) -> Self {
    Self {
      goal: goal.clone(),
      progress: goals::progress(goal),
      secured: goals::is_secured(goal),
      label: goals::status_label(goal),
    }
  }
}

pub fn get_goals(state: &AppState) -> Vec<GoalView> {
  state.store.goals().iter().map(GoalView::from).collect()
}

pub async fn add_goal(state: &mut AppState, new_goal: NewGoal) -> Result<GoalView, String> {
  let goal = state
    .store
    .add_goal(new_goal)
    .await
    .map_err(|e| format!("Failed to add goal: {}", e))?;
  Ok(GoalView::from(&goal))
}

pub async fn update_goal_progress(
  state: &mut AppState,
  goal_id: &str,
  current_value: f64,
) -> Result<GoalView, String> {
  let goal = state
    .store
    .update_goal_progress(goal_id, current_value)
    .await
    .map_err(|e| format!("Failed to update goal: {}", e))?;
  Ok(GoalView::from(&goal))
}

pub async fn remove_goal(state: &mut AppState, goal_id: &str) -> Result<(), String> {
  state
    .store
    .remove_goal(goal_id)
    .await
    .map_err(|e| format!("Failed to remove goal: {}", e))
}

//! Goal tracking
//!
//! Goals store only their current and target values. Progress is derived on
//! read so it can never drift from the inputs.

use thiserror::Error;
use uuid::Uuid;

use crate::models::goal::NewGoal;
use crate::models::Goal;

#[derive(Error, Debug, PartialEq)]
pub enum GoalError {
  #[error("Goal title is required")]
  MissingTitle,

  #[error("Goal target must be non-zero")]
  MissingTarget,

  #[error("Goal not found: {0}")]
  NotFound(String),

  #[error("Goal {0} must be a finite number")]
  NonFinite(&'static str),
}

/// Display percentage in `[0, 100]`.
///
/// Lower-is-better goals (weight, body fat) measure how far current sits
/// above target relative to current. Higher-is-better goals measure
/// current against target.
pub fn progress(goal: &Goal) -> f64 {
  if goal.category.lower_is_better() {
    let denom = if goal.current_value == 0.0 { 1.0 } else { goal.current_value };
    (((goal.current_value - goal.target_value) / denom) * 100.0).clamp(0.0, 100.0)
  } else {
    ((goal.current_value / goal.target_value) * 100.0).min(100.0)
  }
}

pub fn is_secured(goal: &Goal) -> bool {
  progress(goal) >= 100.0
}

pub fn status_label(goal: &Goal) -> String {
  let pct = progress(goal);
  if pct >= 100.0 {
    "BIOMETRIC TARGET SECURED".to_string()
  } else {
    format!("EVOLUTION STATUS: {:.0}%", pct)
  }
}

/// Validate and assign an id to a new goal
pub fn create(new_goal: NewGoal) -> Result<Goal, GoalError> {
  if new_goal.title.trim().is_empty() {
    return Err(GoalError::MissingTitle);
  }
  if !new_goal.target_value.is_finite() {
    return Err(GoalError::NonFinite("target"));
  }
  if new_goal.target_value == 0.0 {
    return Err(GoalError::MissingTarget);
  }
  check_current(new_goal.current_value)?;

  Ok(Goal {
    id: Uuid::new_v4().to_string(),
    title: new_goal.title,
    target_value: new_goal.target_value,
    current_value: new_goal.current_value,
    unit: new_goal.unit,
    deadline: new_goal.deadline,
    category: new_goal.category,
  })
}

/// NaN and infinities serialize as `null` and would not load back
pub fn check_current(value: f64) -> Result<f64, GoalError> {
  if value.is_finite() {
    Ok(value)
  } else {
    Err(GoalError::NonFinite("current value"))
  }
}

pub fn find_mut<'a>(goals: &'a mut [Goal], id: &str) -> Result<&'a mut Goal, GoalError> {
  goals
    .iter_mut()
    .find(|g| g.id == id)
    .ok_or_else(|| GoalError::NotFound(id.to_string()))
}

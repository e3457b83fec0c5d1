//! Test utilities and helpers for unit testing
//!
//! This module provides common test infrastructure including:
//! - Database and app state setup/teardown
//! - Mock data factories
//! - Helper assertions

use crate::config::{AppConfig, ModelConfig, GEMINI_API_BASE};
use crate::db::AppState;
use crate::models::goal::NewGoal;
use crate::models::{Goal, GoalCategory, Set, WorkoutLog, WorkoutSession};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use sqlx::SqlitePool;

/// ---------------------------------------------------------------------------
/// Database Test Utilities
/// ---------------------------------------------------------------------------

/// Create an in-memory SQLite database for testing
/// Runs all migrations and returns a ready-to-use pool
///
/// Uses max_connections(1) to prevent multiple pool connections from creating
/// isolated in-memory databases, which would cause intermittent test failures
pub async fn setup_test_db() -> SqlitePool {
  let pool = sqlx::sqlite::SqlitePoolOptions::new()
    .max_connections(1)
    .connect("sqlite::memory:")
    .await
    .expect("Failed to create in-memory database");

  sqlx::migrate!("./migrations")
    .run(&pool)
    .await
    .expect("Failed to run migrations");

  pool
}

/// Close a test database pool
pub async fn teardown_test_db(pool: SqlitePool) {
  pool.close().await;
}

/// Config pointing at a throwaway data dir, with AI disabled
pub fn mock_config() -> AppConfig {
  AppConfig {
    data_dir: std::env::temp_dir().join("flextrack-tests"),
    gemini_api_key: None,
    gemini_api_base: GEMINI_API_BASE.to_string(),
    models: ModelConfig::default(),
  }
}

/// App state over a fresh in-memory database, with no AI client
pub async fn setup_test_state() -> AppState {
  let pool = setup_test_db().await;
  AppState::with_pool(mock_config(), pool).await
}

/// ---------------------------------------------------------------------------
/// Mock Data Factories
/// ---------------------------------------------------------------------------

/// Log for one exercise with the given (weight, reps) sets, all completed
pub fn mock_log(exercise_id: &str, exercise_name: &str, sets: &[(f64, u32)]) -> WorkoutLog {
  WorkoutLog {
    id: format!("log-{}", uuid::Uuid::new_v4()),
    exercise_id: exercise_id.to_string(),
    exercise_name: exercise_name.to_string(),
    sets: sets
      .iter()
      .enumerate()
      .map(|(i, (weight, reps))| Set {
        id: (i + 1).to_string(),
        weight: *weight,
        reps: *reps,
        completed: true,
      })
      .collect(),
    notes: None,
  }
}

/// Session dated `days_ago` days in the past
pub fn mock_session(days_ago: i64, logs: Vec<WorkoutLog>) -> WorkoutSession {
  WorkoutSession {
    id: uuid::Uuid::new_v4().to_string(),
    date: datetime_days_ago(days_ago),
    name: format!("Training Session {}", days_ago),
    logs,
    notes: String::new(),
    duration: 60,
  }
}

pub fn mock_new_goal(category: GoalCategory, current: f64, target: f64) -> NewGoal {
  NewGoal {
    title: format!("{} goal", category),
    target_value: target,
    current_value: current,
    unit: if category == GoalCategory::BodyFat { "%" } else { "kg" }.to_string(),
    deadline: NaiveDate::from_ymd_opt(2030, 12, 31).expect("valid date"),
    category,
  }
}

pub fn mock_goal(category: GoalCategory, current: f64, target: f64) -> Goal {
  crate::goals::create(mock_new_goal(category, current, target)).expect("valid mock goal")
}

/// ---------------------------------------------------------------------------
/// Time Helpers
/// ---------------------------------------------------------------------------

/// Create a DateTime N days ago from now
pub fn datetime_days_ago(days: i64) -> DateTime<Utc> {
  Utc::now() - Duration::days(days)
}

/// ---------------------------------------------------------------------------
/// Test Macros
/// ---------------------------------------------------------------------------

/// Assert two floats are approximately equal within a tolerance
#[macro_export]
macro_rules! assert_approx_eq {
  ($left:expr, $right:expr, $tolerance:expr) => {
    let diff = ($left - $right).abs();
    assert!(
      diff < $tolerance,
      "Values not approximately equal: {} vs {} (diff: {}, tolerance: {})",
      $left,
      $right,
      diff,
      $tolerance
    );
  };
}

/// ---------------------------------------------------------------------------
/// Tests for Test Utilities
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn test_setup_db_creates_schema() {
    let pool = setup_test_db().await;

    let tables: Vec<(String,)> =
      sqlx::query_as("SELECT name FROM sqlite_master WHERE type='table' AND name = 'kv_store'")
        .fetch_all(&pool)
        .await
        .expect("Failed to query tables");

    assert_eq!(tables.len(), 1);

    teardown_test_db(pool).await;
  }

  #[test]
  fn test_mock_factories_create_valid_data() {
    let log = mock_log("1", "Bench Press", &[(60.0, 8), (70.0, 6)]);
    assert_eq!(log.sets.len(), 2);
    assert_eq!(log.max_weight(), 70.0);

    let session = mock_session(3, vec![log]);
    assert_eq!(session.volume(), 60.0 * 8.0 + 70.0 * 6.0);

    let goal = mock_goal(GoalCategory::BodyFat, 20.0, 15.0);
    assert_eq!(goal.unit, "%");
  }

  #[test]
  fn test_datetime_helpers_produce_correct_dates() {
    let diff = Utc::now() - datetime_days_ago(7);
    assert!(
      diff.num_days() >= 6 && diff.num_days() <= 8,
      "Expected ~7 days difference, got {}",
      diff.num_days()
    );
  }
}

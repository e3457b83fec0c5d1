//! Application store
//!
//! Owns the session list, stats snapshot and goals, and is the only place
//! they change. Every mutation builds the next state, writes all three blobs
//! in one transaction, and only then replaces the in-memory copy. A failed
//! write leaves both memory and storage as they were.

use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;

use crate::backup::{self, BackupBundle, BackupError};
use crate::blobs::{self, BlobError, GOALS_KEY, STATS_KEY, WORKOUTS_KEY};
use crate::goals::{self, GoalError};
use crate::models::goal::NewGoal;
use crate::models::{Goal, UserProfile, UserStats, WeeklyPlan, WeightEntry, WorkoutSession};
use crate::notifications::NotificationQueue;
use crate::stats::{apply_session, NewRecord};

pub const LOAD_FAILED_MESSAGE: &str = "Failed to load your local data. Starting fresh.";
pub const SAVE_FAILED_MESSAGE: &str = "Failed to save your data.";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
  #[error(transparent)]
  Blob(#[from] BlobError),

  #[error(transparent)]
  Goal(#[from] GoalError),

  #[error(transparent)]
  Backup(#[from] BackupError),

  #[error("{0} must be a finite number")]
  NonFinite(&'static str),
}

impl serde::Serialize for StoreError {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: serde::Serializer,
  {
    serializer.serialize_str(&self.to_string())
  }
}

/// NaN and infinities serialize as `null`, which would make the whole blob
/// unreadable on the next load
fn ensure_finite(field: &'static str, value: f64) -> Result<f64, StoreError> {
  if value.is_finite() {
    Ok(value)
  } else {
    Err(StoreError::NonFinite(field))
  }
}

/// Next state for a mutation. `None` parts keep the current value.
#[derive(Default)]
struct Pending {
  workouts: Option<Vec<WorkoutSession>>,
  stats: Option<UserStats>,
  goals: Option<Vec<Goal>>,
}

#[derive(Debug)]
pub struct FitnessStore {
  pool: SqlitePool,
  workouts: Vec<WorkoutSession>,
  stats: UserStats,
  goals: Vec<Goal>,
  notifications: NotificationQueue,
}

impl FitnessStore {
  /// Load persisted state. Missing blobs start from defaults. A blob that is
  /// corrupt or cannot be read also starts from defaults and leaves an error
  /// notification behind.
  pub async fn load(pool: SqlitePool, notifications: NotificationQueue) -> Self {
    let mut failed = false;

    let workouts: Vec<WorkoutSession> =
      Self::load_or_default(&pool, WORKOUTS_KEY, &mut failed).await;
    let stats: UserStats = Self::load_or_default(&pool, STATS_KEY, &mut failed).await;
    let goals: Vec<Goal> = Self::load_or_default(&pool, GOALS_KEY, &mut failed).await;

    if failed {
      notifications.error(LOAD_FAILED_MESSAGE).await;
    }

    tracing::debug!(
      workouts = workouts.len(),
      goals = goals.len(),
      total_workouts = stats.total_workouts,
      "Loaded local data"
    );

    Self {
      pool,
      workouts,
      stats,
      goals,
      notifications,
    }
  }

  async fn load_or_default<T>(pool: &SqlitePool, key: &str, failed: &mut bool) -> T
  where
    T: serde::de::DeserializeOwned + Default,
  {
    match blobs::load::<T>(pool, key).await {
      Ok(value) => value.unwrap_or_default(),
      Err(e) => {
        tracing::warn!(key, error = %e, "Discarding unreadable local data");
        *failed = true;
        T::default()
      }
    }
  }

  async fn write_all(
    &self,
    workouts: &[WorkoutSession],
    stats: &UserStats,
    goals: &[Goal],
  ) -> Result<(), BlobError> {
    let mut tx = self.pool.begin().await?;
    blobs::save(&mut *tx, WORKOUTS_KEY, workouts).await?;
    blobs::save(&mut *tx, STATS_KEY, stats).await?;
    blobs::save(&mut *tx, GOALS_KEY, goals).await?;
    tx.commit().await?;
    Ok(())
  }

  /// Persist the next state, then adopt it. On failure nothing changes.
  async fn commit(&mut self, next: Pending) -> Result<(), StoreError> {
    let written = self
      .write_all(
        next.workouts.as_deref().unwrap_or(&self.workouts),
        next.stats.as_ref().unwrap_or(&self.stats),
        next.goals.as_deref().unwrap_or(&self.goals),
      )
      .await;

    if let Err(e) = written {
      tracing::error!(error = %e, "Failed to persist local data");
      self.notifications.error(SAVE_FAILED_MESSAGE).await;
      return Err(e.into());
    }

    if let Some(workouts) = next.workouts {
      self.workouts = workouts;
    }
    if let Some(stats) = next.stats {
      self.stats = stats;
    }
    if let Some(goals) = next.goals {
      self.goals = goals;
    }
    Ok(())
  }

  fn with_stats(&self, change: impl FnOnce(&mut UserStats)) -> Pending {
    let mut stats = self.stats.clone();
    change(&mut stats);
    Pending {
      stats: Some(stats),
      ..Default::default()
    }
  }

  // ---------------------------------------------------------------------------
  // Read access
  // ---------------------------------------------------------------------------

  /// Saved sessions, newest first
  pub fn workouts(&self) -> &[WorkoutSession] {
    &self.workouts
  }

  pub fn stats(&self) -> &UserStats {
    &self.stats
  }

  pub fn goals(&self) -> &[Goal] {
    &self.goals
  }

  pub fn notifications(&self) -> &NotificationQueue {
    &self.notifications
  }

  // ---------------------------------------------------------------------------
  // Sessions
  // ---------------------------------------------------------------------------

  /// Record a completed session and fold it into the stats snapshot
  pub async fn save_session(
    &mut self,
    session: WorkoutSession,
  ) -> Result<Vec<NewRecord>, StoreError> {
    for set in session.logs.iter().flat_map(|l| &l.sets) {
      ensure_finite("Set weight", set.weight)?;
    }

    let update = apply_session(&self.stats, &session);

    tracing::info!(
      session_id = %session.id,
      logs = session.logs.len(),
      new_records = update.new_records.len(),
      "Saving workout session"
    );

    let mut workouts = Vec::with_capacity(self.workouts.len() + 1);
    workouts.push(session);
    workouts.extend(self.workouts.iter().cloned());

    self
      .commit(Pending {
        workouts: Some(workouts),
        stats: Some(update.stats),
        goals: None,
      })
      .await?;

    for record in &update.new_records {
      self.notifications.success(record.message()).await;
    }
    self.notifications.success("Workout saved successfully!").await;

    Ok(update.new_records)
  }

  // ---------------------------------------------------------------------------
  // Goals
  // ---------------------------------------------------------------------------

  pub async fn add_goal(&mut self, new_goal: NewGoal) -> Result<Goal, StoreError> {
    let goal = goals::create(new_goal)?;
    let mut next = self.goals.clone();
    next.push(goal.clone());
    self
      .commit(Pending {
        goals: Some(next),
        ..Default::default()
      })
      .await?;
    Ok(goal)
  }

  pub async fn update_goal_progress(
    &mut self,
    id: &str,
    current_value: f64,
  ) -> Result<Goal, StoreError> {
    let current_value = goals::check_current(current_value)?;
    let mut next = self.goals.clone();
    let goal = goals::find_mut(&mut next, id)?;
    goal.current_value = current_value;
    let updated = goal.clone();

    self
      .commit(Pending {
        goals: Some(next),
        ..Default::default()
      })
      .await?;
    Ok(updated)
  }

  pub async fn remove_goal(&mut self, id: &str) -> Result<(), StoreError> {
    if !self.goals.iter().any(|g| g.id == id) {
      return Err(GoalError::NotFound(id.to_string()).into());
    }
    let next = self.goals.iter().filter(|g| g.id != id).cloned().collect();
    self
      .commit(Pending {
        goals: Some(next),
        ..Default::default()
      })
      .await
  }

  // ---------------------------------------------------------------------------
  // Profile & plan
  // ---------------------------------------------------------------------------

  /// Replace the profile; the health-sync flag only changes when given
  pub async fn update_profile(
    &mut self,
    profile: UserProfile,
    health_sync_enabled: Option<bool>,
  ) -> Result<(), StoreError> {
    ensure_finite("Weight", profile.weight)?;
    ensure_finite("Height", profile.height)?;
    ensure_finite("Body fat", profile.body_fat_percentage)?;

    let next = self.with_stats(|stats| {
      stats.profile = profile;
      if let Some(enabled) = health_sync_enabled {
        stats.health_sync_enabled = enabled;
      }
    });
    self.commit(next).await?;
    self.notifications.success("Profile evolved.").await;
    Ok(())
  }

  /// Append a body-weight entry and mirror it on the profile
  pub async fn record_body_weight(
    &mut self,
    date: NaiveDate,
    value: f64,
  ) -> Result<(), StoreError> {
    let value = ensure_finite("Weight", value)?;
    let next = self.with_stats(|stats| {
      stats.weight_history.push(WeightEntry { date, value });
      stats.weight_history.sort_by_key(|e| e.date);
      stats.profile.weight = value;
    });
    self.commit(next).await
  }

  pub async fn activate_plan(&mut self, plan: WeeklyPlan) -> Result<(), StoreError> {
    let next = self.with_stats(|stats| stats.active_plan = Some(plan));
    self.commit(next).await?;
    self.notifications.success("Routine activated!").await;
    Ok(())
  }

  pub async fn set_avatar(&mut self, avatar_url: String) -> Result<(), StoreError> {
    let next = self.with_stats(|stats| stats.profile.avatar_url = Some(avatar_url));
    self.commit(next).await
  }

  // ---------------------------------------------------------------------------
  // Backup
  // ---------------------------------------------------------------------------

  pub fn export_bundle(&self) -> BackupBundle {
    BackupBundle {
      workouts: self.workouts.clone(),
      stats: self.stats.clone(),
      goals: self.goals.clone(),
      export_date: Some(Utc::now()),
    }
  }

  pub fn export_csv(&self) -> String {
    backup::sessions_to_csv(&self.workouts)
  }

  /// Replace all state from a backup document. On any validation or write
  /// failure the current state is left untouched.
  pub async fn import_json(&mut self, raw: &str) -> Result<(), StoreError> {
    let bundle = match backup::parse_bundle(raw) {
      Ok(bundle) => bundle,
      Err(e) => {
        tracing::warn!(error = %e, "Rejected backup import");
        self.notifications.error("Invalid backup file.").await;
        return Err(e.into());
      }
    };

    self
      .commit(Pending {
        workouts: Some(bundle.workouts),
        stats: Some(bundle.stats),
        goals: Some(bundle.goals),
      })
      .await?;
    self.notifications.success("Data imported successfully!").await;
    Ok(())
  }
}

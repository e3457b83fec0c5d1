//! In-progress workout session
//!
//! Sets are mutable while the session is being logged. `finish` freezes the
//! builder into an immutable [`WorkoutSession`].

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Exercise, Set, WorkoutLog, WorkoutSession};

#[derive(Error, Debug, PartialEq)]
pub enum SessionError {
  #[error("Cannot save a session with no exercises")]
  Empty,

  #[error("Exercise log not found: {0}")]
  LogNotFound(String),

  #[error("Set not found: {0}")]
  SetNotFound(String),

  #[error("Set weight must be a finite number")]
  NonFiniteWeight,
}

/// Partial update applied to a set
#[derive(Debug, Clone, Default)]
pub struct SetUpdate {
  pub weight: Option<f64>,
  pub reps: Option<u32>,
  pub completed: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct SessionBuilder {
  name: String,
  started_at: DateTime<Utc>,
  logs: Vec<WorkoutLog>,
  notes: String,
}

fn new_id() -> String {
  Uuid::new_v4().simple().to_string()
}

impl SessionBuilder {
  pub fn new(name: impl Into<String>, started_at: DateTime<Utc>) -> Self {
    Self {
      name: name.into(),
      started_at,
      logs: Vec::new(),
      notes: String::new(),
    }
  }

  /// Default name: `Training Session - <date>`
  pub fn starting_now() -> Self {
    let now = Utc::now();
    Self::new(format!("Training Session - {}", now.format("%Y-%m-%d")), now)
  }

  pub fn logs(&self) -> &[WorkoutLog] {
    &self.logs
  }

  pub fn set_name(&mut self, name: impl Into<String>) {
    self.name = name.into();
  }

  pub fn set_notes(&mut self, notes: impl Into<String>) {
    self.notes = notes.into();
  }

  /// Add an exercise with one empty set; returns the new log id
  pub fn add_exercise(&mut self, exercise: &Exercise) -> String {
    self.add_exercise_by_id(exercise.id, exercise.name)
  }

  pub fn add_exercise_by_id(&mut self, exercise_id: &str, exercise_name: &str) -> String {
    let log = WorkoutLog {
      id: new_id(),
      exercise_id: exercise_id.to_string(),
      exercise_name: exercise_name.to_string(),
      sets: vec![Set {
        id: new_id(),
        weight: 0.0,
        reps: 0,
        completed: false,
      }],
      notes: None,
    };
    let id = log.id.clone();
    self.logs.push(log);
    id
  }

  pub fn remove_exercise(&mut self, log_id: &str) -> Result<(), SessionError> {
    let before = self.logs.len();
    self.logs.retain(|l| l.id != log_id);
    if self.logs.len() == before {
      return Err(SessionError::LogNotFound(log_id.to_string()));
    }
    Ok(())
  }

  fn log_mut(&mut self, log_id: &str) -> Result<&mut WorkoutLog, SessionError> {
    self
      .logs
      .iter_mut()
      .find(|l| l.id == log_id)
      .ok_or_else(|| SessionError::LogNotFound(log_id.to_string()))
  }

  /// Append a set pre-filled with the previous set's weight and reps
  pub fn add_set(&mut self, log_id: &str) -> Result<String, SessionError> {
    let log = self.log_mut(log_id)?;
    let (weight, reps) = log
      .sets
      .last()
      .map(|s| (s.weight, s.reps))
      .unwrap_or((0.0, 0));
    let set = Set {
      id: new_id(),
      weight,
      reps,
      completed: false,
    };
    let id = set.id.clone();
    log.sets.push(set);
    Ok(id)
  }

  pub fn update_set(
    &mut self,
    log_id: &str,
    set_id: &str,
    update: SetUpdate,
  ) -> Result<(), SessionError> {
    if update.weight.is_some_and(|w| !w.is_finite()) {
      return Err(SessionError::NonFiniteWeight);
    }
    let log = self.log_mut(log_id)?;
    let set = log
      .sets
      .iter_mut()
      .find(|s| s.id == set_id)
      .ok_or_else(|| SessionError::SetNotFound(set_id.to_string()))?;

    if let Some(weight) = update.weight {
      set.weight = weight;
    }
    if let Some(reps) = update.reps {
      set.reps = reps;
    }
    if let Some(completed) = update.completed {
      set.completed = completed;
    }
    Ok(())
  }

  pub fn set_log_notes(
    &mut self,
    log_id: &str,
    notes: impl Into<String>,
  ) -> Result<(), SessionError> {
    self.log_mut(log_id)?.notes = Some(notes.into());
    Ok(())
  }

  /// Freeze into a saved session. Duration is whole minutes since start.
  pub fn finish(self, ended_at: DateTime<Utc>) -> Result<WorkoutSession, SessionError> {
    if self.logs.is_empty() {
      return Err(SessionError::Empty);
    }
    let minutes = (ended_at - self.started_at).num_minutes().max(0);

    Ok(WorkoutSession {
      id: ended_at.timestamp_millis().to_string(),
      date: ended_at,
      name: self.name,
      logs: self.logs,
      notes: self.notes,
      duration: u32::try_from(minutes).unwrap_or(u32::MAX),
    })
  }
}

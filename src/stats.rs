//! Stats Aggregator
//!
//! Folds a completed workout session into the running stats snapshot:
//! - personal records (heaviest weight per exercise, never decreases)
//! - PR history (one point appended per new record)
//! - total workout count and streak
//!
//! Also hosts the read-side derivations the dashboard needs
//! (session volume series, PR summaries).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{PrHistoryPoint, UserStats, WorkoutSession};

// ---------------------------------------------------------------------------
/// New Record: one exercise that beat its previous best
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRecord {
    pub exercise_id: String,
    pub exercise_name: String,
    pub previous: Option<f64>,
    pub weight: f64,
}

impl NewRecord {
    pub fn message(&self) -> String {
        format!("New Personal Record: {}!", self.exercise_name)
    }
}

/// Result of aggregating a session: the next snapshot plus the records it set,
/// in log order
#[derive(Debug, Clone)]
pub struct StatsUpdate {
    pub stats: UserStats,
    pub new_records: Vec<NewRecord>,
}

// ---------------------------------------------------------------------------
/// Aggregation
// ---------------------------------------------------------------------------

/// Produce the next stats snapshot after `session` has been saved.
///
/// A log only sets a record when its heaviest set is above zero and above the
/// stored record for that exercise.
pub fn apply_session(prev: &UserStats, session: &WorkoutSession) -> StatsUpdate {
    let mut stats = prev.clone();
    let mut new_records = Vec::new();

    for log in &session.logs {
        let max_weight = log.max_weight();
        if max_weight <= 0.0 {
            continue;
        }

        let previous = stats.personal_records.get(&log.exercise_id).copied();
        if previous.is_some_and(|best| max_weight <= best) {
            continue;
        }

        stats
            .personal_records
            .insert(log.exercise_id.clone(), max_weight);
        stats
            .pr_history
            .entry(log.exercise_id.clone())
            .or_default()
            .push(PrHistoryPoint {
                date: session.date,
                weight: max_weight,
            });

        new_records.push(NewRecord {
            exercise_id: log.exercise_id.clone(),
            exercise_name: log.exercise_name.clone(),
            previous,
            weight: max_weight,
        });
    }

    stats.total_workouts += 1;
    // FIXME: streak has no gap detection; a save after a week off still
    // increments by one. Needs a last-workout date on UserStats to reset.
    stats.streak += 1;

    StatsUpdate { stats, new_records }
}

// ---------------------------------------------------------------------------
/// Dashboard derivations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolumePoint {
    pub date: DateTime<Utc>,
    pub name: String,
    pub volume: f64,
}

/// Training volume for the most recent `limit` sessions, oldest first.
/// `sessions` is expected newest first, as the store keeps it.
pub fn recent_volume(sessions: &[WorkoutSession], limit: usize) -> Vec<VolumePoint> {
    sessions
        .iter()
        .take(limit)
        .rev()
        .map(|s| VolumePoint {
            date: s.date,
            name: s.name.clone(),
            volume: s.volume(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrSummary {
    pub max: f64,
    pub start: f64,
    pub gain: f64,
    pub points: usize,
}

impl PrSummary {
    pub fn compute(history: &[PrHistoryPoint]) -> Self {
        let max = history.iter().map(|p| p.weight).fold(0.0, f64::max);
        let start = history.first().map(|p| p.weight).unwrap_or(0.0);
        Self {
            max,
            start,
            gain: max - start,
            points: history.len(),
        }
    }
}

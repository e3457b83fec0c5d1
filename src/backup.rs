//! Export and import of user data
//!
//! - CSV: one row per session for spreadsheets
//! - JSON bundle: full workouts/stats/goals snapshot, re-importable

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Goal, UserStats, WorkoutSession};

const CSV_HEADERS: [&str; 4] = ["Date", "Session Name", "Duration(min)", "Exercises"];
const REQUIRED_FIELDS: [&str; 3] = ["workouts", "stats", "goals"];

#[derive(Error, Debug)]
pub enum BackupError {
  #[error("Backup is not valid JSON: {0}")]
  Json(#[from] serde_json::Error),

  #[error("Backup must be a JSON object")]
  NotAnObject,

  #[error("Backup is missing required field '{0}'")]
  MissingField(&'static str),

  #[error("Backup field '{field}' is malformed: {message}")]
  Malformed { field: &'static str, message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupBundle {
  pub workouts: Vec<WorkoutSession>,
  pub stats: UserStats,
  pub goals: Vec<Goal>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub export_date: Option<DateTime<Utc>>,
}

/// Suggested download name, e.g. `flextrack_backup_2025-01-31.json`
pub fn backup_file_name(date: NaiveDate) -> String {
  format!("flextrack_backup_{}.json", date.format("%Y-%m-%d"))
}

pub fn bundle_to_json(bundle: &BackupBundle) -> Result<String, BackupError> {
  Ok(serde_json::to_string_pretty(bundle)?)
}

/// Parse a backup document.
///
/// All of `workouts`, `stats` and `goals` must be present; each is then
/// decoded into the typed model so a half-valid file is rejected as a whole.
pub fn parse_bundle(raw: &str) -> Result<BackupBundle, BackupError> {
  let value: serde_json::Value = serde_json::from_str(raw)?;
  let object = value.as_object().ok_or(BackupError::NotAnObject)?;

  for field in REQUIRED_FIELDS {
    match object.get(field) {
      None | Some(serde_json::Value::Null) => return Err(BackupError::MissingField(field)),
      Some(_) => {}
    }
  }

  let workouts = decode_field(object, "workouts")?;
  let stats = decode_field(object, "stats")?;
  let goals = decode_field(object, "goals")?;
  let export_date = match object.get("exportDate") {
    Some(v) if !v.is_null() => Some(decode_value(v, "exportDate")?),
    _ => None,
  };

  Ok(BackupBundle {
    workouts,
    stats,
    goals,
    export_date,
  })
}

fn decode_field<T: serde::de::DeserializeOwned>(
  object: &serde_json::Map<String, serde_json::Value>,
  field: &'static str,
) -> Result<T, BackupError> {
  let value = object.get(field).ok_or(BackupError::MissingField(field))?;
  decode_value(value, field)
}

fn decode_value<T: serde::de::DeserializeOwned>(
  value: &serde_json::Value,
  field: &'static str,
) -> Result<T, BackupError> {
  T::deserialize(value).map_err(|e| BackupError::Malformed {
    field,
    message: e.to_string(),
  })
}

/// Session history as CSV, newest first (the order sessions are stored in)
pub fn sessions_to_csv(sessions: &[WorkoutSession]) -> String {
  let mut lines = Vec::with_capacity(sessions.len() + 1);
  lines.push(CSV_HEADERS.join(","));

  for session in sessions {
    let row = [
      session.date.format("%Y-%m-%d").to_string(),
      session.name.clone(),
      session.duration.to_string(),
      session.exercise_names().join(", "),
    ];
    lines.push(row.iter().map(|f| csv_field(f)).collect::<Vec<_>>().join(","));
  }

  lines.join("\n")
}

/// Quote a field when it contains a delimiter, quote or line break
fn csv_field(value: &str) -> String {
  if value.contains([',', '"', '\n', '\r']) {
    format!("\"{}\"", value.replace('"', "\"\""))
  } else {
    value.to_string()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::test_utils::{mock_log, mock_session};

  fn sample_bundle() -> BackupBundle {
    BackupBundle {
      workouts: vec![mock_session(0, vec![mock_log("1", "Bench Press", &[(80.0, 5)])])],
      stats: UserStats::default(),
      goals: vec![],
      export_date: Some(Utc::now()),
    }
  }

  #[test]
  fn test_backup_file_name() {
    let date = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
    assert_eq!(backup_file_name(date), "flextrack_backup_2025-03-09.json");
  }

  #[test]
  fn test_bundle_uses_camel_case_keys() {
    let json = bundle_to_json(&sample_bundle()).unwrap();
    assert!(json.contains("\"exportDate\""));
    assert!(json.contains("\"personalRecords\""));
    assert!(json.contains("\"exerciseId\""));
  }

  #[test]
  fn test_parse_accepts_exported_bundle() {
    let bundle = sample_bundle();
    let parsed = parse_bundle(&bundle_to_json(&bundle).unwrap()).unwrap();
    assert_eq!(parsed, bundle);
  }

  #[test]
  fn test_parse_rejects_missing_required_field() {
    let err = parse_bundle(r#"{"workouts": [], "stats": {}}"#).unwrap_err();
    assert!(matches!(err, BackupError::MissingField("goals")));

    let err = parse_bundle(r#"{"workouts": [], "stats": null, "goals": []}"#).unwrap_err();
    assert!(matches!(err, BackupError::MissingField("stats")));
  }

  #[test]
  fn test_parse_rejects_wrong_shapes() {
    assert!(matches!(parse_bundle("[1, 2]").unwrap_err(), BackupError::NotAnObject));
    assert!(matches!(parse_bundle("not json").unwrap_err(), BackupError::Json(_)));

    let err = parse_bundle(r#"{"workouts": [{"id": 1}], "stats": {}, "goals": []}"#).unwrap_err();
    match err {
      BackupError::Malformed { field, .. } => assert_eq!(field, "workouts"),
      other => panic!("expected malformed workouts, got {:?}", other),
    }
  }

  #[test]
  fn test_parse_accepts_web_app_export_format() {
    let raw = r#"{
      "workouts": [{
        "id": "1718000000000",
        "date": "2024-06-10T08:30:00.000Z",
        "name": "Push Day",
        "logs": [{
          "id": "abc123",
          "exerciseId": "1",
          "exerciseName": "Bench Press",
          "sets": [{"id": "1", "weight": 80, "reps": 5, "completed": true}],
          "notes": ""
        }],
        "notes": "",
        "duration": 45
      }],
      "stats": {"streak": 1, "totalWorkouts": 1, "personalRecords": {"1": 80}},
      "goals": [{
        "id": "g1", "title": "Cut", "targetValue": 75, "currentValue": 80,
        "unit": "kg", "deadline": "2024-12-31", "type": "Body Fat"
      }],
      "exportDate": "2024-06-11T00:00:00.000Z"
    }"#;

    let bundle = parse_bundle(raw).unwrap();
    assert_eq!(bundle.workouts[0].logs[0].sets[0].weight, 80.0);
    assert_eq!(bundle.stats.personal_records["1"], 80.0);
    assert_eq!(bundle.goals[0].category, crate::models::GoalCategory::BodyFat);
  }

  #[test]
  fn test_csv_export() {
    let mut session = mock_session(
      0,
      vec![
        mock_log("1", "Bench Press", &[(80.0, 5)]),
        mock_log("2", "Squat", &[(100.0, 5)]),
      ],
    );
    session.name = "Push, \"heavy\"".to_string();
    session.duration = 45;

    let csv = sessions_to_csv(&[session.clone()]);
    let lines: Vec<_> = csv.lines().collect();
    assert_eq!(lines[0], "Date,Session Name,Duration(min),Exercises");
    assert_eq!(
      lines[1],
      format!(
        "{},\"Push, \"\"heavy\"\"\",45,\"Bench Press, Squat\"",
        session.date.format("%Y-%m-%d")
      )
    );
  }

  #[test]
  fn test_csv_export_empty_history_has_header_only() {
    assert_eq!(sessions_to_csv(&[]), "Date,Session Name,Duration(min),Exercises");
  }
}

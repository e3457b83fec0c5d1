use crate::backup::{backup_file_name, bundle_to_json};
use crate::db::AppState;
use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};

/// Write the session history CSV to `path`
pub fn export_csv(state: &AppState, path: &Path) -> Result<(), String> {
  fs::write(path, state.store.export_csv())
    .map_err(|e| format!("Failed to write {}: {}", path.display(), e))?;
  tracing::info!(
    path = %path.display(),
    sessions = state.store.workouts().len(),
    "Exported CSV history"
  );
  Ok(())
}

/// Write the full backup bundle into `dir`; returns the file written
pub fn export_json(state: &AppState, dir: &Path) -> Result<PathBuf, String> {
  let json = bundle_to_json(&state.store.export_bundle()).map_err(|e| e.to_string())?;
  let path = dir.join(backup_file_name(Utc::now().date_naive()));
  fs::write(&path, json).map_err(|e| format!("Failed to write {}: {}", path.display(), e))?;
  tracing::info!(path = %path.display(), "Exported backup");
  Ok(path)
}

/// Replace all data with the contents of a backup file
pub async fn import_json(state: &mut AppState, path: &Path) -> Result<(), String> {
  let raw = match fs::read_to_string(path) {
    Ok(raw) => raw,
    Err(e) => {
      state.store.notifications().error("Invalid backup file.").await;
      return Err(format!("Failed to read {}: {}", path.display(), e));
    }
  };

  state
    .store
    .import_json(&raw)
    .await
    .map_err(|e| format!("Import failed: {}", e))
}

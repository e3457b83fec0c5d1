//! Key-value persistence of JSON blobs
//!
//! Workouts, stats and goals are each stored as a single JSON document under
//! a versioned key. Writes replace the whole blob and accept any executor, so
//! several writes can share one transaction.

use serde::{de::DeserializeOwned, Serialize};
use sqlx::{Executor, Sqlite, SqlitePool};

pub const WORKOUTS_KEY: &str = "flextrack_workouts_v2";
pub const STATS_KEY: &str = "flextrack_stats_v2";
pub const GOALS_KEY: &str = "flextrack_goals_v2";

#[derive(Debug, thiserror::Error)]
pub enum BlobError {
  #[error("Database error: {0}")]
  Database(#[from] sqlx::Error),

  #[error("Corrupt blob '{key}': {source}")]
  Corrupt {
    key: String,
    #[source]
    source: serde_json::Error,
  },

  #[error("Failed to encode blob '{key}': {source}")]
  Encode {
    key: String,
    #[source]
    source: serde_json::Error,
  },
}

pub async fn get_raw(pool: &SqlitePool, key: &str) -> Result<Option<String>, BlobError> {
  let value: Option<String> = sqlx::query_scalar("SELECT value FROM kv_store WHERE key = ?1")
    .bind(key)
    .fetch_optional(pool)
    .await?;
  Ok(value)
}

pub async fn put_raw<'e, E>(executor: E, key: &str, value: &str) -> Result<(), BlobError>
where
  E: Executor<'e, Database = Sqlite>,
{
  sqlx::query(
    r#"
    INSERT INTO kv_store (key, value, updated_at)
    VALUES (?1, ?2, CURRENT_TIMESTAMP)
    ON CONFLICT(key) DO UPDATE SET
      value = excluded.value,
      updated_at = excluded.updated_at
    "#,
  )
  .bind(key)
  .bind(value)
  .execute(executor)
  .await?;
  Ok(())
}

/// Load and decode a blob. `Ok(None)` when nothing is stored under `key`.
pub async fn load<T: DeserializeOwned>(
  pool: &SqlitePool,
  key: &str,
) -> Result<Option<T>, BlobError> {
  match get_raw(pool, key).await? {
    Some(raw) => serde_json::from_str(&raw)
      .map(Some)
      .map_err(|source| BlobError::Corrupt {
        key: key.to_string(),
        source,
      }),
    None => Ok(None),
  }
}

pub async fn save<'e, E, T>(executor: E, key: &str, value: &T) -> Result<(), BlobError>
where
  E: Executor<'e, Database = Sqlite>,
  T: Serialize + ?Sized,
{
  let raw = serde_json::to_string(value).map_err(|source| BlobError::Encode {
    key: key.to_string(),
    source,
  })?;
  put_raw(executor, key, &raw).await
}

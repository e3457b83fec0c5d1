use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use std::fs;

use crate::config::AppConfig;
use crate::llm::GeminiClient;
use crate::notifications::NotificationQueue;
use crate::store::FitnessStore;

pub type DbPool = SqlitePool;

/// Application state: the loaded store plus the optional AI client
pub struct AppState {
  pub config: AppConfig,
  pub store: FitnessStore,
  pub gemini: Option<GeminiClient>,
}

impl AppState {
  pub async fn initialize(config: AppConfig) -> Result<Self, Box<dyn std::error::Error>> {
    let pool = initialize_db(&config).await?;
    Ok(Self::with_pool(config, pool).await)
  }

  pub async fn with_pool(config: AppConfig, pool: DbPool) -> Self {
    let store = FitnessStore::load(pool, NotificationQueue::new()).await;

    let gemini = match GeminiClient::from_config(&config) {
      Ok(client) => Some(client),
      Err(e) => {
        tracing::warn!(error = %e, "AI features disabled; using fallback content");
        None
      }
    };

    Self { config, store, gemini }
  }
}

/// Initialize the database connection pool and run migrations
pub async fn initialize_db(config: &AppConfig) -> Result<DbPool, Box<dyn std::error::Error>> {
  // Create directory if it doesn't exist
  fs::create_dir_all(&config.data_dir)?;

  let db_path = config.db_path();
  let db_url = format!("sqlite://{}?mode=rwc", db_path.display());

  tracing::info!(path = %db_path.display(), "Initializing database");

  let pool = SqlitePoolOptions::new()
    .max_connections(5)
    .connect(&db_url)
    .await?;

  sqlx::migrate!("./migrations").run(&pool).await?;

  tracing::info!("Database initialized successfully");

  Ok(pool)
}

pub mod backup;
pub mod biometrics;
pub mod blobs;
pub mod cli;
pub mod commands;
pub mod config;
pub mod db;
pub mod exercises;
pub mod goals;
pub mod llm;
pub mod models;
pub mod notifications;
pub mod session;
pub mod stats;
pub mod store;

#[cfg(test)]
mod test_utils;

use cli::Cli;
use config::AppConfig;
use db::AppState;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Logs go to stderr so command output on stdout stays machine-readable
pub fn init_tracing() {
  tracing_subscriber::registry()
    .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
    .init();
}

pub async fn run(cli: Cli) -> Result<(), String> {
  // Load environment variables from .env file
  dotenvy::dotenv().ok();

  let config = AppConfig::from_env().map_err(|e| e.to_string())?;
  let mut state = AppState::initialize(config)
    .await
    .map_err(|e| format!("Failed to initialize database: {}", e))?;

  let result = cli::execute(&mut state, cli.command).await;

  for notification in state.store.notifications().drain().await {
    eprintln!("[{}] {}", notification.severity, notification.message);
  }

  result
}

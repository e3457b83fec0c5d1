//! Runtime configuration, loaded from the environment (and `.env` via dotenvy)

use directories::ProjectDirs;
use std::env;
use std::path::PathBuf;
use thiserror::Error;

/// ---------------------------------------------------------------------------
/// Defaults
/// ---------------------------------------------------------------------------

pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_TEXT_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_PLAN_MODEL: &str = "gemini-3-pro-preview";
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";
const DB_FILE_NAME: &str = "flextrack.db";

#[derive(Error, Debug)]
pub enum ConfigError {
  #[error("Could not determine a data directory; set FLEXTRACK_DATA_DIR")]
  NoDataDir,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelConfig {
  pub text: String,
  pub plan: String,
  pub image: String,
}

impl Default for ModelConfig {
  fn default() -> Self {
    Self {
      text: DEFAULT_TEXT_MODEL.to_string(),
      plan: DEFAULT_PLAN_MODEL.to_string(),
      image: DEFAULT_IMAGE_MODEL.to_string(),
    }
  }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub data_dir: PathBuf,
  pub gemini_api_key: Option<String>,
  pub gemini_api_base: String,
  pub models: ModelConfig,
}

impl AppConfig {
  pub fn from_env() -> Result<Self, ConfigError> {
    let data_dir = match env::var("FLEXTRACK_DATA_DIR") {
      Ok(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
      _ => ProjectDirs::from("com", "flextrack", "flextrack")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or(ConfigError::NoDataDir)?,
    };

    let gemini_api_key = env::var("GEMINI_API_KEY")
      .or_else(|_| env::var("API_KEY"))
      .ok()
      .filter(|k| !k.trim().is_empty());

    let defaults = ModelConfig::default();
    Ok(Self {
      data_dir,
      gemini_api_key,
      gemini_api_base: env::var("GEMINI_API_BASE").unwrap_or_else(|_| GEMINI_API_BASE.to_string()),
      models: ModelConfig {
        text: env::var("FLEXTRACK_TEXT_MODEL").unwrap_or(defaults.text),
        plan: env::var("FLEXTRACK_PLAN_MODEL").unwrap_or(defaults.plan),
        image: env::var("FLEXTRACK_IMAGE_MODEL").unwrap_or(defaults.image),
      },
    })
  }

  /// Stored in: <data_dir>/flextrack.db
  pub fn db_path(&self) -> PathBuf {
    self.data_dir.join(DB_FILE_NAME)
  }
}

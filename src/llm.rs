//! Generative AI integration
//!
//! This module handles communication with the Gemini API for motivational
//! quotes, nutrition and exercise tips, weekly plans and avatar images.
//! Every call except image generation is wrapped in a fixed retry policy.

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::future::Future;
use thiserror::Error;
use url::Url;

use crate::config::{AppConfig, ModelConfig};
use crate::models::{UserProfile, WeeklyPlan};

/// ---------------------------------------------------------------------------
/// Configuration
/// ---------------------------------------------------------------------------

/// Retries after the first attempt; re-invoked immediately, no backoff
pub const MAX_RETRIES: u32 = 2;

/// ---------------------------------------------------------------------------
/// Error Types
/// ---------------------------------------------------------------------------

#[derive(Error, Debug, Serialize)]
pub enum LlmError {
  #[error("API key not configured")]
  MissingApiKey,

  #[error("Request failed: {0}")]
  Request(String),

  #[error("API error: {0}")]
  Api(String),

  #[error("Parse error: {0}")]
  Parse(String),
}

/// ---------------------------------------------------------------------------
/// Gemini API Types
/// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
  contents: Vec<Content>,
  #[serde(skip_serializing_if = "Option::is_none")]
  generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content {
  #[serde(skip_serializing_if = "Option::is_none")]
  role: Option<String>,
  parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
  text: String,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
  #[serde(skip_serializing_if = "Option::is_none")]
  response_mime_type: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  response_schema: Option<serde_json::Value>,
  #[serde(skip_serializing_if = "Option::is_none")]
  image_config: Option<ImageConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageConfig {
  aspect_ratio: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
  #[serde(default)]
  candidates: Vec<Candidate>,
  usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
  content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
  #[serde(default)]
  parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponsePart {
  text: Option<String>,
  inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
  mime_type: Option<String>,
  data: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
  #[serde(default)]
  pub prompt_token_count: u32,
  #[serde(default)]
  pub candidates_token_count: u32,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorResponse {
  error: GeminiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorDetail {
  message: String,
}

impl GenerateContentResponse {
  fn first_parts(&self) -> &[ResponsePart] {
    self
      .candidates
      .first()
      .and_then(|c| c.content.as_ref())
      .map(|c| c.parts.as_slice())
      .unwrap_or(&[])
  }

  /// All text parts of the first candidate, concatenated
  fn text(&self) -> Option<String> {
    let text: String = self
      .first_parts()
      .iter()
      .filter_map(|p| p.text.as_deref())
      .collect();
    if text.is_empty() {
      None
    } else {
      Some(text)
    }
  }

  fn inline_image(&self) -> Option<&InlineData> {
    self.first_parts().iter().find_map(|p| p.inline_data.as_ref())
  }
}

/// ---------------------------------------------------------------------------
/// Retry Policy
/// ---------------------------------------------------------------------------

/// Run `op`, re-invoking it immediately up to `retries` more times on failure
pub async fn with_retry<T, F, Fut>(retries: u32, mut op: F) -> Result<T, LlmError>
where
  F: FnMut() -> Fut,
  Fut: Future<Output = Result<T, LlmError>>,
{
  let mut attempt = 0;
  loop {
    match op().await {
      Ok(value) => return Ok(value),
      Err(e) if attempt < retries => {
        attempt += 1;
        tracing::warn!(attempt, error = %e, "Gemini call failed, retrying");
      }
      Err(e) => return Err(e),
    }
  }
}

/// ---------------------------------------------------------------------------
/// Gemini Client
/// ---------------------------------------------------------------------------

pub struct GeminiClient {
  client: Client,
  api_key: String,
  api_base: String,
  models: ModelConfig,
}

impl GeminiClient {
  pub fn new(api_key: impl Into<String>, api_base: impl Into<String>, models: ModelConfig) -> Self {
    Self {
      client: Client::new(),
      api_key: api_key.into(),
      api_base: api_base.into(),
      models,
    }
  }

  /// Create a client from app config; fails when no API key is configured
  pub fn from_config(config: &AppConfig) -> Result<Self, LlmError> {
    let api_key = config.gemini_api_key.clone().ok_or(LlmError::MissingApiKey)?;
    Ok(Self::new(api_key, config.gemini_api_base.clone(), config.models.clone()))
  }

  fn endpoint(&self, model: &str) -> Result<Url, LlmError> {
    let base = self.api_base.trim_end_matches('/');
    let mut url = Url::parse(&format!("{}/v1beta/models/{}:generateContent", base, model))
      .map_err(|e| LlmError::Request(e.to_string()))?;
    url.query_pairs_mut().append_pair("key", &self.api_key);
    Ok(url)
  }

  async fn generate(
    &self,
    model: &str,
    prompt: &str,
    generation_config: Option<GenerationConfig>,
  ) -> Result<GenerateContentResponse, LlmError> {
    let request = GenerateContentRequest {
      contents: vec![Content {
        role: Some("user".to_string()),
        parts: vec![Part {
          text: prompt.to_string(),
        }],
      }],
      generation_config,
    };

    let response = self
      .client
      .post(self.endpoint(model)?)
      .json(&request)
      .send()
      .await
      .map_err(|e| LlmError::Request(e.to_string()))?;

    let status = response.status();
    let body = response
      .text()
      .await
      .map_err(|e| LlmError::Request(e.to_string()))?;

    if !status.is_success() {
      if let Ok(error_resp) = serde_json::from_str::<GeminiErrorResponse>(&body) {
        return Err(LlmError::Api(error_resp.error.message));
      }
      return Err(LlmError::Api(format!("HTTP {}: {}", status, body)));
    }

    let parsed: GenerateContentResponse =
      serde_json::from_str(&body).map_err(|e| LlmError::Parse(e.to_string()))?;

    if let Some(usage) = &parsed.usage_metadata {
      tracing::debug!(
        model,
        prompt_tokens = usage.prompt_token_count,
        output_tokens = usage.candidates_token_count,
        "Gemini call complete"
      );
    }

    Ok(parsed)
  }

  /// Single text completion, no retry
  pub async fn complete(&self, model: &str, prompt: &str) -> Result<String, LlmError> {
    self
      .generate(model, prompt, None)
      .await?
      .text()
      .ok_or_else(|| LlmError::Parse("No text content in response".to_string()))
  }

  /// Text completion under the retry policy
  pub async fn complete_with_retry(&self, model: &str, prompt: &str) -> Result<String, LlmError> {
    let client = self;
    with_retry(MAX_RETRIES, move || client.complete(model, prompt)).await
  }

  /// Structured completion constrained by a response schema
  pub async fn complete_json<T: DeserializeOwned>(
    &self,
    model: &str,
    prompt: &str,
    schema: serde_json::Value,
  ) -> Result<T, LlmError> {
    let config = GenerationConfig {
      response_mime_type: Some("application/json".to_string()),
      response_schema: Some(schema),
      ..Default::default()
    };
    let text = self
      .generate(model, prompt, Some(config))
      .await?
      .text()
      .ok_or_else(|| LlmError::Parse("No text content in response".to_string()))?;

    let json_str = extract_json(&text)?;
    serde_json::from_str(&json_str).map_err(|e| LlmError::Parse(format!("{}: {}", e, json_str)))
  }

  // ---------------------------------------------------------------------------
  // Coaching content
  // ---------------------------------------------------------------------------

  pub async fn motivational_quote(&self, streak: u32) -> Result<String, LlmError> {
    let prompt = format!(
      "Short, high-intensity quote for a {}-day gym streak. Max 10 words.",
      streak
    );
    self.complete_with_retry(&self.models.text, &prompt).await
  }

  pub async fn nutrition_tips(&self, profile: &UserProfile) -> Result<String, LlmError> {
    let prompt = format!(
      "Nutrition tips for: Age {}, {}kg, {} activity. Max 3 bullet points.",
      profile.age, profile.weight, profile.activity_level
    );
    self.complete_with_retry(&self.models.text, &prompt).await
  }

  pub async fn exercise_tips(&self, exercise_name: &str) -> Result<String, LlmError> {
    let prompt = format!(
      "Provide 3 form corrections and 2 variations for: {}. Focus on safety.",
      exercise_name
    );
    self.complete_with_retry(&self.models.text, &prompt).await
  }

  /// Generate a 7-day routine as a [`WeeklyPlan`]
  pub async fn workout_routine(
    &self,
    goal: &str,
    experience: &str,
    equipment: &str,
    profile: Option<&UserProfile>,
  ) -> Result<WeeklyPlan, LlmError> {
    let profile_context = profile
      .map(|p| {
        format!(
          "User: {}, Age {}, Weight {}kg, Body Fat {}%, Level: {}. ",
          p.name, p.age, p.weight, p.body_fat_percentage, p.activity_level
        )
      })
      .unwrap_or_default();

    let prompt = format!(
      r#"{}Create a 7-day scientific workout routine. Goal: "{}", Level: "{}", Tools: "{}".
Respond in strict JSON format."#,
      profile_context, goal, experience, equipment
    );

    let client = self;
    let model = self.models.plan.as_str();
    let prompt = prompt.as_str();
    with_retry(MAX_RETRIES, move || {
      client.complete_json::<WeeklyPlan>(model, prompt, weekly_plan_schema())
    })
    .await
  }

  /// Generate an avatar image as a `data:` URL. Failures are logged and
  /// reported as `None`; this call is not retried.
  pub async fn avatar(&self, profile: &UserProfile) -> Option<String> {
    let prompt = format!(
      "A professional 3D fitness avatar of a {} athlete, clean background, high quality.",
      profile.gender
    );
    let config = GenerationConfig {
      image_config: Some(ImageConfig {
        aspect_ratio: "1:1".to_string(),
      }),
      ..Default::default()
    };

    match self.generate(&self.models.image, &prompt, Some(config)).await {
      Ok(response) => response.inline_image().map(|image| {
        format!(
          "data:{};base64,{}",
          image.mime_type.as_deref().unwrap_or("image/png"),
          image.data
        )
      }),
      Err(e) => {
        tracing::error!(error = %e, "Avatar generation failed");
        None
      }
    }
  }
}

/// Response schema for [`GeminiClient::workout_routine`]
fn weekly_plan_schema() -> serde_json::Value {
  serde_json::json!({
    "type": "OBJECT",
    "properties": {
      "routineName": { "type": "STRING" },
      "weeklySchedule": {
        "type": "ARRAY",
        "items": {
          "type": "OBJECT",
          "properties": {
            "day": { "type": "STRING" },
            "focus": { "type": "STRING" },
            "exercises": {
              "type": "ARRAY",
              "items": {
                "type": "OBJECT",
                "properties": {
                  "name": { "type": "STRING" },
                  "sets": { "type": "INTEGER" },
                  "reps": { "type": "STRING" },
                  "tips": { "type": "STRING" }
                }
              }
            }
          }
        }
      }
    },
    "required": ["routineName", "weeklySchedule"]
  })
}

/// Extract JSON from a model response (handles markdown code blocks)
fn extract_json(text: &str) -> Result<String, LlmError> {
  let trimmed = text.trim();
  if trimmed.starts_with('{') {
    return Ok(trimmed.to_string());
  }

  if let Some(start) = text.find("```json") {
    let start = start + 7;
    if let Some(end) = text[start..].find("```") {
      return Ok(text[start..start + end].trim().to_string());
    }
  }

  if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
    if start < end {
      return Ok(text[start..=end].to_string());
    }
  }

  Err(LlmError::Parse("Could not extract JSON from response".to_string()))
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;
  use mockito::Matcher;
  use std::sync::atomic::{AtomicU32, Ordering};

  const TEXT_PATH: &str = "/v1beta/models/gemini-3-flash-preview:generateContent";

  fn text_body(text: &str) -> String {
    serde_json::json!({
      "candidates": [{ "content": { "role": "model", "parts": [{ "text": text }] } }],
      "usageMetadata": { "promptTokenCount": 12, "candidatesTokenCount": 8 }
    })
    .to_string()
  }

  fn client_for(server: &mockito::ServerGuard) -> GeminiClient {
    GeminiClient::new("test-key", server.url(), ModelConfig::default())
  }

  #[test]
  fn test_extract_json_direct() {
    let input = r#"{"routineName": "PPL", "weeklySchedule": []}"#;
    let result = extract_json(input).unwrap();
    assert!(result.contains("routineName"));
  }

  #[test]
  fn test_extract_json_code_block() {
    let input = "Here is your plan:\n\n```json\n{\"routineName\": \"Upper/Lower\"}\n```\n";
    let result = extract_json(input).unwrap();
    assert_eq!(result, r#"{"routineName": "Upper/Lower"}"#);
  }

  #[test]
  fn test_extract_json_no_object() {
    assert!(extract_json("no json here").is_err());
  }

  #[test]
  fn test_request_serialization_uses_camel_case() {
    let request = GenerateContentRequest {
      contents: vec![Content {
        role: Some("user".to_string()),
        parts: vec![Part { text: "hi".to_string() }],
      }],
      generation_config: Some(GenerationConfig {
        response_mime_type: Some("application/json".to_string()),
        ..Default::default()
      }),
    };
    let json = serde_json::to_value(&request).unwrap();
    assert_eq!(json["generationConfig"]["responseMimeType"], "application/json");
    assert!(json["generationConfig"].get("imageConfig").is_none());
  }

  #[tokio::test]
  async fn test_with_retry_makes_three_attempts() {
    let attempts = AtomicU32::new(0);
    let result: Result<(), LlmError> = with_retry(MAX_RETRIES, || {
      attempts.fetch_add(1, Ordering::SeqCst);
      async { Err(LlmError::Request("boom".to_string())) }
    })
    .await;

    assert!(result.is_err());
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
  }

  #[tokio::test]
  async fn test_with_retry_stops_on_success() {
    let attempts = AtomicU32::new(0);
    let result = with_retry(MAX_RETRIES, || {
      let n = attempts.fetch_add(1, Ordering::SeqCst);
      async move {
        if n == 0 {
          Err(LlmError::Api("flaky".to_string()))
        } else {
          Ok(n)
        }
      }
    })
    .await;

    assert_eq!(result.unwrap(), 1);
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
  }

  #[tokio::test]
  async fn test_motivational_quote() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
      .mock("POST", TEXT_PATH)
      .match_query(Matcher::UrlEncoded("key".into(), "test-key".into()))
      .match_body(Matcher::Regex("7-day gym streak".to_string()))
      .with_status(200)
      .with_header("content-type", "application/json")
      .with_body(text_body("Seven days. Zero excuses."))
      .create_async()
      .await;

    let quote = client_for(&server).motivational_quote(7).await.unwrap();
    assert_eq!(quote, "Seven days. Zero excuses.");
    mock.assert_async().await;
  }

  #[tokio::test]
  async fn test_api_error_is_retried_then_surfaced() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
      .mock("POST", TEXT_PATH)
      .match_query(Matcher::Any)
      .with_status(500)
      .with_body(r#"{"error": {"code": 500, "message": "internal"}}"#)
      .expect(3)
      .create_async()
      .await;

    let err = client_for(&server).exercise_tips("Squat").await.unwrap_err();
    assert!(matches!(err, LlmError::Api(ref m) if m == "internal"));
    mock.assert_async().await;
  }

  #[tokio::test]
  async fn test_workout_routine_parses_plan() {
    let plan = serde_json::json!({
      "routineName": "Hypertrophy Split",
      "weeklySchedule": [{
        "day": "Monday",
        "focus": "Chest",
        "exercises": [{ "name": "Bench Press", "sets": 4, "reps": "8-10", "tips": "Control the descent" }]
      }]
    });

    let mut server = mockito::Server::new_async().await;
    let mock = server
      .mock("POST", "/v1beta/models/gemini-3-pro-preview:generateContent")
      .match_query(Matcher::Any)
      .match_body(Matcher::PartialJson(serde_json::json!({
        "generationConfig": { "responseMimeType": "application/json" }
      })))
      .with_status(200)
      .with_body(text_body(&plan.to_string()))
      .create_async()
      .await;

    let result = client_for(&server)
      .workout_routine("muscle gain", "Beginner", "dumbbells", Some(&UserProfile::default()))
      .await
      .unwrap();

    assert_eq!(result.routine_name, "Hypertrophy Split");
    assert_eq!(result.weekly_schedule[0].exercises[0].sets, 4);
    mock.assert_async().await;
  }

  #[tokio::test]
  async fn test_avatar_returns_data_url() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
      .mock("POST", "/v1beta/models/gemini-2.5-flash-image:generateContent")
      .match_query(Matcher::Any)
      .with_status(200)
      .with_body(
        serde_json::json!({
          "candidates": [{ "content": { "parts": [
            { "text": "Here you go" },
            { "inlineData": { "mimeType": "image/png", "data": "iVBORw0KGgo=" } }
          ] } }]
        })
        .to_string(),
      )
      .create_async()
      .await;

    let avatar = client_for(&server).avatar(&UserProfile::default()).await;
    assert_eq!(avatar.as_deref(), Some("data:image/png;base64,iVBORw0KGgo="));
  }

  #[tokio::test]
  async fn test_avatar_failure_is_not_retried() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
      .mock("POST", "/v1beta/models/gemini-2.5-flash-image:generateContent")
      .match_query(Matcher::Any)
      .with_status(429)
      .with_body("quota")
      .expect(1)
      .create_async()
      .await;

    assert!(client_for(&server).avatar(&UserProfile::default()).await.is_none());
    mock.assert_async().await;
  }
}

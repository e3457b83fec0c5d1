//! AI coaching commands
//!
//! Generated content is optional. When the client is missing or a call fails
//! after retries, these commands fall back to canned content or an error
//! notification instead of failing the caller.

use crate::db::AppState;
use crate::exercises;
use crate::llm::LlmError;
use crate::models::WeeklyPlan;

pub const FALLBACK_QUOTE: &str = "Success doesn't start in the gym. It starts in your mind.";
pub const FALLBACK_NUTRITION_TIPS: &str = "• Focus on high-quality protein (1.6g/kg).\n\
• Stay hydrated (3L+ daily).\n\
• Prioritize consistent sleep for recovery.";

/// Motivational quote for the current streak
pub async fn get_motivational_quote(state: &AppState) -> String {
  let Some(client) = &state.gemini else {
    return FALLBACK_QUOTE.to_string();
  };

  match client.motivational_quote(state.store.stats().streak).await {
    Ok(quote) => quote.trim().to_string(),
    Err(e) => {
      tracing::warn!(error = %e, "Quote generation failed, using fallback");
      FALLBACK_QUOTE.to_string()
    }
  }
}

/// Nutrition tips for the current profile
pub async fn get_nutrition_tips(state: &AppState) -> String {
  let Some(client) = &state.gemini else {
    return FALLBACK_NUTRITION_TIPS.to_string();
  };

  match client.nutrition_tips(&state.store.stats().profile).await {
    Ok(tips) => tips,
    Err(e) => {
      tracing::warn!(error = %e, "Nutrition tips failed, using fallback");
      FALLBACK_NUTRITION_TIPS.to_string()
    }
  }
}

/// Form corrections and variations for a catalog exercise
pub async fn get_exercise_tips(state: &AppState, exercise_id: &str) -> Result<String, String> {
  let exercise = exercises::find(exercise_id)
    .ok_or_else(|| format!("Unknown exercise: {}", exercise_id))?;

  let result = match &state.gemini {
    Some(client) => client.exercise_tips(exercise.name).await,
    None => Err(LlmError::MissingApiKey),
  };

  match result {
    Ok(tips) => Ok(tips),
    Err(e) => {
      state
        .store
        .notifications()
        .error(format!("Could not load tips for {}.", exercise.name))
        .await;
      Err(format!("Failed to get exercise tips: {}", e))
    }
  }
}

/// Generate a weekly plan from the user's goal, level and equipment
pub async fn generate_plan(
  state: &AppState,
  goal: &str,
  experience: &str,
  equipment: &str,
) -> Result<WeeklyPlan, String> {
  let result = match &state.gemini {
    Some(client) => {
      client
        .workout_routine(goal, experience, equipment, Some(&state.store.stats().profile))
        .await
    }
    None => Err(LlmError::MissingApiKey),
  };

  match result {
    Ok(plan) => Ok(plan),
    Err(e) => {
      state
        .store
        .notifications()
        .error("Plan generation failed. Try again.")
        .await;
      Err(format!("Failed to generate plan: {}", e))
    }
  }
}

pub async fn activate_plan(state: &mut AppState, plan: WeeklyPlan) -> Result<(), String> {
  state
    .store
    .activate_plan(plan)
    .await
    .map_err(|e| format!("Failed to activate plan: {}", e))
}

/// Generate an avatar and store it on the profile. `Ok(false)` when the
/// service produced no image.
pub async fn generate_avatar(state: &mut AppState) -> Result<bool, String> {
  let Some(client) = &state.gemini else {
    return Ok(false);
  };

  match client.avatar(&state.store.stats().profile).await {
    Some(url) => {
      state
        .store
        .set_avatar(url)
        .await
        .map_err(|e| format!("Failed to save avatar: {}", e))?;
      Ok(true)
    }
    None => Ok(false),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::ModelConfig;
  use crate::llm::GeminiClient;
  use crate::notifications::Severity;
  use crate::test_utils::setup_test_state;
  use mockito::Matcher;

  #[tokio::test]
  async fn test_fallbacks_without_api_key() {
    let mut state = setup_test_state().await;
    assert!(state.gemini.is_none());

    assert_eq!(get_motivational_quote(&state).await, FALLBACK_QUOTE);
    assert_eq!(get_nutrition_tips(&state).await, FALLBACK_NUTRITION_TIPS);
    assert!(!generate_avatar(&mut state).await.unwrap());
    assert!(generate_plan(&state, "strength", "Beginner", "barbell").await.is_err());
  }

  #[tokio::test]
  async fn test_nutrition_tips_fall_back_after_retries() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
      .mock("POST", Matcher::Any)
      .match_query(Matcher::Any)
      .with_status(503)
      .with_body("unavailable")
      .expect(3)
      .create_async()
      .await;

    let mut state = setup_test_state().await;
    state.gemini = Some(GeminiClient::new("k", server.url(), ModelConfig::default()));

    assert_eq!(get_nutrition_tips(&state).await, FALLBACK_NUTRITION_TIPS);
    mock.assert_async().await;
  }

  #[tokio::test]
  async fn test_exercise_tips_failure_notifies() {
    let state = setup_test_state().await;

    let err = get_exercise_tips(&state, "1").await.unwrap_err();
    assert!(err.contains("API key"), "unexpected error: {}", err);

    let notes = state.store.notifications().active().await;
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].severity, Severity::Error);
    assert!(notes[0].message.contains("Bench Press"));

    assert!(get_exercise_tips(&state, "404").await.is_err());
  }

  #[tokio::test]
  async fn test_generated_avatar_is_saved_to_profile() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
      .mock("POST", Matcher::Any)
      .match_query(Matcher::Any)
      .with_status(200)
      .with_body(r#"{"candidates":[{"content":{"parts":[{"inlineData":{"mimeType":"image/png","data":"AAAA"}}]}}]}"#)
      .create_async()
      .await;

    let mut state = setup_test_state().await;
    state.gemini = Some(GeminiClient::new("k", server.url(), ModelConfig::default()));

    assert!(generate_avatar(&mut state).await.unwrap());
    assert_eq!(
      state.store.stats().profile.avatar_url.as_deref(),
      Some("data:image/png;base64,AAAA")
    );
  }
}

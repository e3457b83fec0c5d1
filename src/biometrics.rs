use serde::Serialize;

use crate::models::UserProfile;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Biometrics {
  /// Basal metabolic rate, kcal/day
  pub bmr: i64,
  /// Total daily energy expenditure, kcal/day
  pub tdee: i64,
}

fn activity_multiplier(level: &str) -> f64 {
  match level {
    "Sedentary" => 1.2,
    "Light" => 1.375,
    "Moderate" => 1.55,
    "Active" => 1.725,
    "Very Active" => 1.9,
    _ => 1.2,
  }
}

/// Mifflin-St Jeor BMR and activity-scaled TDEE
pub fn compute(profile: &UserProfile) -> Biometrics {
  let base = 10.0 * profile.weight + 6.25 * profile.height - 5.0 * profile.age as f64;
  let bmr = if profile.gender == "Male" { base + 5.0 } else { base - 161.0 };

  Biometrics {
    bmr: bmr.round() as i64,
    tdee: (bmr * activity_multiplier(&profile.activity_level)).round() as i64,
  }
}

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExerciseCategory {
  Strength,
  Cardio,
  Flexibility,
  Sports,
  Bodyweight,
}

impl std::str::FromStr for ExerciseCategory {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "strength" => Ok(Self::Strength),
      "cardio" => Ok(Self::Cardio),
      "flexibility" => Ok(Self::Flexibility),
      "sports" => Ok(Self::Sports),
      "bodyweight" => Ok(Self::Bodyweight),
      _ => Err(format!("Unknown exercise category: {}", s)),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
  Beginner,
  Intermediate,
  Advanced,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
  pub id: &'static str,
  pub name: &'static str,
  pub category: ExerciseCategory,
  pub muscle_groups: &'static [&'static str],
  pub instructions: &'static [&'static str],
  pub equipment: &'static str,
  pub difficulty: Difficulty,
}

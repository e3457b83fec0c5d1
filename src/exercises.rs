//! Built-in exercise catalog

use crate::models::{Difficulty, Exercise, ExerciseCategory};

pub static EXERCISES: &[Exercise] = &[
  Exercise {
    id: "1",
    name: "Bench Press",
    category: ExerciseCategory::Strength,
    muscle_groups: &["Chest", "Triceps", "Shoulders"],
    instructions: &["Lie on the bench", "Grip bar shoulder-width", "Lower to chest", "Push up"],
    equipment: "Barbell",
    difficulty: Difficulty::Intermediate,
  },
  Exercise {
    id: "2",
    name: "Squat",
    category: ExerciseCategory::Strength,
    muscle_groups: &["Quads", "Glutes", "Hamstrings"],
    instructions: &[
      "Feet shoulder-width apart",
      "Bar across upper back",
      "Lower hips",
      "Stand back up",
    ],
    equipment: "Barbell",
    difficulty: Difficulty::Intermediate,
  },
  Exercise {
    id: "3",
    name: "Deadlift",
    category: ExerciseCategory::Strength,
    muscle_groups: &["Back", "Glutes", "Hamstrings"],
    instructions: &["Feet hip-width", "Bend at hips", "Grip bar", "Lift using legs and back"],
    equipment: "Barbell",
    difficulty: Difficulty::Advanced,
  },
  Exercise {
    id: "4",
    name: "Running",
    category: ExerciseCategory::Cardio,
    muscle_groups: &["Legs", "Heart"],
    instructions: &["Maintain steady pace", "Focus on breathing", "Good posture"],
    equipment: "None",
    difficulty: Difficulty::Beginner,
  },
  Exercise {
    id: "5",
    name: "Yoga Flow",
    category: ExerciseCategory::Flexibility,
    muscle_groups: &["Full Body"],
    instructions: &["Flow through poses", "Deep breathing", "Hold stretches"],
    equipment: "Yoga Mat",
    difficulty: Difficulty::Beginner,
  },
];

pub fn find(id: &str) -> Option<&'static Exercise> {
  EXERCISES.iter().find(|e| e.id == id)
}

/// Display name for an exercise id, falling back to `Exercise #<id>` for unknown ids
pub fn display_name(id: &str) -> String {
  find(id)
    .map(|e| e.name.to_string())
    .unwrap_or_else(|| format!("Exercise #{}", id))
}

/// Case-insensitive name search with an optional category filter
pub fn search(term: &str, category: Option<ExerciseCategory>) -> Vec<&'static Exercise> {
  let needle = term.to_lowercase();
  EXERCISES
    .iter()
    .filter(|e| e.name.to_lowercase().contains(&needle))
    .filter(|e| category.map_or(true, |c| e.category == c))
    .collect()
}

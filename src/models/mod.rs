pub mod exercise;
pub mod goal;
pub mod stats;
pub mod workout;

pub use exercise::{Difficulty, Exercise, ExerciseCategory};
pub use goal::{Goal, GoalCategory};
pub use stats::{PrHistoryPoint, UserProfile, UserStats, WeeklyPlan, WeightEntry};
pub use workout::{Set, WorkoutLog, WorkoutSession};

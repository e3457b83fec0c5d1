//! Command-line interface
//!
//! Thin layer over [`crate::commands`]: parses arguments, runs one command
//! against the loaded app state, then prints whatever notifications it left.

use chrono::{Duration, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;

use crate::commands;
use crate::db::AppState;
use crate::exercises;
use crate::models::goal::NewGoal;
use crate::models::GoalCategory;
use crate::session::{SessionBuilder, SetUpdate};

#[derive(Debug, Parser)]
#[command(name = "flextrack", version, about = "Personal fitness tracker with AI coaching")]
pub struct Cli {
  #[command(subcommand)]
  pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
  /// Log a completed workout session
  Log(LogArgs),
  /// List saved sessions, newest first
  History {
    #[arg(long)]
    limit: Option<usize>,
  },
  /// Dashboard summary: totals, streak, volume and records
  Stats,
  /// Personal record history for one exercise
  Prs { exercise_id: String },
  /// Manage goals
  #[command(subcommand)]
  Goal(GoalCommand),
  /// Show or update the profile
  Profile(ProfileArgs),
  /// Record a body-weight measurement
  WeighIn {
    weight: f64,
    #[arg(long)]
    date: Option<NaiveDate>,
  },
  /// Browse the exercise catalog
  Exercises {
    #[arg(long, default_value = "")]
    search: String,
    #[arg(long)]
    category: Option<String>,
  },
  /// Export data
  #[command(subcommand)]
  Export(ExportCommand),
  /// Import a JSON backup, replacing all data
  Import { path: PathBuf },
  /// Motivational quote for the current streak
  Quote,
  /// Nutrition tips for the current profile
  Nutrition,
  /// Form tips for a catalog exercise
  Tips { exercise_id: String },
  /// Generate a weekly plan
  Plan(PlanArgs),
  /// Generate an AI avatar for the profile
  Avatar,
}

#[derive(Debug, Args)]
pub struct LogArgs {
  #[arg(long)]
  pub name: Option<String>,
  /// Duration in minutes
  #[arg(long, default_value_t = 0)]
  pub duration: u32,
  #[arg(long)]
  pub notes: Option<String>,
  /// `<exercise_id>:<weight>x<reps>`, repeatable, e.g. `--set 1:80x5`
  #[arg(long = "set", required = true, value_parser = parse_set_spec)]
  pub sets: Vec<SetSpec>,
}

#[derive(Debug, Subcommand)]
pub enum GoalCommand {
  Add {
    #[arg(long)]
    title: String,
    #[arg(long)]
    target: f64,
    #[arg(long, default_value_t = 0.0)]
    current: f64,
    #[arg(long, default_value = "kg")]
    unit: String,
    #[arg(long)]
    deadline: NaiveDate,
    /// Weight, Strength, Frequency, Duration or "Body Fat"
    #[arg(long, default_value = "Strength")]
    category: GoalCategory,
  },
  List,
  Update { id: String, current: f64 },
  Remove { id: String },
}

#[derive(Debug, Args)]
pub struct ProfileArgs {
  #[arg(long)]
  pub name: Option<String>,
  #[arg(long)]
  pub age: Option<u32>,
  #[arg(long)]
  pub weight: Option<f64>,
  #[arg(long)]
  pub height: Option<f64>,
  #[arg(long)]
  pub body_fat: Option<f64>,
  #[arg(long)]
  pub blood_group: Option<String>,
  #[arg(long)]
  pub gender: Option<String>,
  #[arg(long)]
  pub activity: Option<String>,
  #[arg(long)]
  pub health_sync: Option<bool>,
}

impl ProfileArgs {
  fn is_empty(&self) -> bool {
    self.name.is_none()
      && self.age.is_none()
      && self.weight.is_none()
      && self.height.is_none()
      && self.body_fat.is_none()
      && self.blood_group.is_none()
      && self.gender.is_none()
      && self.activity.is_none()
      && self.health_sync.is_none()
  }
}

#[derive(Debug, Subcommand)]
pub enum ExportCommand {
  Csv {
    #[arg(default_value = "flextrack_history.csv")]
    path: PathBuf,
  },
  Json {
    #[arg(long, default_value = ".")]
    dir: PathBuf,
  },
}

#[derive(Debug, Args)]
pub struct PlanArgs {
  #[arg(long, default_value = "muscle gain")]
  pub goal: String,
  #[arg(long, default_value = "Beginner")]
  pub experience: String,
  #[arg(long, default_value = "dumbbells and resistance bands")]
  pub equipment: String,
  /// Make the generated plan the active routine
  #[arg(long)]
  pub activate: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SetSpec {
  pub exercise_id: String,
  pub weight: f64,
  pub reps: u32,
}

pub fn parse_set_spec(raw: &str) -> Result<SetSpec, String> {
  let (exercise_id, load) = raw
    .split_once(':')
    .ok_or_else(|| format!("Expected <exercise_id>:<weight>x<reps>, got '{}'", raw))?;
  let (weight, reps) = load
    .split_once(['x', 'X'])
    .ok_or_else(|| format!("Expected <weight>x<reps>, got '{}'", load))?;

  let exercise_id = exercise_id.trim();
  if exercise_id.is_empty() {
    return Err("Exercise id is empty".to_string());
  }

  let weight_value: f64 = weight
    .trim()
    .parse()
    .map_err(|e| format!("Invalid weight '{}': {}", weight, e))?;
  if !weight_value.is_finite() {
    return Err(format!("Invalid weight '{}': must be a finite number", weight));
  }

  Ok(SetSpec {
    exercise_id: exercise_id.to_string(),
    weight: weight_value,
    reps: reps
      .trim()
      .parse()
      .map_err(|e| format!("Invalid reps '{}': {}", reps, e))?,
  })
}

/// Build a session from set specs. Sets for the same exercise are grouped
/// into one log, in order of first appearance.
pub fn build_session(args: &LogArgs) -> Result<crate::models::WorkoutSession, String> {
  let ended_at = Utc::now();
  let started_at = ended_at - Duration::minutes(args.duration as i64);
  let name = args
    .name
    .clone()
    .unwrap_or_else(|| format!("Training Session - {}", ended_at.format("%Y-%m-%d")));
  let mut builder = SessionBuilder::new(name, started_at);
  if let Some(notes) = &args.notes {
    builder.set_notes(notes.clone());
  }

  let mut log_ids: Vec<(String, String)> = Vec::new();
  for spec in &args.sets {
    let existing = log_ids
      .iter()
      .find(|(exercise_id, _)| exercise_id == &spec.exercise_id)
      .map(|(_, log_id)| log_id.clone());

    let (log_id, set_id) = match existing {
      Some(log_id) => {
        let set_id = builder.add_set(&log_id).map_err(|e| e.to_string())?;
        (log_id, set_id)
      }
      None => {
        let name = exercises::display_name(&spec.exercise_id);
        let log_id = builder.add_exercise_by_id(&spec.exercise_id, &name);
        log_ids.push((spec.exercise_id.clone(), log_id.clone()));
        let set_id = builder
          .logs()
          .last()
          .and_then(|l| l.sets.first())
          .map(|s| s.id.clone())
          .ok_or_else(|| "New exercise log has no set".to_string())?;
        (log_id, set_id)
      }
    };

    builder
      .update_set(
        &log_id,
        &set_id,
        SetUpdate {
          weight: Some(spec.weight),
          reps: Some(spec.reps),
          completed: Some(true),
        },
      )
      .map_err(|e| e.to_string())?;
  }

  builder.finish(ended_at).map_err(|e| e.to_string())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
  let out = serde_json::to_string_pretty(value).map_err(|e| e.to_string())?;
  println!("{}", out);
  Ok(())
}

/// Execute one CLI command against loaded state
pub async fn execute(state: &mut AppState, command: Command) -> Result<(), String> {
  match command {
    Command::Log(args) => {
      let session = build_session(&args)?;
      let records = commands::save_workout(state, session).await?;
      print_json(&records)
    }
    Command::History { limit } => print_json(&commands::get_workouts(state, limit)),
    Command::Stats => print_json(&commands::get_dashboard(state)),
    Command::Prs { exercise_id } => print_json(&commands::get_pr_details(state, &exercise_id)),
    Command::Goal(goal) => match goal {
      GoalCommand::Add {
        title,
        target,
        current,
        unit,
        deadline,
        category,
      } => {
        let view = commands::goals::add_goal(
          state,
          NewGoal {
            title,
            target_value: target,
            current_value: current,
            unit,
            deadline,
            category,
          },
        )
        .await?;
        print_json(&view)
      }
      GoalCommand::List => print_json(&commands::goals::get_goals(state)),
      GoalCommand::Update { id, current } => {
        print_json(&commands::goals::update_goal_progress(state, &id, current).await?)
      }
      GoalCommand::Remove { id } => commands::goals::remove_goal(state, &id).await,
    },
    Command::Profile(args) => {
      if !args.is_empty() {
        let mut profile = state.store.stats().profile.clone();
        if let Some(v) = args.name.clone() {
          profile.name = v;
        }
        if let Some(v) = args.age {
          profile.age = v;
        }
        if let Some(v) = args.weight {
          profile.weight = v;
        }
        if let Some(v) = args.height {
          profile.height = v;
        }
        if let Some(v) = args.body_fat {
          profile.body_fat_percentage = v;
        }
        if let Some(v) = args.blood_group.clone() {
          profile.blood_group = v;
        }
        if let Some(v) = args.gender.clone() {
          profile.gender = v;
        }
        if let Some(v) = args.activity.clone() {
          profile.activity_level = v;
        }
        state
          .store
          .update_profile(profile, args.health_sync)
          .await
          .map_err(|e| format!("Failed to update profile: {}", e))?;
      }

      #[derive(Serialize)]
      struct ProfileOutput<'a> {
        profile: &'a crate::models::UserProfile,
        health_sync_enabled: bool,
        biometrics: crate::biometrics::Biometrics,
      }
      print_json(&ProfileOutput {
        profile: &state.store.stats().profile,
        health_sync_enabled: state.store.stats().health_sync_enabled,
        biometrics: commands::get_biometrics(state),
      })
    }
    Command::WeighIn { weight, date } => state
      .store
      .record_body_weight(date.unwrap_or_else(|| Utc::now().date_naive()), weight)
      .await
      .map_err(|e| format!("Failed to record weight: {}", e)),
    Command::Exercises { search, category } => {
      print_json(&commands::search_exercises(&search, category.as_deref())?)
    }
    Command::Export(export) => match export {
      ExportCommand::Csv { path } => commands::backup::export_csv(state, &path),
      ExportCommand::Json { dir } => {
        let path = commands::backup::export_json(state, &dir)?;
        println!("{}", path.display());
        Ok(())
      }
    },
    Command::Import { path } => commands::backup::import_json(state, &path).await,
    Command::Quote => {
      println!("{}", commands::coach::get_motivational_quote(state).await);
      Ok(())
    }
    Command::Nutrition => {
      println!("{}", commands::coach::get_nutrition_tips(state).await);
      Ok(())
    }
    Command::Tips { exercise_id } => {
      println!("{}", commands::coach::get_exercise_tips(state, &exercise_id).await?);
      Ok(())
    }
    Command::Plan(args) => {
      let plan =
        commands::coach::generate_plan(state, &args.goal, &args.experience, &args.equipment).await?;
      print_json(&plan)?;
      if args.activate {
        commands::coach::activate_plan(state, plan).await?;
      }
      Ok(())
    }
    Command::Avatar => {
      if !commands::coach::generate_avatar(state).await? {
        state.store.notifications().info("No avatar was generated.").await;
      }
      Ok(())
    }
  }
}

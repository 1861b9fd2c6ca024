mod config_cmd;
mod draft;
mod exercise;
mod weight;
mod workout;

pub use config_cmd::ConfigCommand;
pub use draft::DraftCommand;
pub use exercise::ExerciseCommand;
pub use weight::WeightCommand;
pub use workout::WorkoutCommand;

use chrono::{Local, NaiveDate};
use clap::ValueEnum;

use gymlog::catalog;
use gymlog::{Exercise, Gateway, WorkoutExercise};

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Parses a YYYY-MM-DD date, defaulting to today.
fn parse_date(date: Option<&str>) -> Result<NaiveDate, String> {
    match date {
        Some(date) => NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|_| format!("Invalid date format '{}'. Use YYYY-MM-DD.", date)),
        None => Ok(Local::now().date_naive()),
    }
}

/// Parses a set given as WEIGHTxREPS, e.g. "60x10" or "62.5X8".
fn parse_set(value: &str) -> Result<(f64, u32), String> {
    let invalid = || format!("Invalid set '{}'. Use WEIGHTxREPS, e.g. 60x10.", value);

    let (weight, reps) = value
        .trim()
        .split_once(|c| c == 'x' || c == 'X')
        .ok_or_else(invalid)?;
    let weight: f64 = weight.trim().parse().map_err(|_| invalid())?;
    let reps: u32 = reps.trim().parse().map_err(|_| invalid())?;

    if !weight.is_finite() || weight < 0.0 {
        return Err("Weight must be zero or a positive number".to_string());
    }
    if reps == 0 {
        return Err("Reps must be at least 1".to_string());
    }
    Ok((weight, reps))
}

/// Finds an exercise by id or by name in the built-in and custom library.
async fn resolve_exercise(
    gateway: &Gateway,
    identifier: &str,
) -> Result<Exercise, Box<dyn std::error::Error>> {
    let found = if let Ok(id) = identifier.parse::<i64>() {
        gateway.find_exercise(id).await?
    } else {
        let custom = gateway.list_custom_exercises().await?;
        catalog::find_by_name(identifier, &custom)
    };

    found.ok_or_else(|| format!("Exercise not found: {}", identifier).into())
}

/// Builds exercise entries from `--exercise NAME` and `--set NAME=WEIGHTxREPS`
/// arguments. Entries keep the order in which their exercise first appears.
async fn build_exercises(
    gateway: &Gateway,
    exercises: &[String],
    sets: &[String],
) -> Result<Vec<WorkoutExercise>, Box<dyn std::error::Error>> {
    let mut entries: Vec<WorkoutExercise> = Vec::new();

    for identifier in exercises {
        let exercise = resolve_exercise(gateway, identifier).await?;
        if !entries.iter().any(|e| e.exercise.id == exercise.id) {
            entries.push(WorkoutExercise::new(exercise));
        }
    }

    for value in sets {
        let (identifier, weight, reps) = parse_set_arg(value)?;
        let exercise = resolve_exercise(gateway, identifier).await?;
        let position = match entries.iter().position(|e| e.exercise.id == exercise.id) {
            Some(position) => position,
            None => {
                entries.push(WorkoutExercise::new(exercise));
                entries.len() - 1
            }
        };
        entries[position].add_set(weight, reps);
    }

    Ok(entries)
}

/// Splits "Bench Press=60x10" into the exercise and its set.
fn parse_set_arg(value: &str) -> Result<(&str, f64, u32), String> {
    let (exercise, set) = value
        .rsplit_once('=')
        .ok_or_else(|| format!("Invalid set '{}'. Use EXERCISE=WEIGHTxREPS.", value))?;
    let (weight, reps) = parse_set(set)?;
    Ok((exercise.trim(), weight, reps))
}

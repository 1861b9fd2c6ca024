//! Progress statistics derived from committed workouts and the weight log.

use chrono::{Days, Months, NaiveDate};
use serde::Serialize;

use crate::models::{WeightEntry, Workout, WorkoutSet};

/// How one exercise went on one workout date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExerciseProgress {
    pub date: NaiveDate,
    pub workout_id: i64,
    pub max_weight: f64,
    pub max_reps: u32,
    /// Largest single-set volume (weight x reps)
    pub max_volume: f64,
    pub total_volume: f64,
    pub sets: Vec<WorkoutSet>,
}

/// History of an exercise across workouts, oldest first. Workouts where the
/// exercise was added but no set was logged are skipped.
pub fn exercise_history(workouts: &[Workout], exercise_id: i64) -> Vec<ExerciseProgress> {
    let mut history: Vec<ExerciseProgress> = workouts
        .iter()
        .filter_map(|workout| {
            let entry = workout
                .exercises
                .iter()
                .find(|e| e.exercise.id == exercise_id)?;
            if entry.sets.is_empty() {
                return None;
            }

            Some(ExerciseProgress {
                date: workout.date,
                workout_id: workout.id,
                max_weight: entry.sets.iter().map(|s| s.weight).fold(0.0, f64::max),
                max_reps: entry.sets.iter().map(|s| s.reps).max().unwrap_or(0),
                max_volume: entry.sets.iter().map(WorkoutSet::volume).fold(0.0, f64::max),
                total_volume: entry.total_volume(),
                sets: entry.sets.clone(),
            })
        })
        .collect();

    history.sort_by(|a, b| a.date.cmp(&b.date).then(a.workout_id.cmp(&b.workout_id)));
    history
}

/// Body-weight averages relative to a reference day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightSummary {
    pub latest: Option<WeightEntry>,
    /// Average of entries dated after one week before `today`
    pub weekly_average: Option<f64>,
    /// Average of entries dated after one month before `today`
    pub monthly_average: Option<f64>,
}

pub fn weight_summary(entries: &[WeightEntry], today: NaiveDate) -> WeightSummary {
    let latest = entries
        .iter()
        .max_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)))
        .cloned();

    let week_start = today.checked_sub_days(Days::new(7));
    let month_start = today.checked_sub_months(Months::new(1));

    WeightSummary {
        latest,
        weekly_average: average_after(entries, week_start),
        monthly_average: average_after(entries, month_start),
    }
}

fn average_after(entries: &[WeightEntry], start: Option<NaiveDate>) -> Option<f64> {
    let selected: Vec<f64> = entries
        .iter()
        .filter(|e| start.map_or(true, |start| e.date > start))
        .map(|e| e.weight)
        .collect();

    if selected.is_empty() {
        None
    } else {
        Some(selected.iter().sum::<f64>() / selected.len() as f64)
    }
}

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::exercise::Exercise;
use super::workout_type::WorkoutType;

/// One performed set: a 1-based set number, the weight moved and the reps done.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSet {
    pub set_number: u32,
    pub weight: f64,
    pub reps: u32,
}

impl WorkoutSet {
    pub fn new(set_number: u32, weight: f64, reps: u32) -> Self {
        Self {
            set_number,
            weight,
            reps,
        }
    }

    pub fn volume(&self) -> f64 {
        self.weight * f64::from(self.reps)
    }
}

impl fmt::Display for WorkoutSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Set {}: {:.1} kg x {} reps",
            self.set_number, self.weight, self.reps
        )
    }
}

/// An exercise performed within a workout together with its sets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutExercise {
    pub exercise: Exercise,
    #[serde(default)]
    pub sets: Vec<WorkoutSet>,
}

impl WorkoutExercise {
    pub fn new(exercise: Exercise) -> Self {
        Self {
            exercise,
            sets: Vec::new(),
        }
    }

    pub fn with_sets(mut self, sets: Vec<WorkoutSet>) -> Self {
        self.sets = sets;
        self
    }

    /// Appends a set numbered after the current last set.
    pub fn add_set(&mut self, weight: f64, reps: u32) -> &WorkoutSet {
        let next = self.sets.iter().map(|s| s.set_number).max().unwrap_or(0) + 1;
        self.sets.push(WorkoutSet::new(next, weight, reps));
        &self.sets[self.sets.len() - 1]
    }

    /// Removes the given set and renumbers the remaining ones from 1.
    pub fn remove_set(&mut self, set_number: u32) -> Option<WorkoutSet> {
        let index = self.sets.iter().position(|s| s.set_number == set_number)?;
        let removed = self.sets.remove(index);
        self.sets.sort_by_key(|s| s.set_number);
        for (i, set) in self.sets.iter_mut().enumerate() {
            set.set_number = i as u32 + 1;
        }
        Some(removed)
    }

    pub fn total_volume(&self) -> f64 {
        self.sets.iter().map(WorkoutSet::volume).sum()
    }
}

/// A training session: a type, a date and the exercises performed.
///
/// An `id` of [`Workout::UNSAVED_ID`] means the workout has not been
/// committed yet; the store allocates an id on first save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workout {
    pub id: i64,
    pub workout_type: WorkoutType,
    pub date: NaiveDate,
    #[serde(default)]
    pub exercises: Vec<WorkoutExercise>,
}

/// Reasons a workout cannot be stored as-is.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{exercise}: set {set_number} has an invalid weight ({weight})")]
    InvalidWeight {
        exercise: String,
        set_number: u32,
        weight: f64,
    },

    #[error("{exercise}: set {set_number} must have at least one rep")]
    ZeroReps { exercise: String, set_number: u32 },

    #[error("{exercise}: set numbers must run 1..={expected} without gaps")]
    SetNumbering { exercise: String, expected: usize },
}

impl Workout {
    pub const UNSAVED_ID: i64 = 0;

    pub fn new(workout_type: WorkoutType, date: NaiveDate) -> Self {
        Self {
            id: Self::UNSAVED_ID,
            workout_type,
            date,
            exercises: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = id;
        self
    }

    pub fn with_exercises(mut self, exercises: Vec<WorkoutExercise>) -> Self {
        self.exercises = exercises;
        self
    }

    pub fn is_saved(&self) -> bool {
        self.id != Self::UNSAVED_ID
    }

    /// Adds an exercise entry. An existing entry for the same exercise is
    /// replaced in place.
    pub fn add_exercise(&mut self, entry: WorkoutExercise) {
        match self
            .exercises
            .iter_mut()
            .find(|e| e.exercise.id == entry.exercise.id)
        {
            Some(existing) => *existing = entry,
            None => self.exercises.push(entry),
        }
    }

    pub fn exercise_mut(&mut self, exercise_id: i64) -> Option<&mut WorkoutExercise> {
        self.exercises
            .iter_mut()
            .find(|e| e.exercise.id == exercise_id)
    }

    pub fn remove_exercise(&mut self, exercise_id: i64) -> Option<WorkoutExercise> {
        let index = self
            .exercises
            .iter()
            .position(|e| e.exercise.id == exercise_id)?;
        Some(self.exercises.remove(index))
    }

    /// Collapses entries that share an exercise id. The last entry wins and
    /// takes the position of the first occurrence.
    pub fn dedup_exercises(&mut self) {
        let mut unique: Vec<WorkoutExercise> = Vec::with_capacity(self.exercises.len());
        for entry in self.exercises.drain(..) {
            match unique
                .iter_mut()
                .find(|e| e.exercise.id == entry.exercise.id)
            {
                Some(existing) => *existing = entry,
                None => unique.push(entry),
            }
        }
        self.exercises = unique;
    }

    pub fn total_volume(&self) -> f64 {
        self.exercises.iter().map(WorkoutExercise::total_volume).sum()
    }

    pub fn total_sets(&self) -> usize {
        self.exercises.iter().map(|e| e.sets.len()).sum()
    }

    /// Checks that every weight is finite and non-negative. Non-finite
    /// values serialize to JSON `null`.
    pub fn validate_weights(&self) -> Result<(), ValidationError> {
        for entry in &self.exercises {
            for set in &entry.sets {
                if !set.weight.is_finite() || set.weight < 0.0 {
                    return Err(ValidationError::InvalidWeight {
                        exercise: entry.exercise.name.clone(),
                        set_number: set.set_number,
                        weight: set.weight,
                    });
                }
            }
        }
        Ok(())
    }

    /// Checks set-level invariants: finite non-negative weights, positive
    /// reps, and set numbers dense from 1 within each exercise.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.validate_weights()?;

        for entry in &self.exercises {
            let name = &entry.exercise.name;
            for set in &entry.sets {
                if set.reps == 0 {
                    return Err(ValidationError::ZeroReps {
                        exercise: name.clone(),
                        set_number: set.set_number,
                    });
                }
            }

            let mut numbers: Vec<u32> = entry.sets.iter().map(|s| s.set_number).collect();
            numbers.sort_unstable();
            let dense = numbers
                .iter()
                .enumerate()
                .all(|(i, n)| *n == i as u32 + 1);
            if !dense {
                return Err(ValidationError::SetNumbering {
                    exercise: name.clone(),
                    expected: numbers.len(),
                });
            }
        }
        Ok(())
    }
}

impl fmt::Display for Workout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let title = format!("{} day - {}", self.workout_type, self.date);
        writeln!(f, "{}", title)?;
        writeln!(f, "{}", "=".repeat(title.len()))?;
        if self.is_saved() {
            writeln!(f, "ID: {}", self.id)?;
        }

        for entry in &self.exercises {
            writeln!(f, "\n{}", entry.exercise)?;
            for set in &entry.sets {
                writeln!(f, "  {}", set)?;
            }
            if !entry.sets.is_empty() {
                writeln!(f, "  Volume: {:.1} kg", entry.total_volume())?;
            }
        }

        if !self.exercises.is_empty() {
            writeln!(f, "\nTotal volume: {:.1} kg", self.total_volume())?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ExerciseCategory;

    fn bench() -> Exercise {
        Exercise::new(1, "Bench Press", ExerciseCategory::Chest)
    }

    fn squat() -> Exercise {
        Exercise::new(35, "Squats", ExerciseCategory::Legs)
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    #[test]
    fn test_new_workout_is_unsaved() {
        let workout = Workout::new(WorkoutType::Push, date());
        assert_eq!(workout.id, Workout::UNSAVED_ID);
        assert!(!workout.is_saved());
        assert!(workout.exercises.is_empty());
    }

    #[test]
    fn test_add_set_numbers_sequentially() {
        let mut entry = WorkoutExercise::new(bench());
        entry.add_set(60.0, 10);
        entry.add_set(62.5, 8);
        let third = entry.add_set(65.0, 6).clone();

        assert_eq!(third.set_number, 3);
        let numbers: Vec<u32> = entry.sets.iter().map(|s| s.set_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[test]
    fn test_remove_set_renumbers() {
        let mut entry = WorkoutExercise::new(bench());
        entry.add_set(60.0, 10);
        entry.add_set(62.5, 8);
        entry.add_set(65.0, 6);

        let removed = entry.remove_set(2).unwrap();
        assert_eq!(removed.weight, 62.5);
        assert_eq!(entry.sets.len(), 2);
        assert_eq!(entry.sets[1].set_number, 2);
        assert_eq!(entry.sets[1].weight, 65.0);

        assert!(entry.remove_set(9).is_none());
    }

    #[test]
    fn test_add_exercise_replaces_duplicate() {
        let mut workout = Workout::new(WorkoutType::Push, date());
        workout.add_exercise(
            WorkoutExercise::new(bench()).with_sets(vec![WorkoutSet::new(1, 60.0, 10)]),
        );
        workout.add_exercise(WorkoutExercise::new(squat()));
        workout.add_exercise(
            WorkoutExercise::new(bench()).with_sets(vec![WorkoutSet::new(1, 80.0, 5)]),
        );

        assert_eq!(workout.exercises.len(), 2);
        assert_eq!(workout.exercises[0].exercise.id, 1);
        assert_eq!(workout.exercises[0].sets[0].weight, 80.0);
    }

    #[test]
    fn test_dedup_exercises_last_wins() {
        let mut workout = Workout::new(WorkoutType::Push, date()).with_exercises(vec![
            WorkoutExercise::new(bench()).with_sets(vec![WorkoutSet::new(1, 60.0, 10)]),
            WorkoutExercise::new(squat()),
            WorkoutExercise::new(bench()).with_sets(vec![WorkoutSet::new(1, 70.0, 8)]),
        ]);

        workout.dedup_exercises();

        assert_eq!(workout.exercises.len(), 2);
        assert_eq!(workout.exercises[0].exercise.id, 1);
        assert_eq!(workout.exercises[0].sets[0].weight, 70.0);
        assert_eq!(workout.exercises[1].exercise.id, 35);
    }

    #[test]
    fn test_volume() {
        let workout = Workout::new(WorkoutType::Push, date()).with_exercises(vec![
            WorkoutExercise::new(bench()).with_sets(vec![
                WorkoutSet::new(1, 60.0, 10),
                WorkoutSet::new(2, 70.0, 5),
            ]),
            WorkoutExercise::new(squat()).with_sets(vec![WorkoutSet::new(1, 100.0, 5)]),
        ]);

        assert_eq!(workout.exercises[0].total_volume(), 950.0);
        assert_eq!(workout.total_volume(), 1450.0);
        assert_eq!(workout.total_sets(), 3);
    }

    #[test]
    fn test_validate_accepts_dense_sets() {
        let workout = Workout::new(WorkoutType::Push, date()).with_exercises(vec![
            WorkoutExercise::new(bench()).with_sets(vec![
                WorkoutSet::new(2, 70.0, 5),
                WorkoutSet::new(1, 60.0, 10),
            ]),
        ]);
        assert!(workout.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_gaps_and_bad_values() {
        let gap = Workout::new(WorkoutType::Push, date()).with_exercises(vec![
            WorkoutExercise::new(bench()).with_sets(vec![
                WorkoutSet::new(1, 60.0, 10),
                WorkoutSet::new(3, 60.0, 10),
            ]),
        ]);
        assert!(matches!(
            gap.validate(),
            Err(ValidationError::SetNumbering { .. })
        ));

        let negative = Workout::new(WorkoutType::Push, date()).with_exercises(vec![
            WorkoutExercise::new(bench()).with_sets(vec![WorkoutSet::new(1, -5.0, 10)]),
        ]);
        assert!(matches!(
            negative.validate(),
            Err(ValidationError::InvalidWeight { .. })
        ));

        let no_reps = Workout::new(WorkoutType::Push, date()).with_exercises(vec![
            WorkoutExercise::new(bench()).with_sets(vec![WorkoutSet::new(1, 60.0, 0)]),
        ]);
        assert!(matches!(
            no_reps.validate(),
            Err(ValidationError::ZeroReps { .. })
        ));
    }

    #[test]
    fn test_validate_weights_ignores_set_numbering() {
        let partial = Workout::new(WorkoutType::Push, date()).with_exercises(vec![
            WorkoutExercise::new(bench()).with_sets(vec![WorkoutSet::new(2, 60.0, 0)]),
        ]);
        assert!(partial.validate_weights().is_ok());

        let infinite = Workout::new(WorkoutType::Push, date()).with_exercises(vec![
            WorkoutExercise::new(bench()).with_sets(vec![WorkoutSet::new(1, f64::INFINITY, 5)]),
        ]);
        assert!(matches!(
            infinite.validate_weights(),
            Err(ValidationError::InvalidWeight { set_number: 1, .. })
        ));
    }

    #[test]
    fn test_workout_display() {
        let workout = Workout::new(WorkoutType::Push, date())
            .with_id(7)
            .with_exercises(vec![
                WorkoutExercise::new(bench()).with_sets(vec![WorkoutSet::new(1, 60.0, 10)])
            ]);

        let output = format!("{}", workout);
        assert!(output.contains("Push day - 2024-01-01"));
        assert!(output.contains("ID: 7"));
        assert!(output.contains("Bench Press"));
        assert!(output.contains("Set 1: 60.0 kg x 10 reps"));
    }

    #[test]
    fn test_workout_json_roundtrip() {
        let workout = Workout::new(WorkoutType::Legs, date()).with_exercises(vec![
            WorkoutExercise::new(squat()).with_sets(vec![WorkoutSet::new(1, 100.0, 5)]),
        ]);

        let json = serde_json::to_string(&workout).unwrap();
        let parsed: Workout = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, workout);
    }
}

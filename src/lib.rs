//! gymlog
//!
//! Local persistence for strength-training workouts: committed workouts with
//! their exercises and sets, auto-saved drafts of in-progress sessions, the
//! custom exercise library and a body-weight log, all behind [`Gateway`].

pub mod catalog;
pub mod config;
pub mod db;
pub mod gateway;
pub mod models;
pub mod progress;

pub use db::{StorageError, StorageResult};
pub use gateway::Gateway;
pub use models::{
    Exercise, ExerciseCategory, ValidationError, WeightEntry, Workout, WorkoutExercise,
    WorkoutSet, WorkoutType,
};
pub use progress::{ExerciseProgress, WeightSummary};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}

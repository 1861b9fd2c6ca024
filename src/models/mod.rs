mod exercise;
mod weight_entry;
mod workout;
mod workout_type;

pub use exercise::{Exercise, ExerciseCategory};
pub use weight_entry::WeightEntry;
pub use workout::{ValidationError, Workout, WorkoutExercise, WorkoutSet};
pub use workout_type::WorkoutType;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Training split a workout belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum WorkoutType {
    Push,
    Pull,
    Legs,
}

impl WorkoutType {
    pub const ALL: [WorkoutType; 3] = [WorkoutType::Push, WorkoutType::Pull, WorkoutType::Legs];

    /// Canonical form stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkoutType::Push => "PUSH",
            WorkoutType::Pull => "PULL",
            WorkoutType::Legs => "LEGS",
        }
    }
}

impl fmt::Display for WorkoutType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkoutType::Push => write!(f, "Push"),
            WorkoutType::Pull => write!(f, "Pull"),
            WorkoutType::Legs => write!(f, "Legs"),
        }
    }
}

impl FromStr for WorkoutType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "push" => Ok(WorkoutType::Push),
            "pull" => Ok(WorkoutType::Pull),
            "legs" => Ok(WorkoutType::Legs),
            _ => Err(format!(
                "Invalid workout type '{}'. Valid options: push, pull, legs",
                s
            )),
        }
    }
}

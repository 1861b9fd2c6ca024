use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Muscle group an exercise is filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ExerciseCategory {
    Chest,
    Shoulders,
    Triceps,
    Back,
    Biceps,
    Legs,
}

impl ExerciseCategory {
    pub const ALL: [ExerciseCategory; 6] = [
        ExerciseCategory::Chest,
        ExerciseCategory::Shoulders,
        ExerciseCategory::Triceps,
        ExerciseCategory::Back,
        ExerciseCategory::Biceps,
        ExerciseCategory::Legs,
    ];

    /// Canonical form stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            ExerciseCategory::Chest => "CHEST",
            ExerciseCategory::Shoulders => "SHOULDERS",
            ExerciseCategory::Triceps => "TRICEPS",
            ExerciseCategory::Back => "BACK",
            ExerciseCategory::Biceps => "BICEPS",
            ExerciseCategory::Legs => "LEGS",
        }
    }
}

impl fmt::Display for ExerciseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExerciseCategory::Chest => write!(f, "chest"),
            ExerciseCategory::Shoulders => write!(f, "shoulders"),
            ExerciseCategory::Triceps => write!(f, "triceps"),
            ExerciseCategory::Back => write!(f, "back"),
            ExerciseCategory::Biceps => write!(f, "biceps"),
            ExerciseCategory::Legs => write!(f, "legs"),
        }
    }
}

impl FromStr for ExerciseCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "chest" => Ok(ExerciseCategory::Chest),
            "shoulders" => Ok(ExerciseCategory::Shoulders),
            "triceps" => Ok(ExerciseCategory::Triceps),
            "back" => Ok(ExerciseCategory::Back),
            "biceps" => Ok(ExerciseCategory::Biceps),
            "legs" => Ok(ExerciseCategory::Legs),
            _ => Err(format!(
                "Invalid exercise category '{}'. Valid options: chest, shoulders, triceps, back, biceps, legs",
                s
            )),
        }
    }
}

/// An entry of the exercise library, either built in or user defined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: i64,
    pub name: String,
    pub category: ExerciseCategory,
    #[serde(default)]
    pub is_custom: bool,
}

impl Exercise {
    pub fn new(id: i64, name: impl Into<String>, category: ExerciseCategory) -> Self {
        Self {
            id,
            name: name.into(),
            category,
            is_custom: false,
        }
    }

    pub fn custom(id: i64, name: impl Into<String>, category: ExerciseCategory) -> Self {
        Self {
            is_custom: true,
            ..Self::new(id, name, category)
        }
    }
}

impl fmt::Display for Exercise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.category)?;
        if self.is_custom {
            write!(f, " [custom]")?;
        }
        Ok(())
    }
}

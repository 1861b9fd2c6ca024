//! Built-in exercise library.
//!
//! Built-in exercises have fixed ids below [`CUSTOM_EXERCISE_ID_BASE`];
//! custom exercises created by the user are numbered above it by the store.

use crate::models::{Exercise, ExerciseCategory};
use ExerciseCategory::*;

/// Custom exercise ids are allocated strictly above this value.
pub const CUSTOM_EXERCISE_ID_BASE: i64 = 1000;

const BUILTIN: &[(i64, &str, ExerciseCategory)] = &[
    (1, "Bench Press", Chest),
    (2, "Incline Bench Press", Chest),
    (3, "Decline Bench Press", Chest),
    (4, "Dumbbell Flyes", Chest),
    (5, "Push-Ups", Chest),
    (6, "Cable Flyes", Chest),
    (7, "Dumbbell Press", Chest),
    (8, "Military Press", Shoulders),
    (9, "Lateral Raises", Shoulders),
    (10, "Front Raises", Shoulders),
    (11, "Rear Delt Flyes", Shoulders),
    (12, "Face Pulls", Shoulders),
    (13, "Upright Rows", Shoulders),
    (14, "Arnold Press", Shoulders),
    (15, "Tricep Pushdown", Triceps),
    (16, "Skull Crushers", Triceps),
    (17, "Overhead Tricep Extension", Triceps),
    (18, "Diamond Push-Ups", Triceps),
    (19, "Tricep Dips", Triceps),
    (20, "Close Grip Bench Press", Triceps),
    (21, "Pull-Ups", Back),
    (22, "Lat Pulldown", Back),
    (23, "Barbell Rows", Back),
    (24, "Dumbbell Rows", Back),
    (25, "Seated Cable Rows", Back),
    (26, "T-Bar Rows", Back),
    (27, "Deadlift", Back),
    (28, "Barbell Curls", Biceps),
    (29, "Dumbbell Curls", Biceps),
    (30, "Hammer Curls", Biceps),
    (31, "Preacher Curls", Biceps),
    (32, "Concentration Curls", Biceps),
    (33, "Cable Curls", Biceps),
    (34, "Incline Dumbbell Curls", Biceps),
    (35, "Squats", Legs),
    (36, "Leg Press", Legs),
    (37, "Romanian Deadlift", Legs),
    (38, "Leg Extensions", Legs),
    (39, "Leg Curls", Legs),
    (40, "Calf Raises", Legs),
    (41, "Lunges", Legs),
    (42, "Bulgarian Split Squats", Legs),
];

pub fn builtin_exercises() -> Vec<Exercise> {
    BUILTIN
        .iter()
        .map(|(id, name, category)| Exercise::new(*id, *name, *category))
        .collect()
}

pub fn find_builtin(id: i64) -> Option<Exercise> {
    BUILTIN
        .iter()
        .find(|(builtin_id, _, _)| *builtin_id == id)
        .map(|(id, name, category)| Exercise::new(*id, *name, *category))
}

/// Looks up an exercise by name (case-insensitive) among the built-in
/// entries and the given custom ones.
pub fn find_by_name<'a>(
    name: &str,
    custom: impl IntoIterator<Item = &'a Exercise>,
) -> Option<Exercise> {
    let needle = name.trim().to_lowercase();
    BUILTIN
        .iter()
        .find(|(_, builtin_name, _)| builtin_name.to_lowercase() == needle)
        .map(|(id, name, category)| Exercise::new(*id, *name, *category))
        .or_else(|| {
            custom
                .into_iter()
                .find(|e| e.name.to_lowercase() == needle)
                .cloned()
        })
}

/// Built-in exercises followed by custom ones, optionally filtered by category.
pub fn library(custom: &[Exercise], category: Option<ExerciseCategory>) -> Vec<Exercise> {
    builtin_exercises()
        .into_iter()
        .chain(custom.iter().cloned())
        .filter(|e| category.map_or(true, |c| e.category == c))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_ids_are_unique_and_below_custom_base() {
        let exercises = builtin_exercises();
        assert_eq!(exercises.len(), 42);

        let mut ids: Vec<i64> = exercises.iter().map(|e| e.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 42);
        assert!(ids.iter().all(|id| *id > 0 && *id < CUSTOM_EXERCISE_ID_BASE));
        assert!(exercises.iter().all(|e| !e.is_custom));
    }

    #[test]
    fn test_every_category_has_exercises() {
        for category in ExerciseCategory::ALL {
            assert!(!library(&[], Some(category)).is_empty());
        }
    }

    #[test]
    fn test_find_builtin() {
        let bench = find_builtin(1).unwrap();
        assert_eq!(bench.name, "Bench Press");
        assert_eq!(bench.category, ExerciseCategory::Chest);
        assert!(find_builtin(999).is_none());
    }

    #[test]
    fn test_find_by_name_checks_custom() {
        let custom = vec![Exercise::custom(
            1001,
            "Landmine Press",
            ExerciseCategory::Shoulders,
        )];

        assert_eq!(find_by_name("bench press", &custom).unwrap().id, 1);
        assert_eq!(find_by_name("LANDMINE PRESS", &custom).unwrap().id, 1001);
        assert!(find_by_name("Sled Push", &custom).is_none());
    }

    #[test]
    fn test_library_includes_custom() {
        let custom = vec![Exercise::custom(1001, "Landmine Press", ExerciseCategory::Shoulders)];
        let all = library(&custom, None);
        assert_eq!(all.len(), 43);

        let chest = library(&custom, Some(ExerciseCategory::Chest));
        assert!(chest.iter().all(|e| e.category == ExerciseCategory::Chest));
    }
}

use sqlx::{Sqlite, SqlitePool, Transaction};
use std::collections::HashMap;
use std::sync::Arc;

use super::changes::{ChangeHub, Table};
use super::{date_to_days, days_to_date, decode_enum, Context, StorageResult};
use crate::catalog::CUSTOM_EXERCISE_ID_BASE;
use crate::models::{Exercise, Workout, WorkoutExercise, WorkoutSet};

/// Committed workouts, stored across `workouts`, `workout_exercises` and
/// `workout_sets`.
#[derive(Clone)]
pub struct WorkoutRepository {
    pool: SqlitePool,
    hub: Arc<ChangeHub>,
}

// Row types for database queries
#[derive(sqlx::FromRow)]
struct WorkoutRow {
    id: i64,
    workout_type: String,
    date: i64,
}

#[derive(sqlx::FromRow)]
struct WorkoutExerciseRow {
    id: i64,
    workout_id: i64,
    exercise_id: i64,
    exercise_name: String,
    exercise_category: String,
}

#[derive(sqlx::FromRow)]
struct WorkoutSetRow {
    workout_exercise_id: i64,
    set_number: i64,
    weight: f64,
    reps: i64,
}

impl WorkoutRepository {
    pub fn new(pool: SqlitePool, hub: Arc<ChangeHub>) -> Self {
        Self { pool, hub }
    }

    /// Inserts or fully replaces a workout and returns its effective id.
    ///
    /// An unsaved workout (id 0) gets a freshly allocated id. For a saved
    /// one, every existing exercise and set row is deleted and rewritten
    /// from `workout`. Entries sharing an exercise id are collapsed, the
    /// last one winning. Any draft stored under the incoming or resulting id
    /// is cleared. All of it commits as one transaction.
    pub async fn upsert(&self, workout: &Workout) -> StorageResult<i64> {
        workout.validate().during("upsert workout")?;

        let mut workout = workout.clone();
        workout.dedup_exercises();

        let (id, draft_cleared) = self.upsert_rows(&workout).await.during("upsert workout")?;

        tracing::info!(
            "Saved workout {} ({} exercise(s), {} set(s))",
            id,
            workout.exercises.len(),
            workout.total_sets()
        );
        self.hub.notify(Table::Workouts);
        if draft_cleared {
            self.hub.notify(Table::Drafts);
        }
        Ok(id)
    }

    /// Returns the workout id and whether a draft row was removed.
    async fn upsert_rows(&self, workout: &Workout) -> Result<(i64, bool), sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        let date = date_to_days(workout.date);

        let id = if workout.is_saved() {
            Self::delete_children(&mut tx, workout.id).await?;

            sqlx::query(
                r#"
                INSERT INTO workouts (id, type, date) VALUES (?, ?, ?)
                ON CONFLICT(id) DO UPDATE SET type = excluded.type, date = excluded.date
                "#,
            )
            .bind(workout.id)
            .bind(workout.workout_type.as_str())
            .bind(date)
            .execute(&mut *tx)
            .await?;

            workout.id
        } else {
            sqlx::query("INSERT INTO workouts (type, date) VALUES (?, ?)")
                .bind(workout.workout_type.as_str())
                .bind(date)
                .execute(&mut *tx)
                .await?
                .last_insert_rowid()
        };

        for entry in &workout.exercises {
            let workout_exercise_id = sqlx::query(
                r#"
                INSERT INTO workout_exercises (workout_id, exercise_id, exercise_name, exercise_category)
                VALUES (?, ?, ?, ?)
                "#,
            )
            .bind(id)
            .bind(entry.exercise.id)
            .bind(&entry.exercise.name)
            .bind(entry.exercise.category.as_str())
            .execute(&mut *tx)
            .await?
            .last_insert_rowid();

            for set in &entry.sets {
                sqlx::query(
                    r#"
                    INSERT INTO workout_sets (workout_id, workout_exercise_id, set_number, weight, reps)
                    VALUES (?, ?, ?, ?, ?)
                    "#,
                )
                .bind(id)
                .bind(workout_exercise_id)
                .bind(i64::from(set.set_number))
                .bind(set.weight)
                .bind(i64::from(set.reps))
                .execute(&mut *tx)
                .await?;
            }
        }

        // A committed workout supersedes its draft
        let drafts = sqlx::query("DELETE FROM workout_progress WHERE id = ? OR id = ?")
            .bind(workout.id)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok((id, drafts.rows_affected() > 0))
    }

    async fn delete_children(
        tx: &mut Transaction<'_, Sqlite>,
        workout_id: i64,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM workout_sets WHERE workout_id = ?")
            .bind(workout_id)
            .execute(&mut **tx)
            .await?;
        sqlx::query("DELETE FROM workout_exercises WHERE workout_id = ?")
            .bind(workout_id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    /// Removes a workout with all of its exercises and sets. Deleting an id
    /// that does not exist succeeds and changes nothing.
    pub async fn delete(&self, id: i64) -> StorageResult<()> {
        let removed = self.delete_rows(id).await.during("delete workout")?;

        if removed {
            tracing::info!("Deleted workout {}", id);
            self.hub.notify(Table::Workouts);
        } else {
            tracing::debug!("Workout {} not found, nothing to delete", id);
        }
        Ok(())
    }

    async fn delete_rows(&self, id: i64) -> Result<bool, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        Self::delete_children(&mut tx, id).await?;
        let result = sqlx::query("DELETE FROM workouts WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn get_by_id(&self, id: i64) -> StorageResult<Option<Workout>> {
        self.fetch_one(id).await.during("get workout")
    }

    async fn fetch_one(&self, id: i64) -> Result<Option<Workout>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let row: Option<WorkoutRow> =
            sqlx::query_as("SELECT id, type AS workout_type, date FROM workouts WHERE id = ?")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;

        let row = match row {
            Some(row) => row,
            None => return Ok(None),
        };

        let exercises: Vec<WorkoutExerciseRow> = sqlx::query_as(
            "SELECT id, workout_id, exercise_id, exercise_name, exercise_category FROM workout_exercises WHERE workout_id = ? ORDER BY id",
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;

        let sets: Vec<WorkoutSetRow> = sqlx::query_as(
            "SELECT workout_exercise_id, set_number, weight, reps FROM workout_sets WHERE workout_id = ? ORDER BY workout_exercise_id, set_number",
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        let mut workouts = hydrate(vec![row], exercises, sets)?;
        Ok(workouts.pop())
    }

    /// All committed workouts, most recent date first.
    pub async fn list(&self) -> StorageResult<Vec<Workout>> {
        self.fetch_all().await.during("list workouts")
    }

    async fn fetch_all(&self) -> Result<Vec<Workout>, sqlx::Error> {
        // One read transaction so the three queries see the same snapshot
        let mut tx = self.pool.begin().await?;

        let rows: Vec<WorkoutRow> = sqlx::query_as(
            "SELECT id, type AS workout_type, date FROM workouts ORDER BY date DESC, id DESC",
        )
        .fetch_all(&mut *tx)
        .await?;

        let exercises: Vec<WorkoutExerciseRow> = sqlx::query_as(
            "SELECT id, workout_id, exercise_id, exercise_name, exercise_category FROM workout_exercises ORDER BY workout_id, id",
        )
        .fetch_all(&mut *tx)
        .await?;

        let sets: Vec<WorkoutSetRow> = sqlx::query_as(
            "SELECT workout_exercise_id, set_number, weight, reps FROM workout_sets ORDER BY workout_exercise_id, set_number",
        )
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        hydrate(rows, exercises, sets)
    }
}

/// Rebuilds nested workouts from rows. `rows` order is kept; exercise and
/// set rows are expected in id and set-number order respectively.
fn hydrate(
    rows: Vec<WorkoutRow>,
    exercise_rows: Vec<WorkoutExerciseRow>,
    set_rows: Vec<WorkoutSetRow>,
) -> Result<Vec<Workout>, sqlx::Error> {
    let mut sets_by_exercise: HashMap<i64, Vec<WorkoutSet>> = HashMap::new();
    for set in set_rows {
        sets_by_exercise
            .entry(set.workout_exercise_id)
            .or_default()
            .push(WorkoutSet::new(
                to_u32(set.set_number)?,
                set.weight,
                to_u32(set.reps)?,
            ));
    }

    let mut exercises_by_workout: HashMap<i64, Vec<WorkoutExercise>> = HashMap::new();
    for row in exercise_rows {
        let exercise = Exercise {
            id: row.exercise_id,
            name: row.exercise_name,
            category: decode_enum(&row.exercise_category)?,
            is_custom: row.exercise_id > CUSTOM_EXERCISE_ID_BASE,
        };
        let sets = sets_by_exercise.remove(&row.id).unwrap_or_default();
        exercises_by_workout
            .entry(row.workout_id)
            .or_default()
            .push(WorkoutExercise::new(exercise).with_sets(sets));
    }

    rows.into_iter()
        .map(|row| -> Result<Workout, sqlx::Error> {
            Ok(Workout {
                id: row.id,
                workout_type: decode_enum(&row.workout_type)?,
                date: days_to_date(row.date)?,
                exercises: exercises_by_workout.remove(&row.id).unwrap_or_default(),
            })
        })
        .collect()
}

fn to_u32(value: i64) -> Result<u32, sqlx::Error> {
    u32::try_from(value).map_err(|e| sqlx::Error::Decode(e.into()))
}

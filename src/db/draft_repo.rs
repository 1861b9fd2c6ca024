use sqlx::SqlitePool;
use std::sync::Arc;

use super::changes::{ChangeHub, Table};
use super::{date_to_days, days_to_date, decode_enum, Context, StorageResult};
use crate::models::{Workout, WorkoutExercise};

/// Auto-saved snapshots of in-progress workouts, keyed by workout id.
///
/// Drafts live in their own table with the exercise list serialized as
/// JSON. They never show up among committed workouts.
#[derive(Clone)]
pub struct DraftRepository {
    pool: SqlitePool,
    hub: Arc<ChangeHub>,
}

#[derive(sqlx::FromRow)]
struct DraftRow {
    id: i64,
    workout_type: String,
    date: i64,
    exercises: String,
}

impl DraftRow {
    fn into_workout(self) -> Result<Workout, sqlx::Error> {
        let exercises: Vec<WorkoutExercise> = serde_json::from_str(&self.exercises)
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;

        Ok(Workout {
            id: self.id,
            workout_type: decode_enum(&self.workout_type)?,
            date: days_to_date(self.date)?,
            exercises,
        })
    }
}

impl DraftRepository {
    pub fn new(pool: SqlitePool, hub: Arc<ChangeHub>) -> Self {
        Self { pool, hub }
    }

    /// Stores `workout` as the draft for its id, replacing any earlier one.
    ///
    /// Drafts may be incomplete, but every weight must be a finite
    /// non-negative number.
    pub async fn save(&self, workout: &Workout) -> StorageResult<()> {
        workout.validate_weights().during("save draft")?;
        let exercises = serde_json::to_string(&workout.exercises).during("save draft")?;

        sqlx::query(
            r#"
            INSERT INTO workout_progress (id, type, date, exercises) VALUES (?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET type = excluded.type, date = excluded.date, exercises = excluded.exercises
            "#,
        )
        .bind(workout.id)
        .bind(workout.workout_type.as_str())
        .bind(date_to_days(workout.date))
        .bind(&exercises)
        .execute(&self.pool)
        .await
        .during("save draft")?;

        tracing::debug!("Saved draft for workout {}", workout.id);
        self.hub.notify(Table::Drafts);
        Ok(())
    }

    pub async fn load(&self, id: i64) -> StorageResult<Option<Workout>> {
        let row: Option<DraftRow> = sqlx::query_as(
            "SELECT id, type AS workout_type, date, exercises FROM workout_progress WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .during("load draft")?;

        row.map(DraftRow::into_workout)
            .transpose()
            .during("load draft")
    }

    /// Every stored draft, most recent date first.
    pub async fn list(&self) -> StorageResult<Vec<Workout>> {
        let rows: Vec<DraftRow> = sqlx::query_as(
            "SELECT id, type AS workout_type, date, exercises FROM workout_progress ORDER BY date DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await
        .during("list drafts")?;

        rows.into_iter()
            .map(DraftRow::into_workout)
            .collect::<Result<Vec<_>, _>>()
            .during("list drafts")
    }

    /// Drops the draft for `id`. Clearing a missing draft is a no-op.
    pub async fn clear(&self, id: i64) -> StorageResult<()> {
        let result = sqlx::query("DELETE FROM workout_progress WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .during("clear draft")?;

        if result.rows_affected() > 0 {
            tracing::debug!("Cleared draft for workout {}", id);
            self.hub.notify(Table::Drafts);
        }
        Ok(())
    }
}

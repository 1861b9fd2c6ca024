use sqlx::SqlitePool;
use std::sync::Arc;

use super::changes::{ChangeHub, Table};
use super::{decode_enum, Context, StorageResult};
use crate::models::{Exercise, ExerciseCategory};

/// User-defined entries of the exercise library.
#[derive(Clone)]
pub struct CustomExerciseRepository {
    pool: SqlitePool,
    hub: Arc<ChangeHub>,
}

#[derive(sqlx::FromRow)]
struct CustomExerciseRow {
    id: i64,
    name: String,
    category: String,
}

impl CustomExerciseRow {
    fn into_exercise(self) -> Result<Exercise, sqlx::Error> {
        Ok(Exercise::custom(
            self.id,
            self.name,
            decode_enum(&self.category)?,
        ))
    }
}

impl CustomExerciseRepository {
    pub fn new(pool: SqlitePool, hub: Arc<ChangeHub>) -> Self {
        Self { pool, hub }
    }

    /// Adds a custom exercise. Names are unique by convention only; check
    /// [`Self::name_exists`] first.
    pub async fn create(&self, name: &str, category: ExerciseCategory) -> StorageResult<Exercise> {
        let id = sqlx::query("INSERT INTO custom_exercises (name, category) VALUES (?, ?)")
            .bind(name)
            .bind(category.as_str())
            .execute(&self.pool)
            .await
            .during("create custom exercise")?
            .last_insert_rowid();

        tracing::info!("Created custom exercise {} ({})", name, id);
        self.hub.notify(Table::CustomExercises);
        Ok(Exercise::custom(id, name, category))
    }

    pub async fn get_by_id(&self, id: i64) -> StorageResult<Option<Exercise>> {
        let row: Option<CustomExerciseRow> =
            sqlx::query_as("SELECT id, name, category FROM custom_exercises WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .during("get custom exercise")?;

        row.map(CustomExerciseRow::into_exercise)
            .transpose()
            .during("get custom exercise")
    }

    pub async fn list(&self) -> StorageResult<Vec<Exercise>> {
        let rows: Vec<CustomExerciseRow> =
            sqlx::query_as("SELECT id, name, category FROM custom_exercises ORDER BY name, id")
                .fetch_all(&self.pool)
                .await
                .during("list custom exercises")?;

        rows.into_iter()
            .map(CustomExerciseRow::into_exercise)
            .collect::<Result<Vec<_>, _>>()
            .during("list custom exercises")
    }

    /// Case-sensitive check for an existing custom exercise name.
    pub async fn name_exists(&self, name: &str) -> StorageResult<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM custom_exercises WHERE name = ?)")
            .bind(name)
            .fetch_one(&self.pool)
            .await
            .during("check exercise name")
    }

    /// Removes a custom exercise from the library. Workouts that used it
    /// keep their copy of its name and category.
    pub async fn delete(&self, id: i64) -> StorageResult<()> {
        let result = sqlx::query("DELETE FROM custom_exercises WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .during("delete custom exercise")?;

        if result.rows_affected() > 0 {
            tracing::info!("Deleted custom exercise {}", id);
            self.hub.notify(Table::CustomExercises);
        }
        Ok(())
    }
}

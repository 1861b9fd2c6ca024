mod changes;
mod draft_repo;
mod error;
mod exercise_repo;
mod weight_repo;
mod workout_repo;

pub use changes::{ChangeHub, Table};
pub use draft_repo::DraftRepository;
pub use error::{BoxError, StorageError, StorageResult};
pub use exercise_repo::CustomExerciseRepository;
pub use weight_repo::WeightRepository;
pub use workout_repo::WorkoutRepository;

pub(crate) use error::Context;

use chrono::{Datelike, NaiveDate};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;

/// Initialize the database connection pool and run migrations
pub async fn init_db(db_path: &Path) -> StorageResult<SqlitePool> {
    // Ensure parent directory exists
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent).during("create database directory")?;
    }

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .foreign_keys(true)
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .during("open database")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .during("run migrations")?;

    tracing::debug!("Database ready at {}", db_path.display());
    Ok(pool)
}

/// `NaiveDate::num_days_from_ce` of 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Dates are stored as a day count since 1970-01-01.
pub(crate) fn date_to_days(date: NaiveDate) -> i64 {
    i64::from(date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE)
}

pub(crate) fn days_to_date(days: i64) -> Result<NaiveDate, sqlx::Error> {
    i32::try_from(days)
        .ok()
        .and_then(|d| d.checked_add(UNIX_EPOCH_DAYS_FROM_CE))
        .and_then(NaiveDate::from_num_days_from_ce_opt)
        .ok_or_else(|| sqlx::Error::Decode(format!("day count {} is out of range", days).into()))
}

/// Maps text stored in an enum column back to its Rust type.
pub(crate) fn decode_enum<T>(value: &str) -> Result<T, sqlx::Error>
where
    T: std::str::FromStr<Err = String>,
{
    value.parse::<T>().map_err(|e| sqlx::Error::Decode(e.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_init_db_creates_tables() {
        let temp_dir = tempdir().unwrap();
        let db_path = temp_dir.path().join("nested").join("test.db");

        let pool = init_db(&db_path).await.unwrap();

        // Verify tables exist
        let tables: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' AND name NOT LIKE '_sqlx_%' ORDER BY name",
        )
        .fetch_all(&pool)
        .await
        .unwrap();

        let table_names: Vec<&str> = tables.iter().map(|t| t.0.as_str()).collect();
        assert!(table_names.contains(&"workouts"));
        assert!(table_names.contains(&"workout_exercises"));
        assert!(table_names.contains(&"workout_sets"));
        assert!(table_names.contains(&"custom_exercises"));
        assert!(table_names.contains(&"workout_progress"));
        assert!(table_names.contains(&"body_weights"));
    }

    #[tokio::test]
    async fn test_init_db_is_reentrant() {
        let temp_dir = tempdir().unwrap();
        let db_path = temp_dir.path().join("test.db");

        let pool = init_db(&db_path).await.unwrap();
        pool.close().await;

        assert!(init_db(&db_path).await.is_ok());
    }

    #[test]
    fn test_day_count_conversion() {
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
        assert_eq!(date_to_days(epoch), 0);

        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(date_to_days(date), 19_723);
        assert_eq!(days_to_date(19_723).unwrap(), date);

        let before_epoch = NaiveDate::from_ymd_opt(1969, 12, 31).unwrap();
        assert_eq!(date_to_days(before_epoch), -1);
        assert_eq!(days_to_date(-1).unwrap(), before_epoch);
    }

    #[test]
    fn test_day_count_out_of_range() {
        assert!(days_to_date(i64::MAX).is_err());
    }
}

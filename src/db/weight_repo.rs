use chrono::NaiveDate;
use sqlx::SqlitePool;
use std::sync::Arc;

use super::changes::{ChangeHub, Table};
use super::{date_to_days, days_to_date, Context, StorageResult};
use crate::models::WeightEntry;

/// Body-weight log.
#[derive(Clone)]
pub struct WeightRepository {
    pool: SqlitePool,
    hub: Arc<ChangeHub>,
}

#[derive(sqlx::FromRow)]
struct WeightRow {
    id: i64,
    date: i64,
    weight: f64,
}

impl WeightRow {
    fn into_entry(self) -> Result<WeightEntry, sqlx::Error> {
        Ok(WeightEntry {
            id: self.id,
            date: days_to_date(self.date)?,
            weight: self.weight,
        })
    }
}

impl WeightRepository {
    pub fn new(pool: SqlitePool, hub: Arc<ChangeHub>) -> Self {
        Self { pool, hub }
    }

    pub async fn create(&self, date: NaiveDate, weight: f64) -> StorageResult<WeightEntry> {
        let id = sqlx::query("INSERT INTO body_weights (date, weight) VALUES (?, ?)")
            .bind(date_to_days(date))
            .bind(weight)
            .execute(&self.pool)
            .await
            .during("log weight")?
            .last_insert_rowid();

        tracing::info!("Logged body weight {:.1} kg on {}", weight, date);
        self.hub.notify(Table::BodyWeights);
        Ok(WeightEntry { id, date, weight })
    }

    /// All entries, most recent first.
    pub async fn list(&self) -> StorageResult<Vec<WeightEntry>> {
        let rows: Vec<WeightRow> =
            sqlx::query_as("SELECT id, date, weight FROM body_weights ORDER BY date DESC, id DESC")
                .fetch_all(&self.pool)
                .await
                .during("list weights")?;

        rows.into_iter()
            .map(WeightRow::into_entry)
            .collect::<Result<Vec<_>, _>>()
            .during("list weights")
    }

    pub async fn delete(&self, id: i64) -> StorageResult<()> {
        let result = sqlx::query("DELETE FROM body_weights WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .during("delete weight")?;

        if result.rows_affected() > 0 {
            self.hub.notify(Table::BodyWeights);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_db;
    use tempfile::TempDir;

    struct TestContext {
        repo: WeightRepository,
        _temp_dir: TempDir, // Keep alive for duration of test
    }

    async fn setup_repo() -> TestContext {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let pool = init_db(&db_path).await.unwrap();
        TestContext {
            repo: WeightRepository::new(pool, Arc::new(ChangeHub::new())),
            _temp_dir: temp_dir,
        }
    }

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_log_and_list_weights() {
        let ctx = setup_repo().await;
        let repo = &ctx.repo;

        repo.create(date(1, 1), 82.4).await.unwrap();
        repo.create(date(1, 8), 81.9).await.unwrap();
        repo.create(date(1, 4), 82.0).await.unwrap();

        let entries = repo.list().await.unwrap();
        let dates: Vec<NaiveDate> = entries.iter().map(|e| e.date).collect();
        assert_eq!(dates, vec![date(1, 8), date(1, 4), date(1, 1)]);
        assert_eq!(entries[0].weight, 81.9);
    }

    #[tokio::test]
    async fn test_non_positive_weight_rejected() {
        let ctx = setup_repo().await;
        let err = ctx.repo.create(date(1, 1), 0.0).await.unwrap_err();
        assert_eq!(err.operation(), "log weight");
    }

    #[tokio::test]
    async fn test_delete_weight() {
        let ctx = setup_repo().await;
        let repo = &ctx.repo;

        let entry = repo.create(date(2, 1), 80.0).await.unwrap();
        repo.delete(entry.id).await.unwrap();
        repo.delete(entry.id).await.unwrap();

        assert!(repo.list().await.unwrap().is_empty());
    }
}

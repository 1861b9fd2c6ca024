//! Persistence gateway.
//!
//! [`Gateway`] is the single entry point the application uses to read and
//! write its data. It is constructed explicitly by whoever owns the
//! application lifecycle and shares one connection pool and one
//! [`ChangeHub`] between the repositories. Every operation returns a
//! [`StorageResult`]; watch streams wrap each emitted snapshot the same way.

use chrono::NaiveDate;
use futures::stream::BoxStream;
use sqlx::SqlitePool;
use std::path::Path;
use std::sync::Arc;

use crate::catalog;
use crate::db::{
    init_db, ChangeHub, CustomExerciseRepository, DraftRepository, StorageResult, Table,
    WeightRepository, WorkoutRepository,
};
use crate::models::{Exercise, ExerciseCategory, WeightEntry, Workout};
use crate::progress::{self, ExerciseProgress, WeightSummary};

pub struct Gateway {
    pool: SqlitePool,
    hub: Arc<ChangeHub>,
    workouts: WorkoutRepository,
    drafts: DraftRepository,
    exercises: CustomExerciseRepository,
    weights: WeightRepository,
}

impl Gateway {
    /// Opens (creating if needed) the database at `path` and migrates it.
    pub async fn open(path: &Path) -> StorageResult<Self> {
        let pool = init_db(path).await?;
        Ok(Self::new(pool))
    }

    /// Wraps an already migrated pool.
    pub fn new(pool: SqlitePool) -> Self {
        let hub = Arc::new(ChangeHub::new());
        Self {
            workouts: WorkoutRepository::new(pool.clone(), hub.clone()),
            drafts: DraftRepository::new(pool.clone(), hub.clone()),
            exercises: CustomExerciseRepository::new(pool.clone(), hub.clone()),
            weights: WeightRepository::new(pool.clone(), hub.clone()),
            pool,
            hub,
        }
    }

    /// Waits for in-flight queries and closes the pool.
    pub async fn close(self) {
        self.pool.close().await;
    }

    // Workouts

    pub async fn upsert_workout(&self, workout: &Workout) -> StorageResult<i64> {
        self.workouts.upsert(workout).await
    }

    pub async fn delete_workout(&self, id: i64) -> StorageResult<()> {
        self.workouts.delete(id).await
    }

    pub async fn get_workout(&self, id: i64) -> StorageResult<Option<Workout>> {
        self.workouts.get_by_id(id).await
    }

    pub async fn list_workouts(&self) -> StorageResult<Vec<Workout>> {
        self.workouts.list().await
    }

    /// Current workouts now and again after every committed workout write.
    pub fn watch_workouts(&self) -> BoxStream<'static, StorageResult<Vec<Workout>>> {
        let repo = self.workouts.clone();
        self.hub.watch(Table::Workouts, move || {
            let repo = repo.clone();
            async move { repo.list().await }
        })
    }

    // Drafts

    pub async fn save_draft(&self, workout: &Workout) -> StorageResult<()> {
        self.drafts.save(workout).await
    }

    pub async fn load_draft(&self, id: i64) -> StorageResult<Option<Workout>> {
        self.drafts.load(id).await
    }

    pub async fn clear_draft(&self, id: i64) -> StorageResult<()> {
        self.drafts.clear(id).await
    }

    pub async fn list_drafts(&self) -> StorageResult<Vec<Workout>> {
        self.drafts.list().await
    }

    // Exercise library

    pub async fn exercise_name_exists(&self, name: &str) -> StorageResult<bool> {
        self.exercises.name_exists(name).await
    }

    pub async fn create_custom_exercise(
        &self,
        name: &str,
        category: ExerciseCategory,
    ) -> StorageResult<Exercise> {
        self.exercises.create(name, category).await
    }

    pub async fn delete_custom_exercise(&self, id: i64) -> StorageResult<()> {
        self.exercises.delete(id).await
    }

    pub async fn list_custom_exercises(&self) -> StorageResult<Vec<Exercise>> {
        self.exercises.list().await
    }

    pub fn watch_custom_exercises(&self) -> BoxStream<'static, StorageResult<Vec<Exercise>>> {
        let repo = self.exercises.clone();
        self.hub.watch(Table::CustomExercises, move || {
            let repo = repo.clone();
            async move { repo.list().await }
        })
    }

    /// Resolves an exercise id against the built-in catalog first, then the
    /// custom exercises.
    pub async fn find_exercise(&self, id: i64) -> StorageResult<Option<Exercise>> {
        match catalog::find_builtin(id) {
            Some(exercise) => Ok(Some(exercise)),
            None => self.exercises.get_by_id(id).await,
        }
    }

    /// Built-in and custom exercises, optionally limited to one category.
    pub async fn exercise_library(
        &self,
        category: Option<ExerciseCategory>,
    ) -> StorageResult<Vec<Exercise>> {
        let custom = self.exercises.list().await?;
        Ok(catalog::library(&custom, category))
    }

    pub async fn exercise_history(&self, exercise_id: i64) -> StorageResult<Vec<ExerciseProgress>> {
        let workouts = self.workouts.list().await?;
        Ok(progress::exercise_history(&workouts, exercise_id))
    }

    // Body weight

    pub async fn log_weight(&self, date: NaiveDate, weight: f64) -> StorageResult<WeightEntry> {
        self.weights.create(date, weight).await
    }

    pub async fn list_weights(&self) -> StorageResult<Vec<WeightEntry>> {
        self.weights.list().await
    }

    pub async fn delete_weight(&self, id: i64) -> StorageResult<()> {
        self.weights.delete(id).await
    }

    pub async fn weight_summary(&self, today: NaiveDate) -> StorageResult<WeightSummary> {
        let entries = self.weights.list().await?;
        Ok(progress::weight_summary(&entries, today))
    }

    pub fn watch_weights(&self) -> BoxStream<'static, StorageResult<Vec<WeightEntry>>> {
        let repo = self.weights.clone();
        self.hub.watch(Table::BodyWeights, move || {
            let repo = repo.clone();
            async move { repo.list().await }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{WorkoutExercise, WorkoutSet, WorkoutType};
    use futures::StreamExt;
    use std::time::Duration;
    use tempfile::TempDir;

    struct TestContext {
        gateway: Gateway,
        _temp_dir: TempDir, // Keep alive for duration of test
    }

    async fn setup_gateway() -> TestContext {
        let temp_dir = TempDir::new().unwrap();
        let gateway = Gateway::open(&temp_dir.path().join("test.db"))
            .await
            .unwrap();
        TestContext {
            gateway,
            _temp_dir: temp_dir,
        }
    }

    fn bench_day() -> Workout {
        Workout::new(WorkoutType::Push, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
            .with_exercises(vec![WorkoutExercise::new(catalog::find_builtin(1).unwrap())
                .with_sets(vec![WorkoutSet::new(1, 60.0, 10)])])
    }

    #[tokio::test]
    async fn test_new_workout_scenario() {
        let ctx = setup_gateway().await;
        let gateway = &ctx.gateway;

        let id = gateway.upsert_workout(&bench_day()).await.unwrap();
        assert!(id > 0);

        let workouts = gateway.list_workouts().await.unwrap();
        let matching: Vec<&Workout> = workouts.iter().filter(|w| w.id == id).collect();
        assert_eq!(matching.len(), 1);
        assert_eq!(matching[0].exercises.len(), 1);
        assert_eq!(matching[0].exercises[0].sets.len(), 1);
        assert_eq!(matching[0].exercises[0].sets[0].weight, 60.0);
        assert_eq!(matching[0].exercises[0].sets[0].reps, 10);
    }

    #[tokio::test]
    async fn test_replace_exercise_scenario() {
        let ctx = setup_gateway().await;
        let gateway = &ctx.gateway;

        let id = gateway.upsert_workout(&bench_day()).await.unwrap();

        let mut edited = gateway.get_workout(id).await.unwrap().unwrap();
        edited.exercises = vec![WorkoutExercise::new(catalog::find_builtin(8).unwrap())
            .with_sets(vec![WorkoutSet::new(1, 40.0, 10)])];
        gateway.upsert_workout(&edited).await.unwrap();

        let fetched = gateway.get_workout(id).await.unwrap().unwrap();
        assert_eq!(fetched.exercises.len(), 1);
        assert_eq!(fetched.exercises[0].exercise.name, "Military Press");
    }

    #[tokio::test]
    async fn test_watch_workouts_emits_after_writes() {
        let ctx = setup_gateway().await;
        let gateway = &ctx.gateway;

        let mut stream = gateway.watch_workouts();
        assert!(stream.next().await.unwrap().unwrap().is_empty());

        let id = gateway.upsert_workout(&bench_day()).await.unwrap();
        let snapshot = stream.next().await.unwrap().unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id, id);

        gateway.delete_workout(id).await.unwrap();
        let snapshot = stream.next().await.unwrap().unwrap();
        assert!(snapshot.is_empty());
    }

    #[tokio::test]
    async fn test_watch_workouts_ignores_drafts() {
        let ctx = setup_gateway().await;
        let gateway = &ctx.gateway;

        let mut stream = gateway.watch_workouts();
        stream.next().await.unwrap().unwrap();

        gateway.save_draft(&bench_day()).await.unwrap();

        let next = tokio::time::timeout(Duration::from_millis(100), stream.next()).await;
        assert!(next.is_err(), "draft save must not trigger a workouts snapshot");
    }

    #[tokio::test]
    async fn test_multiple_watchers() {
        let ctx = setup_gateway().await;
        let gateway = &ctx.gateway;

        let mut first = gateway.watch_weights();
        let mut second = gateway.watch_weights();
        first.next().await.unwrap().unwrap();
        second.next().await.unwrap().unwrap();

        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        gateway.log_weight(date, 80.0).await.unwrap();

        assert_eq!(first.next().await.unwrap().unwrap().len(), 1);
        assert_eq!(second.next().await.unwrap().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_draft_roundtrip_scenario() {
        let ctx = setup_gateway().await;
        let gateway = &ctx.gateway;

        let draft = bench_day().with_id(12);
        gateway.save_draft(&draft).await.unwrap();
        assert_eq!(gateway.load_draft(12).await.unwrap(), Some(draft));

        gateway.clear_draft(12).await.unwrap();
        assert_eq!(gateway.load_draft(12).await.unwrap(), None);
        assert!(gateway.list_workouts().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_exercise_name_exists_scenario() {
        let ctx = setup_gateway().await;
        let gateway = &ctx.gateway;

        assert!(!gateway.exercise_name_exists("Bench Press").await.unwrap());
        gateway
            .create_custom_exercise("Bench Press", ExerciseCategory::Chest)
            .await
            .unwrap();
        assert!(gateway.exercise_name_exists("Bench Press").await.unwrap());
    }

    #[tokio::test]
    async fn test_exercise_library_and_lookup() {
        let ctx = setup_gateway().await;
        let gateway = &ctx.gateway;

        let custom = gateway
            .create_custom_exercise("Sled Push", ExerciseCategory::Legs)
            .await
            .unwrap();

        let legs = gateway
            .exercise_library(Some(ExerciseCategory::Legs))
            .await
            .unwrap();
        assert!(legs.iter().any(|e| e.id == custom.id));
        assert!(legs.iter().all(|e| e.category == ExerciseCategory::Legs));

        assert_eq!(gateway.find_exercise(1).await.unwrap().unwrap().name, "Bench Press");
        assert_eq!(gateway.find_exercise(custom.id).await.unwrap(), Some(custom));
        assert!(gateway.find_exercise(500).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_exercise_history() {
        let ctx = setup_gateway().await;
        let gateway = &ctx.gateway;

        gateway.upsert_workout(&bench_day()).await.unwrap();
        let mut later = bench_day();
        later.date = NaiveDate::from_ymd_opt(2024, 1, 8).unwrap();
        later.exercises[0].add_set(65.0, 8);
        gateway.upsert_workout(&later).await.unwrap();

        let history = gateway.exercise_history(1).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].max_weight, 65.0);
    }

    #[tokio::test]
    async fn test_closed_pool_reports_errors() {
        let ctx = setup_gateway().await;
        let gateway = &ctx.gateway;

        gateway.pool.close().await;

        let err = gateway.list_workouts().await.unwrap_err();
        assert_eq!(err.operation(), "list workouts");
        assert!(gateway.upsert_workout(&bench_day()).await.is_err());
        assert!(gateway.delete_workout(1).await.is_err());
    }
}

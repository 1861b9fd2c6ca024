//! Change notifications for reactive reads.
//!
//! Every committed write publishes the [`Table`] it touched. Watchers
//! subscribe before running their first query, then re-run the query each
//! time their table is published.

use futures::stream::{self, BoxStream, StreamExt};
use std::future::Future;
use tokio::sync::broadcast::{
    self,
    error::{RecvError, TryRecvError},
};

use super::error::StorageResult;

/// Groups of tables that are observed together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Workouts,
    Drafts,
    CustomExercises,
    BodyWeights,
}

/// Fan-out of committed-write notifications to any number of watchers.
#[derive(Debug)]
pub struct ChangeHub {
    sender: broadcast::Sender<Table>,
}

impl ChangeHub {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(64);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Table> {
        self.sender.subscribe()
    }

    pub fn notify(&self, table: Table) {
        // No receivers is fine
        let _ = self.sender.send(table);
    }

    /// Builds a stream that yields `query()` once immediately and again
    /// after every notification for `table`.
    ///
    /// A failed query is yielded as an `Err` element; the stream keeps
    /// going. Notifications that pile up while the watcher is busy, or that
    /// overflow the channel, lead to a single re-query.
    pub fn watch<T, F, Fut>(&self, table: Table, query: F) -> BoxStream<'static, StorageResult<T>>
    where
        T: Send + 'static,
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = StorageResult<T>> + Send + 'static,
    {
        let receiver = self.subscribe();

        stream::unfold(
            (receiver, query, true),
            move |(mut receiver, query, first)| async move {
                if !first {
                    loop {
                        match receiver.recv().await {
                            Ok(changed) if changed == table => break,
                            Ok(_) => continue,
                            Err(RecvError::Lagged(skipped)) => {
                                tracing::debug!("Watcher of {:?} skipped {} notifications", table, skipped);
                                break;
                            }
                            Err(RecvError::Closed) => return None,
                        }
                    }

                    // The query below covers everything already queued
                    while let Ok(_) | Err(TryRecvError::Lagged(_)) = receiver.try_recv() {}
                }

                let snapshot = query().await;
                Some((snapshot, (receiver, query, false)))
            },
        )
        .boxed()
    }
}

impl Default for ChangeHub {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::StorageError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_subscribe_and_notify() {
        let hub = ChangeHub::new();
        let mut rx = hub.subscribe();

        hub.notify(Table::Workouts);

        let table = rx.try_recv().unwrap();
        assert_eq!(table, Table::Workouts);
    }

    #[tokio::test]
    async fn test_notify_without_subscribers() {
        let hub = ChangeHub::new();
        hub.notify(Table::BodyWeights);
    }

    #[tokio::test]
    async fn test_watch_requeries_on_matching_table_only() {
        let hub = ChangeHub::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = calls.clone();
        let mut stream = hub.watch(Table::Workouts, move || {
            let counter = counter.clone();
            async move { Ok(counter.fetch_add(1, Ordering::SeqCst) + 1) }
        });

        assert_eq!(stream.next().await.unwrap().unwrap(), 1);

        hub.notify(Table::BodyWeights);
        hub.notify(Table::Workouts);

        assert_eq!(stream.next().await.unwrap().unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_watch_survives_failed_query() {
        let hub = ChangeHub::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = calls.clone();
        let mut stream = hub.watch(Table::Workouts, move || {
            let counter = counter.clone();
            async move {
                match counter.fetch_add(1, Ordering::SeqCst) + 1 {
                    2 => Err(StorageError::new("list workouts", sqlx::Error::PoolTimedOut)),
                    n => Ok(n),
                }
            }
        });

        assert_eq!(stream.next().await.unwrap().unwrap(), 1);

        hub.notify(Table::Workouts);
        let err = stream.next().await.unwrap().unwrap_err();
        assert_eq!(err.operation(), "list workouts");

        hub.notify(Table::Workouts);
        assert_eq!(stream.next().await.unwrap().unwrap(), 3);
    }

    #[tokio::test]
    async fn test_watch_requeries_once_after_overflow() {
        let hub = ChangeHub::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = calls.clone();
        let mut stream = hub.watch(Table::Workouts, move || {
            let counter = counter.clone();
            async move { Ok(counter.fetch_add(1, Ordering::SeqCst) + 1) }
        });

        assert_eq!(stream.next().await.unwrap().unwrap(), 1);

        // More than the channel holds
        for _ in 0..100 {
            hub.notify(Table::Workouts);
        }

        assert_eq!(stream.next().await.unwrap().unwrap(), 2);

        let pending = tokio::time::timeout(Duration::from_millis(50), stream.next()).await;
        assert!(pending.is_err(), "backlog must not trigger further queries");
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        hub.notify(Table::Workouts);
        assert_eq!(stream.next().await.unwrap().unwrap(), 3);
    }

    #[tokio::test]
    async fn test_watch_ends_when_hub_dropped() {
        let hub = ChangeHub::new();
        let mut stream = hub.watch(Table::Drafts, || async { Ok(()) });

        assert!(stream.next().await.is_some());
        drop(hub);
        assert!(stream.next().await.is_none());
    }
}

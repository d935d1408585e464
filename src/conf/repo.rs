//! Reactive configuration store.
//!
//! Holds the live value in a watch channel, republishes every update to
//! subscribers, and persists every published value from an owned
//! background task. The in-memory value is the source of truth after
//! the initial load; persistence is a durability mechanism only.

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::WatchStream;

use super::{Conf, ConfQueries};
use crate::storage::StorageError;

/// Reactive store for the configuration value.
///
/// Constructed in the *ready* state: the value is seeded synchronously
/// from storage, or the hard-coded default when nothing is persisted.
/// Dropping the repo (or awaiting [`shutdown`](Self::shutdown)) ends
/// the persistence task after it has written the latest value.
pub struct ConfRepo {
    tx: watch::Sender<Conf>,
    persist_task: JoinHandle<()>,
}

impl ConfRepo {
    /// Load the persisted value (or the default) and start the
    /// persistence task. Must be called within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the initial load fails; a *missing* row is
    /// not an error, only an unreadable one.
    pub fn new(queries: ConfQueries) -> Result<Self, StorageError> {
        let initial = queries.select()?.unwrap_or_default();
        let (tx, rx) = watch::channel(initial);
        let persist_task = tokio::spawn(persist_loop(queries, rx));
        Ok(Self { tx, persist_task })
    }

    /// The latest value. Never blocks, never waits on storage.
    pub fn current(&self) -> Conf {
        self.tx.borrow().clone()
    }

    /// Replace the held value with `transform(current)` and publish it.
    ///
    /// Concurrent calls are serialized: each transform observes the
    /// value left by the previous one, and none is lost.
    pub fn update<F>(&self, transform: F)
    where
        F: FnOnce(Conf) -> Conf,
    {
        self.tx.send_modify(|conf| *conf = transform(conf.clone()));
    }

    /// Subscribe to the value. The receiver starts at the current value
    /// and observes subsequent updates (conflated: a slow subscriber
    /// sees the latest value, not every intermediate one).
    pub fn subscribe(&self) -> watch::Receiver<Conf> {
        self.tx.subscribe()
    }

    /// The subscription as a `Stream`, yielding the current value first.
    pub fn stream(&self) -> WatchStream<Conf> {
        WatchStream::new(self.tx.subscribe())
    }

    /// Stop publishing and wait for the persistence task to write the
    /// latest value and exit.
    pub async fn shutdown(self) {
        let Self { tx, persist_task } = self;
        drop(tx);
        let _ = persist_task.await;
    }
}

/// Persist every published value, including the initial one.
///
/// Write failures are logged and do not invalidate the in-memory
/// value. Ends once the sender side is gone and the latest value has
/// been seen.
async fn persist_loop(queries: ConfQueries, mut rx: watch::Receiver<Conf>) {
    loop {
        let conf = rx.borrow_and_update().clone();
        if let Err(e) = queries.insert_or_replace(&conf) {
            tracing::warn!(error = %e, "Failed to persist configuration");
        }
        if rx.changed().await.is_err() {
            break;
        }
    }
}

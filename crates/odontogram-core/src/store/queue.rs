//! Background saves.
//!
//! Store calls block (SQLite, or a host's network client), so they run on the
//! tokio blocking pool. Saves submitted to one queue are written in submission
//! order: each waits for its predecessor to finish before touching the store.
//! A save can be cancelled up until it takes the store lock; after that it
//! runs to completion.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::{persist, OdontogramStore, StoreError, StoreResult};
use crate::chart::{SaveReceipt, SaveRequest};

/// Submits session snapshots to a shared store off the calling thread.
pub struct SaveQueue<S> {
    store: Arc<Mutex<S>>,
    runtime: Handle,
    /// Resolves when the most recently submitted save is done
    tail: Arc<Mutex<Option<oneshot::Receiver<()>>>>,
}

impl<S> Clone for SaveQueue<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            runtime: self.runtime.clone(),
            tail: Arc::clone(&self.tail),
        }
    }
}

impl<S: OdontogramStore + 'static> SaveQueue<S> {
    pub fn new(store: Arc<Mutex<S>>, runtime: Handle) -> Self {
        Self {
            store,
            runtime,
            tail: Arc::new(Mutex::new(None)),
        }
    }

    /// Queue on the runtime the caller is running in.
    pub fn current(store: Arc<Mutex<S>>) -> StoreResult<Self> {
        let runtime = Handle::try_current().map_err(|e| StoreError::Join(e.to_string()))?;
        Ok(Self::new(store, runtime))
    }

    pub fn store(&self) -> &Arc<Mutex<S>> {
        &self.store
    }

    /// Start saving a snapshot. The session stays usable meanwhile; feed the
    /// receipt back through `mark_saved` once the handle resolves.
    ///
    /// An older snapshot is never written after a newer one submitted later.
    pub fn submit(&self, request: SaveRequest) -> SaveHandle {
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);
        let store = Arc::clone(&self.store);

        let (done, next) = oneshot::channel();
        let previous = match self.tail.lock() {
            Ok(mut tail) => tail.replace(next),
            Err(poisoned) => poisoned.into_inner().replace(next),
        };

        let task = self.runtime.spawn_blocking(move || {
            // dropped on every exit path, releasing the next save
            let _done = done;
            if let Some(previous) = previous {
                // Err only means the predecessor ended without signalling
                let _ = previous.blocking_recv();
            }
            if flag.load(Ordering::SeqCst) {
                info!(odontogram = %request.odontogram.id, "save cancelled before start");
                return Err(StoreError::Cancelled);
            }
            let guard = store
                .lock()
                .map_err(|e| StoreError::Lock(e.to_string()))?;
            if flag.load(Ordering::SeqCst) {
                info!(odontogram = %request.odontogram.id, "save cancelled before start");
                return Err(StoreError::Cancelled);
            }
            persist(&*guard, &request).inspect_err(|e| {
                warn!(
                    odontogram = %request.odontogram.id,
                    revision = request.revision,
                    error = %e,
                    "save failed"
                )
            })
        });

        SaveHandle { cancelled, task }
    }
}

/// A save in flight.
pub struct SaveHandle {
    cancelled: Arc<AtomicBool>,
    task: JoinHandle<StoreResult<SaveReceipt>>,
}

impl SaveHandle {
    /// Ask the save not to start. Has no effect once the write has begun.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the save to finish.
    pub async fn outcome(self) -> StoreResult<SaveReceipt> {
        match self.task.await {
            Ok(result) => result,
            Err(e) if e.is_cancelled() => Err(StoreError::Cancelled),
            Err(e) => Err(StoreError::Join(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::ChartSession;
    use crate::db::Database;
    use crate::models::{Condition, Surface};
    use crate::taxonomy::ToothNumber;

    fn setup_queue() -> SaveQueue<Database> {
        let db = Database::open_in_memory().unwrap();
        SaveQueue::current(Arc::new(Mutex::new(db))).unwrap()
    }

    #[tokio::test]
    async fn test_save_in_background() {
        let queue = setup_queue();
        let mut session = ChartSession::new("pat_1".into(), "doc_1".into());
        session.set_surface(ToothNumber::new(16).unwrap(), Surface::Occlusal, Condition::Caries);

        let receipt = queue.submit(session.snapshot()).outcome().await.unwrap();
        session.mark_saved(&receipt);
        assert!(!session.is_dirty());

        let db = queue.store().lock().unwrap();
        assert_eq!(db.count_treatments(session.id()).unwrap(), 1);
    }

    #[tokio::test]
    async fn test_cancel_before_start() {
        let queue = setup_queue();
        let session = ChartSession::new("pat_1".into(), "doc_1".into());

        // hold the store so the save cannot begin before it is cancelled
        let guard = queue.store().lock().unwrap();
        let handle = queue.submit(session.snapshot());
        handle.cancel();
        drop(guard);

        assert!(matches!(handle.outcome().await, Err(StoreError::Cancelled)));
        let db = queue.store().lock().unwrap();
        assert!(db.get_odontogram(session.id()).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_overlapping_saves_land_in_submission_order() {
        let queue = setup_queue();
        let mut session = ChartSession::new("pat_1".into(), "doc_1".into());
        let (t16, t17) = (ToothNumber::new(16).unwrap(), ToothNumber::new(17).unwrap());

        let (older, newer) = {
            // both saves queue up behind the held store
            let _held = queue.store().lock().unwrap();
            session.set_surface(t16, Surface::Occlusal, Condition::Caries);
            let older = queue.submit(session.snapshot());
            session.set_surface(t17, Surface::Occlusal, Condition::Caries);
            let newer = queue.submit(session.snapshot());
            (older, newer)
        };

        let newer = newer.outcome().await.unwrap();
        let older = older.outcome().await.unwrap();
        session.mark_saved(&newer);
        session.mark_saved(&older);
        assert!(!session.is_dirty());

        let db = queue.store().lock().unwrap();
        let stored = db.get_odontogram(session.id()).unwrap().unwrap();
        assert!(stored.tooth(t16).is_some());
        assert!(stored.tooth(t17).is_some());
        assert_eq!(db.count_treatments(session.id()).unwrap(), 2);
    }

    #[tokio::test]
    async fn test_failed_save_keeps_session_dirty() {
        let queue = setup_queue();
        let first = ChartSession::new("pat_1".into(), "doc_1".into());
        queue.submit(first.snapshot()).outcome().await.unwrap();

        let mut second = ChartSession::new("pat_1".into(), "doc_2".into());
        second.cycle(ToothNumber::new(11).unwrap(), Surface::Mesial);
        let result = queue.submit(second.snapshot()).outcome().await;

        assert!(result.is_err());
        assert!(second.is_dirty());
        assert_eq!(
            second.state(ToothNumber::new(11).unwrap()).surface(Surface::Mesial),
            Condition::Caries
        );
    }

    #[test]
    fn test_current_requires_runtime() {
        let db = Database::open_in_memory().unwrap();
        assert!(SaveQueue::current(Arc::new(Mutex::new(db))).is_err());
    }
}

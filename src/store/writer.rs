//! Background snapshot writer.
//!
//! The engine hands snapshots to a [`SnapshotWriter`] and moves on; a
//! dedicated thread applies them to the store in submission order, so the
//! last write always wins. Dropping the writer drains the queue first.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, unbounded, SendError, Sender};

use super::{SnapshotStore, StoreError};
use crate::types::TimerSnapshot;

enum WriteOp {
    Save(TimerSnapshot),
    Clear,
    Flush(Sender<()>),
}

struct Worker {
    tx: Sender<WriteOp>,
    thread: JoinHandle<()>,
}

/// Fire-and-forget front end to a [`SnapshotStore`].
pub struct SnapshotWriter {
    store: Arc<dyn SnapshotStore>,
    worker: Option<Worker>,
}

impl SnapshotWriter {
    /// Starts the writer thread for `store`.
    ///
    /// If the thread cannot be spawned, writes happen on the caller instead.
    pub fn spawn(store: Arc<dyn SnapshotStore>) -> Self {
        let (tx, rx) = unbounded::<WriteOp>();
        let worker_store = Arc::clone(&store);
        let spawned = thread::Builder::new()
            .name("pomowatch-store".to_string())
            .spawn(move || {
                for op in rx {
                    apply(worker_store.as_ref(), op);
                }
            });

        let worker = match spawned {
            Ok(thread) => Some(Worker { tx, thread }),
            Err(e) => {
                tracing::warn!("snapshot writer unavailable, saving inline: {}", e);
                None
            }
        };
        Self { store, worker }
    }

    /// Queues `snapshot` to overwrite the stored one.
    pub fn save(&self, snapshot: TimerSnapshot) {
        self.submit(WriteOp::Save(snapshot));
    }

    /// Queues removal of the stored snapshot.
    pub fn clear(&self) {
        self.submit(WriteOp::Clear);
    }

    /// Blocks until every write queued so far has reached the store.
    pub fn flush(&self) {
        let (ack_tx, ack_rx) = bounded(1);
        self.submit(WriteOp::Flush(ack_tx));
        let _ = ack_rx.recv();
    }

    fn submit(&self, op: WriteOp) {
        let op = match &self.worker {
            Some(worker) => match worker.tx.send(op) {
                Ok(()) => return,
                Err(SendError(op)) => op,
            },
            None => op,
        };
        apply(self.store.as_ref(), op);
    }
}

impl Drop for SnapshotWriter {
    fn drop(&mut self) {
        if let Some(Worker { tx, thread }) = self.worker.take() {
            drop(tx);
            if thread.join().is_err() {
                tracing::error!("snapshot writer thread panicked");
            }
        }
    }
}

fn apply(store: &dyn SnapshotStore, op: WriteOp) {
    match op {
        WriteOp::Save(snapshot) => {
            if let Err(e) = store.save(snapshot) {
                log_failure("save timer snapshot", &e);
            }
        }
        WriteOp::Clear => {
            if let Err(e) = store.clear() {
                log_failure("clear saved timer", &e);
            }
        }
        WriteOp::Flush(ack) => {
            let _ = ack.send(());
        }
    }
}

fn log_failure(action: &str, err: &StoreError) {
    tracing::warn!("failed to {}: {} ({})", action, err, err.suggestion());
}

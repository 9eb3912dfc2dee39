//! Snapshot persistence for resuming a timer across restarts.
//!
//! The engine only sees the [`SnapshotStore`] trait. Two backends ship
//! with the crate:
//!
//! - [`MemorySnapshotStore`]: in-process slot, used by tests and embedders
//! - [`JsonFileSnapshotStore`]: a single JSON document on disk, used by the CLI
//!
//! A store holds at most one snapshot; `save` overwrites it. The engine
//! never calls a store directly: writes go through a [`SnapshotWriter`].

mod error;
mod file;
mod writer;

use std::sync::Mutex;

use chrono::Utc;

pub use error::StoreError;
pub use file::{default_state_path, JsonFileSnapshotStore, STATE_PATH_ENV};
pub use writer::SnapshotWriter;

use crate::types::TimerSnapshot;

/// Single-slot key-value persistence for [`TimerSnapshot`].
pub trait SnapshotStore: Send + Sync {
    /// Overwrites the stored snapshot, stamping the current time as `saved_at`.
    fn save(&self, snapshot: TimerSnapshot) -> Result<(), StoreError>;

    /// Returns the last saved snapshot, or `None` if nothing is stored.
    fn load(&self) -> Result<Option<TimerSnapshot>, StoreError>;

    /// Removes any stored snapshot. Clearing an empty store succeeds.
    fn clear(&self) -> Result<(), StoreError>;
}

// --- Memory Implementation ---

/// In-memory snapshot store.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    slot: Mutex<Option<TimerSnapshot>>,
    save_count: Mutex<usize>,
    should_fail: std::sync::atomic::AtomicBool,
}

impl MemorySnapshotStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store already holding `snapshot`, keeping its `saved_at`.
    #[must_use]
    pub fn seeded(snapshot: TimerSnapshot) -> Self {
        Self {
            slot: Mutex::new(Some(snapshot)),
            ..Self::default()
        }
    }

    /// Makes every operation fail with [`StoreError::Unavailable`].
    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail
            .store(should_fail, std::sync::atomic::Ordering::SeqCst);
    }

    /// Returns the stored snapshot without going through the trait.
    #[must_use]
    pub fn current(&self) -> Option<TimerSnapshot> {
        self.slot.lock().ok().and_then(|slot| slot.clone())
    }

    /// Number of successful saves so far.
    #[must_use]
    pub fn save_count(&self) -> usize {
        self.save_count.lock().map(|count| *count).unwrap_or(0)
    }

    fn check_failure(&self) -> Result<(), StoreError> {
        if self.should_fail.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(StoreError::Unavailable);
        }
        Ok(())
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn save(&self, mut snapshot: TimerSnapshot) -> Result<(), StoreError> {
        self.check_failure()?;
        snapshot.saved_at = Utc::now();
        *self.slot.lock().map_err(|_| StoreError::Unavailable)? = Some(snapshot);
        *self.save_count.lock().map_err(|_| StoreError::Unavailable)? += 1;
        Ok(())
    }

    fn load(&self) -> Result<Option<TimerSnapshot>, StoreError> {
        self.check_failure()?;
        Ok(self.slot.lock().map_err(|_| StoreError::Unavailable)?.clone())
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.check_failure()?;
        *self.slot.lock().map_err(|_| StoreError::Unavailable)? = None;
        Ok(())
    }
}

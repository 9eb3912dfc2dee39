//! JSON file backend for the snapshot store.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::Utc;

use super::{SnapshotStore, StoreError};
use crate::types::TimerSnapshot;

/// Environment variable overriding the snapshot file location.
pub const STATE_PATH_ENV: &str = "POMOWATCH_STATE";

/// Directory under the platform data dir holding the snapshot.
const STATE_DIR: &str = "pomowatch";

/// Snapshot file name.
const STATE_FILE: &str = "timer.json";

/// Returns the default snapshot path.
///
/// Resolution order: `POMOWATCH_STATE`, then `<data_dir>/pomowatch/timer.json`,
/// then `./.pomowatch/timer.json` when no data dir is known.
pub fn default_state_path() -> PathBuf {
    if let Some(path) = std::env::var_os(STATE_PATH_ENV) {
        return PathBuf::from(path);
    }
    match dirs::data_dir() {
        Some(dir) => dir.join(STATE_DIR).join(STATE_FILE),
        None => PathBuf::from(".pomowatch").join(STATE_FILE),
    }
}

/// Stores the snapshot as a single JSON document.
///
/// Writes go through a sibling temp file and a rename so a crash mid-write
/// leaves either the old or the new snapshot, never a partial one.
#[derive(Debug, Clone)]
pub struct JsonFileSnapshotStore {
    path: PathBuf,
}

impl JsonFileSnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the snapshot file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| STATE_FILE.into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SnapshotStore for JsonFileSnapshotStore {
    fn save(&self, mut snapshot: TimerSnapshot) -> Result<(), StoreError> {
        snapshot.saved_at = Utc::now();
        let json = serde_json::to_vec_pretty(&snapshot)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
            }
        }

        let temp = self.temp_path();
        fs::write(&temp, json).map_err(|e| self.io_error(e))?;
        fs::rename(&temp, &self.path).map_err(|e| self.io_error(e))?;

        tracing::debug!(path = %self.path.display(), "snapshot saved");
        Ok(())
    }

    fn load(&self) -> Result<Option<TimerSnapshot>, StoreError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };

        let snapshot: TimerSnapshot = serde_json::from_slice(&bytes)?;
        if !snapshot.is_valid() {
            return Err(StoreError::Invalid(format!(
                "{} seconds remaining exceeds {} bounds",
                snapshot.time_remaining,
                snapshot.session_type.as_str()
            )));
        }
        Ok(Some(snapshot))
    }

    fn clear(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }
}

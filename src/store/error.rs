//! Snapshot store error types.
//!
//! None of these ever reach the engine's callers: the engine logs them and
//! falls back to a fresh state.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while persisting or loading a snapshot.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed.
    #[error("snapshot I/O failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The stored document is not a valid snapshot encoding.
    #[error("snapshot is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    /// The snapshot decoded but violates its invariants.
    #[error("snapshot is invalid: {0}")]
    Invalid(String),

    /// The store's lock was poisoned by a panicking writer.
    #[error("snapshot store is unavailable")]
    Unavailable,
}

impl StoreError {
    /// Returns true if the stored data itself is bad (as opposed to the medium).
    #[must_use]
    pub fn is_corruption(&self) -> bool {
        matches!(self, Self::Corrupt(_) | Self::Invalid(_))
    }

    /// Returns a user-friendly suggestion for resolving this error.
    #[must_use]
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::Io { .. } => "check that the state directory is writable",
            Self::Corrupt(_) | Self::Invalid(_) => {
                "the saved timer will be ignored; run `pomowatch reset` to remove it"
            }
            Self::Unavailable => "restart the application",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_corruption() {
        let err = serde_json::from_str::<u32>("nope").unwrap_err();
        assert!(StoreError::Corrupt(err).is_corruption());
        assert!(StoreError::Invalid("x".into()).is_corruption());
        assert!(!StoreError::Unavailable.is_corruption());
    }

    #[test]
    fn test_io_error_display_includes_path() {
        let err = StoreError::Io {
            path: PathBuf::from("/tmp/state.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().contains("/tmp/state.json"));
        assert!(err.suggestion().contains("writable"));
    }
}

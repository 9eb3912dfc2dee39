//! Feedback (notification and haptic) error types.
//!
//! These errors are always recoverable: the engine logs them and keeps
//! counting down.

use thiserror::Error;

/// Errors that can occur when requesting a notification or haptic pulse.
#[derive(Debug, Error)]
pub enum FeedbackError {
    /// No delivery mechanism is reachable (e.g. no async runtime).
    #[error("notification delivery is unavailable: {0}")]
    Unavailable(String),

    /// The delivery mechanism rejected the request.
    #[error("failed to schedule notification: {0}")]
    SendFailed(String),

    /// No haptic output is available.
    #[error("haptic feedback is unavailable: {0}")]
    HapticsUnavailable(String),
}

impl FeedbackError {
    /// Returns true if the error came from the haptic side.
    #[must_use]
    pub fn is_haptic_error(&self) -> bool {
        matches!(self, Self::HapticsUnavailable(_))
    }

    /// Returns a user-friendly suggestion for resolving this error.
    #[must_use]
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::Unavailable(_) => "run the timer in the foreground with `pomowatch run`",
            Self::SendFailed(_) => "check the notification settings",
            Self::HapticsUnavailable(_) => "haptic feedback will be skipped",
        }
    }
}

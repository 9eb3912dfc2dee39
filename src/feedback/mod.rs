//! Side-effect collaborators fired at session boundaries.
//!
//! The engine never delivers a notification or renders a haptic itself; it
//! issues requests through two traits:
//!
//! ```text
//! ┌──────────────┐  schedule_completion / cancel_all_scheduled  ┌──────────┐
//! │ TimerEngine  │ ────────────────────────────────────────────▶ │ Notifier │
//! │              │  pulse(Start | Pause | Complete)              ├──────────┤
//! │              │ ────────────────────────────────────────────▶ │ Haptics  │
//! └──────────────┘                                               └──────────┘
//! ```
//!
//! Implementations must return promptly and do their work in the background.
//! Any error they return is logged by the engine and otherwise ignored.

mod content;
mod error;
mod terminal;

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub use content::{NotificationContent, COMPLETION_ID_PREFIX};
pub use error::FeedbackError;
pub use terminal::{TerminalHaptics, TerminalNotifier};

use crate::types::{HapticKind, SessionType};

/// Schedules and cancels session-completion notifications.
pub trait Notifier: Send + Sync {
    /// Requests a completion notification `after` from now.
    ///
    /// Must not block; delivery happens in the background.
    fn schedule_completion(
        &self,
        session_type: SessionType,
        after: Duration,
    ) -> Result<(), FeedbackError>;

    /// Cancels every pending notification. Safe to call with nothing pending.
    fn cancel_all_scheduled(&self);

    /// Returns true if notifications can currently be delivered.
    fn is_available(&self) -> bool;
}

/// Plays a short haptic pulse.
pub trait HapticPlayer: Send + Sync {
    /// Requests a pulse. Must not block.
    fn pulse(&self, kind: HapticKind) -> Result<(), FeedbackError>;

    /// Returns true if haptics are available.
    fn is_available(&self) -> bool;
}

// ============================================================================
// Mocks
// ============================================================================

/// Mock notifier for testing.
#[derive(Debug, Default)]
pub struct MockNotifier {
    scheduled: Mutex<Vec<(SessionType, Duration)>>,
    cancel_calls: AtomicUsize,
    should_fail: AtomicBool,
}

impl MockNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail.store(should_fail, Ordering::SeqCst);
    }

    /// Every successful `schedule_completion` call, in order.
    #[must_use]
    pub fn get_scheduled(&self) -> Vec<(SessionType, Duration)> {
        self.scheduled.lock().unwrap().clone()
    }

    #[must_use]
    pub fn schedule_count(&self) -> usize {
        self.scheduled.lock().unwrap().len()
    }

    #[must_use]
    pub fn cancel_count(&self) -> usize {
        self.cancel_calls.load(Ordering::SeqCst)
    }
}

impl Notifier for MockNotifier {
    fn schedule_completion(
        &self,
        session_type: SessionType,
        after: Duration,
    ) -> Result<(), FeedbackError> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(FeedbackError::SendFailed("Mock failure".to_string()));
        }
        self.scheduled.lock().unwrap().push((session_type, after));
        Ok(())
    }

    fn cancel_all_scheduled(&self) {
        self.cancel_calls.fetch_add(1, Ordering::SeqCst);
    }

    fn is_available(&self) -> bool {
        !self.should_fail.load(Ordering::SeqCst)
    }
}

/// Mock haptic player for testing.
#[derive(Debug, Default)]
pub struct MockHaptics {
    pulses: Mutex<Vec<HapticKind>>,
    should_fail: AtomicBool,
}

impl MockHaptics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail.store(should_fail, Ordering::SeqCst);
    }

    #[must_use]
    pub fn get_pulses(&self) -> Vec<HapticKind> {
        self.pulses.lock().unwrap().clone()
    }

    #[must_use]
    pub fn pulse_count(&self) -> usize {
        self.pulses.lock().unwrap().len()
    }
}

impl HapticPlayer for MockHaptics {
    fn pulse(&self, kind: HapticKind) -> Result<(), FeedbackError> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(FeedbackError::HapticsUnavailable("Mock failure".to_string()));
        }
        self.pulses.lock().unwrap().push(kind);
        Ok(())
    }

    fn is_available(&self) -> bool {
        !self.should_fail.load(Ordering::SeqCst)
    }
}

//! Terminal-backed notifier and haptics.
//!
//! Both run their work on the ambient tokio runtime so the caller never
//! blocks. Without a runtime they report [`FeedbackError::Unavailable`].

use std::io::Write;
use std::sync::Mutex;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::content::NotificationContent;
use super::{FeedbackError, HapticPlayer, Notifier};
use crate::types::{HapticKind, SessionType};

// ============================================================================
// TerminalNotifier
// ============================================================================

/// Delivers completion notifications to stderr after a delay.
#[derive(Debug, Default)]
pub struct TerminalNotifier {
    pending: Mutex<Vec<JoinHandle<()>>>,
    delivered: Option<mpsc::UnboundedSender<NotificationContent>>,
}

impl TerminalNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Also forwards every delivered notification to `tx`.
    #[must_use]
    pub fn with_delivery_channel(tx: mpsc::UnboundedSender<NotificationContent>) -> Self {
        Self {
            pending: Mutex::new(Vec::new()),
            delivered: Some(tx),
        }
    }

    /// Number of scheduled notifications that have not fired yet.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending
            .lock()
            .map(|pending| pending.iter().filter(|task| !task.is_finished()).count())
            .unwrap_or(0)
    }
}

impl Notifier for TerminalNotifier {
    fn schedule_completion(
        &self,
        session_type: SessionType,
        after: Duration,
    ) -> Result<(), FeedbackError> {
        let runtime = Handle::try_current().map_err(|e| FeedbackError::Unavailable(e.to_string()))?;
        let content = NotificationContent::completion(session_type);
        let delivered = self.delivered.clone();

        tracing::debug!(
            id = %content.id,
            after_secs = after.as_secs_f64(),
            "scheduling completion notification"
        );

        let task = runtime.spawn(async move {
            tokio::time::sleep(after).await;
            eprintln!("* {}", content.title);
            eprintln!("  {}", content.body);
            if let Some(tx) = delivered {
                let _ = tx.send(content);
            }
        });

        let mut pending = self
            .pending
            .lock()
            .map_err(|_| FeedbackError::SendFailed("pending notification list poisoned".into()))?;
        pending.retain(|task| !task.is_finished());
        pending.push(task);
        Ok(())
    }

    fn cancel_all_scheduled(&self) {
        if let Ok(mut pending) = self.pending.lock() {
            for task in pending.drain(..) {
                task.abort();
            }
        }
    }

    fn is_available(&self) -> bool {
        Handle::try_current().is_ok()
    }
}

impl Drop for TerminalNotifier {
    fn drop(&mut self) {
        self.cancel_all_scheduled();
    }
}

// ============================================================================
// TerminalHaptics
// ============================================================================

/// Stands in for haptics with the terminal bell.
#[derive(Debug, Clone, Copy)]
pub struct TerminalHaptics {
    bell: bool,
}

impl TerminalHaptics {
    /// Creates the player; with `bell` false pulses are only logged.
    #[must_use]
    pub fn new(bell: bool) -> Self {
        Self { bell }
    }
}

impl HapticPlayer for TerminalHaptics {
    fn pulse(&self, kind: HapticKind) -> Result<(), FeedbackError> {
        let runtime =
            Handle::try_current().map_err(|e| FeedbackError::HapticsUnavailable(e.to_string()))?;
        tracing::debug!(?kind, "haptic pulse");

        if !self.bell {
            return Ok(());
        }

        // Completion rings twice so it stands apart from start/pause.
        let rings: &'static [u8] = match kind {
            HapticKind::Complete => b"\x07\x07",
            HapticKind::Start | HapticKind::Pause => b"\x07",
        };
        runtime.spawn(async move {
            let mut stderr = std::io::stderr();
            let _ = stderr.write_all(rings);
            let _ = stderr.flush();
        });
        Ok(())
    }

    fn is_available(&self) -> bool {
        Handle::try_current().is_ok()
    }
}

//! Timer engine for the Pomodoro session state machine.
//!
//! This module provides the core timer functionality:
//! - State transitions (Idle → Working/OnBreak → Paused → Idle)
//! - Countdown driven by an owned, cancellable tick schedule
//! - Next-session selection with a long break every fourth work session
//! - Snapshot persistence and restore-on-launch
//! - Side-effect requests (notifications, haptics) at boundaries
//! - State-change publication to subscribers

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio::time::Duration;

use super::ticker::{ScheduledTick, Tick, TickScheduler, TICK_PERIOD};
use crate::feedback::{HapticPlayer, Notifier};
use crate::store::{SnapshotStore, SnapshotWriter};
use crate::types::{
    format_time, progress, should_show_long_break, HapticKind, SessionState, SessionType,
    TimerSnapshot, TimerStatus,
};

// ============================================================================
// TimerEvent
// ============================================================================

/// What caused a state change.
#[derive(Debug, Clone, PartialEq)]
pub enum TimerEvent {
    /// Countdown started or resumed
    Started {
        session_type: SessionType,
    },
    /// Countdown paused with time preserved
    Paused,
    /// Timer reset to a fresh work session
    Reset {
        /// Whether the completed count was cleared as well
        hard: bool,
    },
    /// Session skipped without finishing
    Skipped {
        from: SessionType,
        to: SessionType,
    },
    /// One second elapsed
    Tick {
        remaining_seconds: f64,
    },
    /// Countdown reached zero
    SessionCompleted {
        completed: SessionType,
        next: SessionType,
    },
}

/// A state change together with the state it produced.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineUpdate {
    pub event: TimerEvent,
    pub status: TimerStatus,
}

// ============================================================================
// EngineDeps
// ============================================================================

/// Collaborators injected into the engine.
pub struct EngineDeps {
    pub store: Arc<dyn SnapshotStore>,
    pub notifier: Arc<dyn Notifier>,
    pub haptics: Arc<dyn HapticPlayer>,
    pub scheduler: Box<dyn TickScheduler>,
}

// ============================================================================
// TimerEngine
// ============================================================================

/// Pomodoro state machine and countdown.
///
/// All mutation goes through `&mut self`, so operations and ticks are
/// serialized by construction. Ticks arrive on the receiver returned by
/// [`TimerEngine::restore`] and must be fed back through
/// [`TimerEngine::handle_tick`].
pub struct TimerEngine {
    state: SessionState,
    session_type: SessionType,
    time_remaining: f64,
    sessions_completed: u32,
    is_running: bool,
    /// Active tick schedule; `Some` exactly while running.
    ticker: Option<Box<dyn ScheduledTick>>,
    /// Generation of the most recent schedule.
    generation: u64,
    tick_tx: mpsc::UnboundedSender<Tick>,
    deps: EngineDeps,
    /// Snapshot sink; `None` for a read-only engine.
    writer: Option<SnapshotWriter>,
    observers: Vec<mpsc::UnboundedSender<EngineUpdate>>,
}

impl TimerEngine {
    /// Constructs the engine, restoring from the snapshot store if possible.
    pub fn restore(deps: EngineDeps) -> (Self, mpsc::UnboundedReceiver<Tick>) {
        Self::restore_at(deps, Utc::now())
    }

    /// Like [`TimerEngine::restore`] with an explicit wall-clock time.
    pub fn restore_at(
        deps: EngineDeps,
        now: DateTime<Utc>,
    ) -> (Self, mpsc::UnboundedReceiver<Tick>) {
        let writer = SnapshotWriter::spawn(Arc::clone(&deps.store));
        Self::load(deps, Some(writer), now)
    }

    /// Reports the saved timer as a restore would see it, without writing
    /// anything back to the store.
    pub fn inspect(deps: EngineDeps) -> TimerStatus {
        let (engine, _ticks) = Self::load(deps, None, Utc::now());
        engine.status()
    }

    fn load(
        deps: EngineDeps,
        writer: Option<SnapshotWriter>,
        now: DateTime<Utc>,
    ) -> (Self, mpsc::UnboundedReceiver<Tick>) {
        let (tick_tx, tick_rx) = mpsc::unbounded_channel();
        let mut engine = Self {
            state: SessionState::Idle,
            session_type: SessionType::Work,
            time_remaining: SessionType::Work.duration(),
            sessions_completed: 0,
            is_running: false,
            ticker: None,
            generation: 0,
            tick_tx,
            deps,
            writer,
            observers: Vec::new(),
        };

        match engine.deps.store.load() {
            Ok(Some(snapshot)) => engine.apply_snapshot(snapshot, now),
            Ok(None) => tracing::debug!("no saved timer; starting fresh"),
            Err(e) if e.is_corruption() => {
                tracing::warn!("ignoring corrupt snapshot: {} ({})", e, e.suggestion())
            }
            Err(e) => tracing::warn!("could not read saved timer: {} ({})", e, e.suggestion()),
        }

        (engine, tick_rx)
    }

    fn apply_snapshot(&mut self, snapshot: TimerSnapshot, now: DateTime<Utc>) {
        if !snapshot.is_valid() {
            tracing::warn!(
                "ignoring snapshot with {} seconds left in a {} session",
                snapshot.time_remaining,
                snapshot.session_type.as_str()
            );
            return;
        }

        let actual_remaining = snapshot.actual_remaining(now);
        if actual_remaining <= 0.0 {
            // Elapsed while closed: nothing is replayed, only the count survives.
            tracing::info!(
                "saved {} session elapsed while closed; starting fresh",
                snapshot.session_type.as_str()
            );
            self.sessions_completed = snapshot.sessions_completed;
            self.persist();
            return;
        }

        self.session_type = snapshot.session_type;
        self.sessions_completed = snapshot.sessions_completed;
        self.time_remaining = actual_remaining;
        tracing::debug!(
            "restored {} session with {:.1}s left",
            self.session_type.as_str(),
            self.time_remaining
        );

        if snapshot.is_running {
            // Never auto-resume; record that the countdown is now stopped.
            self.persist();
        }
    }

    // ------------------------------------------------------------------------
    // Operations
    // ------------------------------------------------------------------------

    /// Starts or resumes the countdown.
    ///
    /// Returns false (and does nothing) if already running.
    pub fn start(&mut self) -> bool {
        if self.is_running {
            return false;
        }

        self.generation += 1;
        let tick = Tick {
            generation: self.generation,
        };
        self.ticker = Some(self.deps.scheduler.schedule_repeating(
            TICK_PERIOD,
            tick,
            self.tick_tx.clone(),
        ));
        self.is_running = true;
        self.state = SessionState::running(self.session_type);

        tracing::info!(
            "started {} with {}",
            self.session_type.label(),
            self.formatted_time()
        );

        self.request_completion_notice();
        self.pulse(HapticKind::Start);
        self.persist();
        self.publish(TimerEvent::Started {
            session_type: self.session_type,
        });
        true
    }

    /// Pauses the countdown, keeping the remaining time.
    ///
    /// Returns false (and does nothing) if not running.
    pub fn pause(&mut self) -> bool {
        if !self.is_running {
            return false;
        }

        self.stop_ticker();
        self.is_running = false;
        self.state = SessionState::Paused;
        tracing::info!("paused with {}", self.formatted_time());

        self.deps.notifier.cancel_all_scheduled();
        self.pulse(HapticKind::Pause);
        self.persist();
        self.publish(TimerEvent::Paused);
        true
    }

    /// Returns to a fresh work session, keeping the completed count.
    pub fn reset(&mut self) {
        self.reset_fields();
        tracing::info!("timer reset");
        self.publish(TimerEvent::Reset { hard: false });
    }

    /// Like [`TimerEngine::reset`], also clearing the completed count.
    pub fn hard_reset(&mut self) {
        self.sessions_completed = 0;
        self.reset_fields();
        tracing::info!("timer hard reset");
        self.publish(TimerEvent::Reset { hard: true });
    }

    /// Abandons the current session and moves to the next one, idle.
    ///
    /// A skipped work session still counts as completed.
    pub fn skip_to_next_session(&mut self) {
        if self.is_running {
            self.stop_ticker();
            self.is_running = false;
            self.deps.notifier.cancel_all_scheduled();
        }

        let from = self.session_type;
        self.advance();
        tracing::info!("skipped {} -> {}", from.label(), self.session_type.label());

        self.persist();
        self.publish(TimerEvent::Skipped {
            from,
            to: self.session_type,
        });
    }

    /// Applies one tick from the active schedule.
    ///
    /// Ticks from a cancelled or superseded schedule are ignored and
    /// return false.
    pub fn handle_tick(&mut self, tick: Tick) -> bool {
        if self.ticker.is_none() || tick.generation != self.generation {
            tracing::trace!("dropping stale tick {}", tick.generation);
            return false;
        }

        self.time_remaining -= 1.0;
        if self.time_remaining <= 0.0 {
            self.expire();
        } else {
            self.publish(TimerEvent::Tick {
                remaining_seconds: self.time_remaining,
            });
        }
        true
    }

    // ------------------------------------------------------------------------
    // Observation
    // ------------------------------------------------------------------------

    /// Registers a subscriber for every subsequent state change.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<EngineUpdate> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.observers.push(tx);
        rx
    }

    /// Returns the full observable state.
    pub fn status(&self) -> TimerStatus {
        TimerStatus {
            state: self.state,
            session_type: self.session_type,
            time_remaining: self.time_remaining,
            sessions_completed: self.sessions_completed,
            is_running: self.is_running,
            progress: self.progress(),
            formatted_time: self.formatted_time(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn session_type(&self) -> SessionType {
        self.session_type
    }

    pub fn time_remaining(&self) -> f64 {
        self.time_remaining
    }

    pub fn sessions_completed(&self) -> u32 {
        self.sessions_completed
    }

    pub fn is_running(&self) -> bool {
        self.is_running
    }

    /// Fraction of the current session elapsed, in [0, 1].
    pub fn progress(&self) -> f64 {
        progress(self.session_type, self.time_remaining)
    }

    /// Remaining time as `MM:SS`.
    pub fn formatted_time(&self) -> String {
        format_time(self.time_remaining)
    }

    pub fn should_show_long_break(&self) -> bool {
        should_show_long_break(self.sessions_completed)
    }

    /// Blocks until every snapshot written so far has reached the store.
    pub fn flush_snapshots(&self) {
        if let Some(writer) = &self.writer {
            writer.flush();
        }
    }

    /// Returns a mutable reference to the remaining time (for testing).
    #[cfg(test)]
    pub(crate) fn time_remaining_mut(&mut self) -> &mut f64 {
        &mut self.time_remaining
    }

    /// Overrides the completed count (for testing).
    #[cfg(test)]
    pub(crate) fn set_sessions_completed(&mut self, count: u32) {
        self.sessions_completed = count;
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    fn expire(&mut self) {
        self.stop_ticker();
        self.is_running = false;

        let completed = self.session_type;
        if completed == SessionType::Work {
            self.sessions_completed = self.sessions_completed.saturating_add(1);
        }
        self.pulse(HapticKind::Complete);
        self.session_type = completed.next(self.sessions_completed);
        self.time_remaining = self.session_type.duration();
        self.state = SessionState::Idle;

        tracing::info!(
            "{} complete ({} sessions); next up: {}",
            completed.label(),
            self.sessions_completed,
            self.session_type.label()
        );

        self.persist();
        self.publish(TimerEvent::SessionCompleted {
            completed,
            next: self.session_type,
        });
    }

    /// Counts a finished work session and moves to the next session type, idle.
    fn advance(&mut self) {
        if self.session_type == SessionType::Work {
            self.sessions_completed = self.sessions_completed.saturating_add(1);
        }
        self.session_type = self.session_type.next(self.sessions_completed);
        self.time_remaining = self.session_type.duration();
        self.state = SessionState::Idle;
    }

    fn reset_fields(&mut self) {
        self.stop_ticker();
        self.deps.notifier.cancel_all_scheduled();

        self.state = SessionState::Idle;
        self.session_type = SessionType::Work;
        self.time_remaining = SessionType::Work.duration();
        self.is_running = false;

        if let Some(writer) = &self.writer {
            writer.clear();
        }
    }

    /// Cancels the tick schedule before any further mutation.
    fn stop_ticker(&mut self) {
        if let Some(mut ticker) = self.ticker.take() {
            ticker.cancel();
        }
    }

    fn request_completion_notice(&self) {
        if !self.deps.notifier.is_available() {
            tracing::debug!("notifications unavailable; no completion notice");
            return;
        }
        let after = Duration::from_secs_f64(self.time_remaining.max(0.0));
        if let Err(e) = self
            .deps
            .notifier
            .schedule_completion(self.session_type, after)
        {
            tracing::warn!(
                "failed to schedule completion notification: {} ({})",
                e,
                e.suggestion()
            );
        }
    }

    fn pulse(&self, kind: HapticKind) {
        if !self.deps.haptics.is_available() {
            tracing::trace!("haptics unavailable; skipping {:?}", kind);
            return;
        }
        if let Err(e) = self.deps.haptics.pulse(kind) {
            tracing::warn!("haptic pulse {:?} failed: {} ({})", kind, e, e.suggestion());
        }
    }

    /// Hands the current state to the writer without waiting on the store.
    fn persist(&self) {
        let Some(writer) = &self.writer else {
            return;
        };
        let snapshot = TimerSnapshot {
            session_type: self.session_type,
            time_remaining: self.time_remaining,
            sessions_completed: self.sessions_completed,
            is_running: self.is_running,
            saved_at: Utc::now(),
        };
        writer.save(snapshot);
    }

    fn publish(&mut self, event: TimerEvent) {
        if self.observers.is_empty() {
            return;
        }
        let update = EngineUpdate {
            event,
            status: self.status(),
        };
        self.observers
            .retain(|observer| observer.send(update.clone()).is_ok());
    }
}

impl Drop for TimerEngine {
    fn drop(&mut self) {
        self.stop_ticker();
    }
}

// ============================================================================
// Tests
// ============================================================================

//! Repeating tick sources for the timer engine.
//!
//! The engine owns at most one [`ScheduledTick`] at a time. Every schedule is
//! tagged with a generation number carried by each [`Tick`] it emits, so a
//! tick that was already queued when its schedule got cancelled can be
//! recognised as stale and dropped.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::runtime::{Handle, TryCurrentError};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Duration, Instant, MissedTickBehavior};

/// Interval between ticks.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// One firing of a tick schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    /// Generation of the schedule that produced this tick.
    pub generation: u64,
}

/// Handle to an active repeating schedule.
pub trait ScheduledTick: Send {
    /// Stops the schedule. No tick is sent after this returns.
    fn cancel(&mut self);

    /// Returns true until the schedule is cancelled.
    fn is_active(&self) -> bool;
}

/// Host primitive for starting a repeating callback.
pub trait TickScheduler: Send {
    /// Starts sending `tick` on `tx` every `period`, first one `period` from now.
    fn schedule_repeating(
        &self,
        period: Duration,
        tick: Tick,
        tx: mpsc::UnboundedSender<Tick>,
    ) -> Box<dyn ScheduledTick>;
}

// ============================================================================
// TokioTickScheduler
// ============================================================================

/// Ticks driven by `tokio::time::interval` on a spawned task.
#[derive(Debug, Clone)]
pub struct TokioTickScheduler {
    runtime: Handle,
}

impl TokioTickScheduler {
    pub fn new(runtime: Handle) -> Self {
        Self { runtime }
    }

    /// Uses the runtime the caller is running on.
    pub fn from_current() -> Result<Self, TryCurrentError> {
        Ok(Self::new(Handle::try_current()?))
    }
}

impl TickScheduler for TokioTickScheduler {
    fn schedule_repeating(
        &self,
        period: Duration,
        tick: Tick,
        tx: mpsc::UnboundedSender<Tick>,
    ) -> Box<dyn ScheduledTick> {
        let task = self.runtime.spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                if tx.send(tick).is_err() {
                    break;
                }
            }
        });

        Box::new(TokioTick { task: Some(task) })
    }
}

struct TokioTick {
    task: Option<JoinHandle<()>>,
}

impl ScheduledTick for TokioTick {
    fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for TokioTick {
    fn drop(&mut self) {
        self.cancel();
    }
}

// ============================================================================
// ManualTickScheduler
// ============================================================================

#[derive(Default)]
struct ManualSlot {
    current: Option<(Tick, mpsc::UnboundedSender<Tick>, Arc<AtomicBool>)>,
    schedules: usize,
}

/// Scheduler whose ticks fire only when [`ManualTickScheduler::fire`] is called.
///
/// Clones share state, so a test can keep one clone and hand another to the
/// engine.
#[derive(Clone, Default)]
pub struct ManualTickScheduler {
    slot: Arc<Mutex<ManualSlot>>,
}

impl ManualTickScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sends one tick from the latest schedule if it is still active.
    pub fn fire(&self) -> bool {
        let slot = self.slot.lock().unwrap();
        match &slot.current {
            Some((tick, tx, active)) if active.load(Ordering::SeqCst) => tx.send(*tick).is_ok(),
            _ => false,
        }
    }

    /// Returns true if the latest schedule has not been cancelled.
    #[must_use]
    pub fn is_active(&self) -> bool {
        let slot = self.slot.lock().unwrap();
        slot.current
            .as_ref()
            .is_some_and(|(_, _, active)| active.load(Ordering::SeqCst))
    }

    /// Total number of schedules created.
    #[must_use]
    pub fn schedule_count(&self) -> usize {
        self.slot.lock().unwrap().schedules
    }
}

impl TickScheduler for ManualTickScheduler {
    fn schedule_repeating(
        &self,
        _period: Duration,
        tick: Tick,
        tx: mpsc::UnboundedSender<Tick>,
    ) -> Box<dyn ScheduledTick> {
        let active = Arc::new(AtomicBool::new(true));
        let mut slot = self.slot.lock().unwrap();
        slot.current = Some((tick, tx, Arc::clone(&active)));
        slot.schedules += 1;
        Box::new(ManualTick { active })
    }
}

struct ManualTick {
    active: Arc<AtomicBool>,
}

impl ScheduledTick for ManualTick {
    fn cancel(&mut self) {
        self.active.store(false, Ordering::SeqCst);
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

//! Integration tests for the timer engine and its collaborators.
//!
//! These tests drive the public API end to end:
//! - Full work/break cycles with long-break escalation
//! - Restart and restore through the JSON file store
//! - The driver task with real tokio ticks under virtual time

use std::sync::Arc;

use chrono::{Duration as ChronoDuration, Utc};
use tokio::sync::mpsc;
use tokio::time::Duration;

use pomowatch::engine::{
    EngineDeps, EngineDriver, ManualTickScheduler, Tick, TimerEngine, TimerEvent,
    TokioTickScheduler,
};
use pomowatch::feedback::{MockHaptics, MockNotifier};
use pomowatch::store::{JsonFileSnapshotStore, MemorySnapshotStore, SnapshotStore};
use pomowatch::types::{HapticKind, SessionState, SessionType, TimerSnapshot};

// ============================================================================
// Test Helpers
// ============================================================================

fn manual_engine(
    store: Arc<dyn SnapshotStore>,
) -> (
    TimerEngine,
    mpsc::UnboundedReceiver<Tick>,
    ManualTickScheduler,
    Arc<MockNotifier>,
    Arc<MockHaptics>,
) {
    let scheduler = ManualTickScheduler::new();
    let notifier = Arc::new(MockNotifier::new());
    let haptics = Arc::new(MockHaptics::new());
    let deps = EngineDeps {
        store,
        notifier: notifier.clone(),
        haptics: haptics.clone(),
        scheduler: Box::new(scheduler.clone()),
    };
    let (engine, ticks) = TimerEngine::restore(deps);
    (engine, ticks, scheduler, notifier, haptics)
}

/// Fires ticks until the current session expires.
fn run_to_completion(
    engine: &mut TimerEngine,
    ticks: &mut mpsc::UnboundedReceiver<Tick>,
    scheduler: &ManualTickScheduler,
) -> usize {
    let mut fired = 0;
    while engine.is_running() {
        assert!(scheduler.fire(), "schedule went inactive while running");
        while let Ok(tick) = ticks.try_recv() {
            engine.handle_tick(tick);
        }
        fired += 1;
    }
    fired
}

// ============================================================================
// Cycle Tests
// ============================================================================

#[test]
fn test_four_work_sessions_earn_a_long_break() {
    let store = Arc::new(MemorySnapshotStore::new());
    let (mut engine, mut ticks, scheduler, notifier, haptics) = manual_engine(store.clone());

    let mut sequence = Vec::new();
    for _ in 0..8 {
        sequence.push(engine.session_type());
        engine.start();
        let fired = run_to_completion(&mut engine, &mut ticks, &scheduler);
        assert_eq!(fired as f64, sequence.last().unwrap().duration());
        assert_eq!(engine.state(), SessionState::Idle);
    }

    assert_eq!(
        sequence,
        vec![
            SessionType::Work,
            SessionType::ShortBreak,
            SessionType::Work,
            SessionType::ShortBreak,
            SessionType::Work,
            SessionType::ShortBreak,
            SessionType::Work,
            SessionType::LongBreak,
        ]
    );
    assert_eq!(engine.sessions_completed(), 4);
    assert_eq!(engine.session_type(), SessionType::Work);
    assert_eq!(notifier.schedule_count(), 8);

    let completes = haptics
        .get_pulses()
        .into_iter()
        .filter(|kind| *kind == HapticKind::Complete)
        .count();
    assert_eq!(completes, 8);

    engine.flush_snapshots();
    let saved = store.current().unwrap();
    assert_eq!(saved.sessions_completed, 4);
    assert_eq!(saved.session_type, SessionType::Work);
}

#[test]
fn test_pause_resume_keeps_countdown_position() {
    let store = Arc::new(MemorySnapshotStore::new());
    let (mut engine, mut ticks, scheduler, notifier, _haptics) = manual_engine(store);

    engine.start();
    for _ in 0..100 {
        scheduler.fire();
        while let Ok(tick) = ticks.try_recv() {
            engine.handle_tick(tick);
        }
    }
    engine.pause();
    assert_eq!(engine.formatted_time(), "23:20");

    engine.start();
    assert_eq!(engine.state(), SessionState::Working);
    assert_eq!(
        notifier.get_scheduled(),
        vec![
            (SessionType::Work, Duration::from_secs(1500)),
            (SessionType::Work, Duration::from_secs(1400)),
        ]
    );
}

// ============================================================================
// Restore Tests
// ============================================================================

#[test]
fn test_restart_restores_paused_timer_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("timer.json");

    {
        let store: Arc<dyn SnapshotStore> = Arc::new(JsonFileSnapshotStore::new(&path));
        let (mut engine, mut ticks, scheduler, _n, _h) = manual_engine(store);
        engine.skip_to_next_session();
        engine.start();
        for _ in 0..30 {
            scheduler.fire();
            while let Ok(tick) = ticks.try_recv() {
                engine.handle_tick(tick);
            }
        }
        engine.pause();
    }

    let store: Arc<dyn SnapshotStore> = Arc::new(JsonFileSnapshotStore::new(&path));
    let (engine, _ticks, scheduler, notifier, _h) = manual_engine(store);

    assert_eq!(engine.state(), SessionState::Idle);
    assert_eq!(engine.session_type(), SessionType::ShortBreak);
    assert_eq!(engine.time_remaining(), 270.0);
    assert_eq!(engine.sessions_completed(), 1);
    assert!(!engine.is_running());
    assert!(!scheduler.is_active());
    assert_eq!(notifier.schedule_count(), 0);
}

#[test]
fn test_restart_never_auto_resumes() {
    let snapshot = TimerSnapshot {
        session_type: SessionType::Work,
        time_remaining: 1200.0,
        sessions_completed: 1,
        is_running: true,
        saved_at: Utc::now() - ChronoDuration::seconds(60),
    };
    let store = Arc::new(MemorySnapshotStore::seeded(snapshot));
    let (engine, _ticks, scheduler, _n, _h) = manual_engine(store);

    assert_eq!(engine.state(), SessionState::Idle);
    assert!(!engine.is_running());
    assert_eq!(scheduler.schedule_count(), 0);
    assert!(engine.time_remaining() <= 1140.0);
}

#[test]
fn test_restore_after_session_elapsed_starts_fresh() {
    let snapshot = TimerSnapshot {
        session_type: SessionType::Work,
        time_remaining: 30.0,
        sessions_completed: 3,
        is_running: true,
        saved_at: Utc::now() - ChronoDuration::minutes(5),
    };
    let store = Arc::new(MemorySnapshotStore::seeded(snapshot));
    let (engine, _ticks, _s, notifier, haptics) = manual_engine(store);

    assert_eq!(engine.state(), SessionState::Idle);
    assert_eq!(engine.session_type(), SessionType::Work);
    assert_eq!(engine.time_remaining(), 1500.0);
    // The unobserved completion is not counted.
    assert_eq!(engine.sessions_completed(), 3);
    assert_eq!(notifier.schedule_count(), 0);
    assert_eq!(haptics.pulse_count(), 0);
}

#[test]
fn test_corrupt_file_starts_fresh() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("timer.json");
    std::fs::write(&path, "not json").unwrap();

    let store: Arc<dyn SnapshotStore> = Arc::new(JsonFileSnapshotStore::new(&path));
    let (engine, _ticks, _s, _n, _h) = manual_engine(store);

    assert_eq!(engine.session_type(), SessionType::Work);
    assert_eq!(engine.time_remaining(), 1500.0);
    assert_eq!(engine.sessions_completed(), 0);
}

// ============================================================================
// Driver Tests
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_driver_short_break_runs_to_completion() {
    let store = Arc::new(MemorySnapshotStore::new());
    let deps = EngineDeps {
        store: store.clone(),
        notifier: Arc::new(MockNotifier::new()),
        haptics: Arc::new(MockHaptics::new()),
        scheduler: Box::new(TokioTickScheduler::from_current().unwrap()),
    };
    let (mut engine, ticks) = TimerEngine::restore(deps);
    engine.skip_to_next_session();

    let (handle, task) = EngineDriver::spawn(engine, ticks);
    let mut updates = handle.subscribe().await.unwrap();
    handle.start().await.unwrap();

    let mut last_progress = 0.0;
    let completed = loop {
        let update = updates.recv().await.unwrap();
        match update.event {
            TimerEvent::SessionCompleted { completed, next } => break (completed, next),
            TimerEvent::Tick { .. } => {
                assert!(update.status.progress >= last_progress);
                last_progress = update.status.progress;
            }
            _ => {}
        }
    };

    assert_eq!(completed, (SessionType::ShortBreak, SessionType::Work));

    // A second tick cycle must not start on its own.
    tokio::time::sleep(Duration::from_secs(10)).await;
    let status = handle.status().await.unwrap();
    assert_eq!(status.state, SessionState::Idle);
    assert_eq!(status.time_remaining, 1500.0);
    assert_eq!(status.sessions_completed, 1);

    handle.shutdown().await.unwrap();
    let engine = task.await.unwrap();
    assert!(!engine.is_running());
}

#[tokio::test(start_paused = true)]
async fn test_driver_double_start_keeps_single_tick_source() {
    let store = Arc::new(MemorySnapshotStore::new());
    let deps = EngineDeps {
        store,
        notifier: Arc::new(MockNotifier::new()),
        haptics: Arc::new(MockHaptics::new()),
        scheduler: Box::new(TokioTickScheduler::from_current().unwrap()),
    };
    let (engine, ticks) = TimerEngine::restore(deps);
    let (handle, _task) = EngineDriver::spawn(engine, ticks);

    handle.start().await.unwrap();
    handle.start().await.unwrap();
    tokio::time::sleep(Duration::from_millis(10_500)).await;

    let status = handle.status().await.unwrap();
    assert_eq!(status.time_remaining, 1490.0);
}

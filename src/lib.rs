//! Pomodoro Session Engine Library
//!
//! This library provides the core functionality for the Pomodoro timer.
//! It includes:
//! - Timer engine with the work/break state machine and countdown
//! - Snapshot persistence for resuming after a restart
//! - Notification and haptic collaborators fired at session boundaries
//! - CLI command parsing and display utilities
//! - Type definitions for sessions, snapshots and observable status

pub mod cli;
pub mod engine;
pub mod feedback;
pub mod store;
pub mod types;

// Re-export commonly used types for convenience
pub use types::{
    HapticKind, SessionState, SessionType, TimerSnapshot, TimerStatus, LONG_BREAK_INTERVAL,
};

pub use engine::{
    EngineDeps, EngineDriver, EngineHandle, EngineUpdate, ManualTickScheduler, TimerEngine,
    TimerEvent, TokioTickScheduler,
};

pub use feedback::{
    FeedbackError, HapticPlayer, MockHaptics, MockNotifier, NotificationContent, Notifier,
    TerminalHaptics, TerminalNotifier,
};

pub use store::{JsonFileSnapshotStore, MemorySnapshotStore, SnapshotStore, StoreError};

//! Core data types for the Pomodoro engine.
//!
//! This module defines the data structures used for:
//! - Session types and their fixed durations
//! - Session state derived from the running flag
//! - Persisted timer snapshots
//! - The observable timer status exposed to the UI

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Constants
// ============================================================================

/// Number of completed work sessions between long breaks.
pub const LONG_BREAK_INTERVAL: u32 = 4;

/// Work session duration in seconds (25 minutes).
pub const WORK_SECONDS: f64 = 25.0 * 60.0;

/// Short break duration in seconds (5 minutes).
pub const SHORT_BREAK_SECONDS: f64 = 5.0 * 60.0;

/// Long break duration in seconds (15 minutes).
pub const LONG_BREAK_SECONDS: f64 = 15.0 * 60.0;

// ============================================================================
// SessionType
// ============================================================================

/// The kind of interval being timed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionType {
    /// Focused work interval
    #[default]
    Work,
    /// Short rest between work sessions
    ShortBreak,
    /// Longer rest after every fourth work session
    LongBreak,
}

impl SessionType {
    /// Returns the fixed duration of this session in seconds.
    pub fn duration(&self) -> f64 {
        match self {
            SessionType::Work => WORK_SECONDS,
            SessionType::ShortBreak => SHORT_BREAK_SECONDS,
            SessionType::LongBreak => LONG_BREAK_SECONDS,
        }
    }

    /// Returns the human readable label.
    pub fn label(&self) -> &'static str {
        match self {
            SessionType::Work => "Work Session",
            SessionType::ShortBreak => "Short Break",
            SessionType::LongBreak => "Long Break",
        }
    }

    /// Returns the string representation used in snapshots and JSON output.
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionType::Work => "work",
            SessionType::ShortBreak => "shortBreak",
            SessionType::LongBreak => "longBreak",
        }
    }

    /// Returns true for either kind of break.
    pub fn is_break(&self) -> bool {
        !matches!(self, SessionType::Work)
    }

    /// Picks the session that follows this one.
    ///
    /// `sessions_completed` must already include the work session that just
    /// finished.
    pub fn next(&self, sessions_completed: u32) -> SessionType {
        match self {
            SessionType::Work if should_show_long_break(sessions_completed) => {
                SessionType::LongBreak
            }
            SessionType::Work => SessionType::ShortBreak,
            SessionType::ShortBreak | SessionType::LongBreak => SessionType::Work,
        }
    }
}

/// Returns true when the completed count calls for a long break.
pub fn should_show_long_break(sessions_completed: u32) -> bool {
    sessions_completed > 0 && sessions_completed % LONG_BREAK_INTERVAL == 0
}

// ============================================================================
// SessionState
// ============================================================================

/// Run state of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionState {
    /// Not started, or resting after a transition
    #[default]
    Idle,
    /// Counting down a work session
    Working,
    /// Counting down a break
    OnBreak,
    /// Countdown suspended with remaining time preserved
    Paused,
}

impl SessionState {
    /// Derives the active state for a running session of the given type.
    pub fn running(session_type: SessionType) -> Self {
        if session_type.is_break() {
            SessionState::OnBreak
        } else {
            SessionState::Working
        }
    }

    /// Returns the human readable name.
    pub fn display_name(&self) -> &'static str {
        match self {
            SessionState::Idle => "Ready",
            SessionState::Working => "Work Time",
            SessionState::OnBreak => "Break Time",
            SessionState::Paused => "Paused",
        }
    }

    /// Returns true if the countdown is ticking.
    pub fn is_active(&self) -> bool {
        matches!(self, SessionState::Working | SessionState::OnBreak)
    }
}

// ============================================================================
// HapticKind
// ============================================================================

/// Haptic pulse requested at a transition boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HapticKind {
    Start,
    Pause,
    Complete,
}

// ============================================================================
// TimerSnapshot
// ============================================================================

/// Persisted copy of the engine state used to resume after a restart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    #[serde(rename = "sessionType")]
    pub session_type: SessionType,
    #[serde(rename = "timeRemaining")]
    pub time_remaining: f64,
    #[serde(rename = "sessionsCompleted")]
    pub sessions_completed: u32,
    #[serde(rename = "isRunning")]
    pub is_running: bool,
    /// Stamped by the store on save.
    #[serde(rename = "savedAt")]
    pub saved_at: DateTime<Utc>,
}

impl TimerSnapshot {
    /// Returns true if the remaining time fits the session duration.
    pub fn is_valid(&self) -> bool {
        self.time_remaining.is_finite()
            && self.time_remaining >= 0.0
            && self.time_remaining <= self.session_type.duration()
    }

    /// Seconds between `saved_at` and `now`, clamped at zero for clock skew.
    pub fn elapsed_since_save(&self, now: DateTime<Utc>) -> f64 {
        let millis = (now - self.saved_at).num_milliseconds();
        (millis.max(0) as f64) / 1000.0
    }

    /// Remaining time after accounting for wall-clock time spent closed.
    ///
    /// Only a running timer decays; a paused or idle one keeps its value.
    pub fn actual_remaining(&self, now: DateTime<Utc>) -> f64 {
        if self.is_running {
            self.time_remaining - self.elapsed_since_save(now)
        } else {
            self.time_remaining
        }
    }
}

// ============================================================================
// TimerStatus
// ============================================================================

/// Observable view of the engine, including derived fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerStatus {
    pub state: SessionState,
    #[serde(rename = "sessionType")]
    pub session_type: SessionType,
    #[serde(rename = "timeRemaining")]
    pub time_remaining: f64,
    #[serde(rename = "sessionsCompleted")]
    pub sessions_completed: u32,
    #[serde(rename = "isRunning")]
    pub is_running: bool,
    pub progress: f64,
    #[serde(rename = "formattedTime")]
    pub formatted_time: String,
}

/// Fraction of `session_type` already elapsed, in [0, 1].
pub fn progress(session_type: SessionType, time_remaining: f64) -> f64 {
    let total = session_type.duration();
    ((total - time_remaining) / total).clamp(0.0, 1.0)
}

/// Formats seconds as zero-padded `MM:SS`, truncating fractions.
pub fn format_time(time_remaining: f64) -> String {
    let whole = time_remaining.max(0.0).floor() as u64;
    format!("{:02}:{:02}", whole / 60, whole % 60)
}

// ============================================================================
// Tests
// ============================================================================

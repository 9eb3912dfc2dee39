//! Display utilities for the Pomodoro CLI.
//!
//! This module provides formatted output for:
//! - Status display
//! - Live countdown line
//! - Engine updates (start, pause, skip, completion)
//! - Error messages

use std::io::Write;

use crate::engine::{EngineUpdate, TimerEvent};
use crate::types::TimerStatus;

/// Width of the progress bar in characters.
const BAR_WIDTH: usize = 20;

// ============================================================================
// Display
// ============================================================================

/// Display utilities for CLI output.
pub struct Display;

impl Display {
    /// Shows the current timer status.
    pub fn show_status(status: &TimerStatus) {
        println!("{}", Self::status_text(status));
    }

    /// Renders the status block shown by `status`.
    pub fn status_text(status: &TimerStatus) -> String {
        let mut lines = vec![
            "Pomodoro status".to_string(),
            "─────────────────────────────".to_string(),
            format!("State:     {}", status.state.display_name()),
            format!("Session:   {}", status.session_type.label()),
            format!("Remaining: {}", status.formatted_time),
            format!("Progress:  {}", Self::progress_bar(status.progress)),
            format!("Completed: {}", status.sessions_completed),
        ];
        if crate::types::should_show_long_break(status.sessions_completed) {
            lines.push("Long break earned".to_string());
        }
        lines.join("\n")
    }

    /// Renders `[####----] 40%` for a progress fraction.
    pub fn progress_bar(progress: f64) -> String {
        let progress = progress.clamp(0.0, 1.0);
        let filled = (progress * BAR_WIDTH as f64).floor() as usize;
        format!(
            "[{}{}] {:>3}%",
            "#".repeat(filled),
            "-".repeat(BAR_WIDTH - filled),
            (progress * 100.0).floor() as u32
        )
    }

    /// Renders one engine update as a line of output.
    pub fn update_text(update: &EngineUpdate) -> String {
        let status = &update.status;
        match &update.event {
            TimerEvent::Started { session_type } => {
                format!("> {} started ({})", session_type.label(), status.formatted_time)
            }
            TimerEvent::Paused => format!("|| Paused at {}", status.formatted_time),
            TimerEvent::Reset { hard: false } => "[] Timer reset".to_string(),
            TimerEvent::Reset { hard: true } => "[] Timer reset, completed count cleared".to_string(),
            TimerEvent::Skipped { from, to } => {
                format!(">> Skipped {} -> {}", from.label(), to.label())
            }
            TimerEvent::Tick { .. } => format!(
                "  {}  {}  {}",
                status.session_type.label(),
                status.formatted_time,
                Self::progress_bar(status.progress)
            ),
            TimerEvent::SessionCompleted { completed, next } => format!(
                "* {} complete! ({} completed) Next: {}",
                completed.label(),
                status.sessions_completed,
                next.label()
            ),
        }
    }

    /// Shows an engine update; ticks overwrite the current line.
    pub fn show_update(update: &EngineUpdate) {
        let text = Self::update_text(update);
        if matches!(update.event, TimerEvent::Tick { .. }) {
            print!("\r{}", text);
            let _ = std::io::stdout().flush();
        } else {
            println!("\r{}", text);
        }
    }

    /// Shows the interactive controls available during `run`.
    pub fn show_controls() {
        println!("Controls: [s]tart  [p]ause  [n]ext  [r]eset  hard-reset  [i]nfo  [q]uit");
    }

    /// Shows an error message.
    pub fn show_error(message: &str) {
        eprintln!("Error: {}", message);
    }
}

//! Command definitions for the Pomodoro CLI.
//!
//! Uses clap derive macro for argument parsing.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::store::default_state_path;

// ============================================================================
// CLI Structure
// ============================================================================

/// Pomodoro timer with a restorable countdown
#[derive(Parser, Debug)]
#[command(
    name = "pomowatch",
    version,
    about = "Pomodoro timer: 25 minute work sessions, 5 minute breaks, a 15 minute break every fourth session",
    propagate_version = true
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Location of the saved timer
    #[arg(long, global = true, env = "POMOWATCH_STATE", value_name = "PATH")]
    pub state_file: Option<PathBuf>,
}

impl Cli {
    /// Returns the snapshot path, falling back to the platform default.
    pub fn state_path(&self) -> PathBuf {
        self.state_file.clone().unwrap_or_else(default_state_path)
    }
}

// ============================================================================
// Subcommands
// ============================================================================

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run the timer in the foreground until the session ends
    Run(RunArgs),

    /// Show the saved timer
    Status {
        /// Print the status as JSON
        #[arg(long)]
        json: bool,
    },

    /// Skip to the next session (a skipped work session still counts)
    Skip,

    /// Reset to a fresh work session, keeping the completed count
    Reset,

    /// Reset to a fresh work session and clear the completed count
    HardReset,

    /// Generate shell completion scripts
    Completions {
        /// Shell type for completion script
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// ============================================================================
// Run Command Arguments
// ============================================================================

/// Arguments for the run command
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Do not ring the terminal bell at start, pause and completion
    #[arg(long)]
    pub no_bell: bool,
}

// ============================================================================
// Interactive Controls
// ============================================================================

/// A control typed on stdin while `run` is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Start,
    Pause,
    Skip,
    Reset,
    HardReset,
    Status,
    Quit,
}

impl Control {
    /// Parses one input line; blank or unknown input yields `None`.
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim().to_ascii_lowercase().as_str() {
            "s" | "start" | "resume" => Some(Control::Start),
            "p" | "pause" => Some(Control::Pause),
            "n" | "next" | "skip" => Some(Control::Skip),
            "r" | "reset" => Some(Control::Reset),
            "hard-reset" | "hardreset" => Some(Control::HardReset),
            "i" | "status" => Some(Control::Status),
            "q" | "quit" | "exit" => Some(Control::Quit),
            _ => None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

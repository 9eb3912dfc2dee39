//! Engine module for the Pomodoro timer.
//!
//! This module contains the countdown core:
//! - `timer`: State machine, restore protocol and side-effect requests
//! - `ticker`: Owned, cancellable repeating tick sources
//! - `driver`: Single-owner task serializing operations and ticks

pub mod driver;
pub mod ticker;
pub mod timer;

pub use driver::{EngineDriver, EngineHandle, EngineStopped};
pub use ticker::{ManualTickScheduler, ScheduledTick, Tick, TickScheduler, TokioTickScheduler};
pub use timer::{EngineDeps, EngineUpdate, TimerEngine, TimerEvent};

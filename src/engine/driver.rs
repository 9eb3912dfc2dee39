//! Single-owner task around [`TimerEngine`].
//!
//! The driver owns the engine and serializes operations arriving through an
//! [`EngineHandle`] with ticks arriving from the engine's own schedule.
//! Operations are polled first, so a pause queued alongside a tick always
//! cancels the schedule before the tick is looked at.

use std::ops::ControlFlow;

use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use super::ticker::Tick;
use super::timer::{EngineUpdate, TimerEngine};
use crate::types::TimerStatus;

/// Capacity of the command queue.
const COMMAND_BUFFER: usize = 32;

/// The driver task has stopped and can no longer take commands.
#[derive(Debug, Error)]
#[error("timer engine task has stopped")]
pub struct EngineStopped;

enum Command {
    Start,
    Pause,
    Reset,
    HardReset,
    Skip,
    Status(oneshot::Sender<TimerStatus>),
    Subscribe(oneshot::Sender<mpsc::UnboundedReceiver<EngineUpdate>>),
    Shutdown,
}

/// Cloneable handle for sending operations to a running driver.
#[derive(Debug, Clone)]
pub struct EngineHandle {
    tx: mpsc::Sender<Command>,
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Command::Start => "Start",
            Command::Pause => "Pause",
            Command::Reset => "Reset",
            Command::HardReset => "HardReset",
            Command::Skip => "Skip",
            Command::Status(_) => "Status",
            Command::Subscribe(_) => "Subscribe",
            Command::Shutdown => "Shutdown",
        };
        f.write_str(name)
    }
}

impl EngineHandle {
    async fn send(&self, command: Command) -> Result<(), EngineStopped> {
        self.tx.send(command).await.map_err(|_| EngineStopped)
    }

    pub async fn start(&self) -> Result<(), EngineStopped> {
        self.send(Command::Start).await
    }

    pub async fn pause(&self) -> Result<(), EngineStopped> {
        self.send(Command::Pause).await
    }

    pub async fn reset(&self) -> Result<(), EngineStopped> {
        self.send(Command::Reset).await
    }

    pub async fn hard_reset(&self) -> Result<(), EngineStopped> {
        self.send(Command::HardReset).await
    }

    pub async fn skip_to_next_session(&self) -> Result<(), EngineStopped> {
        self.send(Command::Skip).await
    }

    /// Returns the engine state after every previously sent command.
    pub async fn status(&self) -> Result<TimerStatus, EngineStopped> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Status(tx)).await?;
        rx.await.map_err(|_| EngineStopped)
    }

    /// Subscribes to every state change from now on.
    pub async fn subscribe(&self) -> Result<mpsc::UnboundedReceiver<EngineUpdate>, EngineStopped> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Subscribe(tx)).await?;
        rx.await.map_err(|_| EngineStopped)
    }

    /// Stops the driver; its join handle yields the engine back.
    pub async fn shutdown(&self) -> Result<(), EngineStopped> {
        self.send(Command::Shutdown).await
    }
}

/// Owns the engine and its tick receiver.
pub struct EngineDriver {
    engine: TimerEngine,
    ticks: mpsc::UnboundedReceiver<Tick>,
    commands: mpsc::Receiver<Command>,
}

impl EngineDriver {
    /// Spawns the driver on the current runtime.
    ///
    /// The task ends when [`EngineHandle::shutdown`] is called or every handle
    /// is dropped, returning the engine.
    pub fn spawn(
        engine: TimerEngine,
        ticks: mpsc::UnboundedReceiver<Tick>,
    ) -> (EngineHandle, JoinHandle<TimerEngine>) {
        let (tx, commands) = mpsc::channel(COMMAND_BUFFER);
        let driver = Self {
            engine,
            ticks,
            commands,
        };
        (EngineHandle { tx }, tokio::spawn(driver.run()))
    }

    async fn run(mut self) -> TimerEngine {
        loop {
            tokio::select! {
                biased;

                command = self.commands.recv() => {
                    let Some(command) = command else { break };
                    if self.apply(command).is_break() {
                        break;
                    }
                }
                Some(tick) = self.ticks.recv() => {
                    self.engine.handle_tick(tick);
                }
            }
        }

        tracing::debug!("engine driver stopped");
        self.engine
    }

    fn apply(&mut self, command: Command) -> ControlFlow<()> {
        tracing::trace!("applying {:?}", command);
        match command {
            Command::Start => {
                self.engine.start();
            }
            Command::Pause => {
                self.engine.pause();
            }
            Command::Reset => self.engine.reset(),
            Command::HardReset => self.engine.hard_reset(),
            Command::Skip => self.engine.skip_to_next_session(),
            Command::Status(reply) => {
                let _ = reply.send(self.engine.status());
            }
            Command::Subscribe(reply) => {
                let _ = reply.send(self.engine.subscribe());
            }
            Command::Shutdown => return ControlFlow::Break(()),
        }
        ControlFlow::Continue(())
    }
}

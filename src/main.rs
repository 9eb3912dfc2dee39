//! Pomowatch CLI - a Pomodoro timer with a restorable countdown
//!
//! The Pomodoro Technique in short:
//! - 25 minutes of focused work
//! - 5 minutes of short break
//! - 15 minutes of long break after every 4th work session

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use pomowatch::cli::{Cli, Commands, Control, Display, RunArgs};
use pomowatch::engine::{
    EngineDeps, EngineDriver, EngineHandle, Tick, TimerEngine, TimerEvent, TokioTickScheduler,
};
use pomowatch::feedback::{TerminalHaptics, TerminalNotifier};
use pomowatch::store::JsonFileSnapshotStore;

/// Main entry point
#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    init_tracing(cli.verbose);

    // Execute command
    if let Err(e) = execute(cli).await {
        Display::show_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber for logging.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

/// Executes the CLI command.
async fn execute(cli: Cli) -> Result<()> {
    match &cli.command {
        Some(Commands::Run(args)) => {
            let (engine, ticks) = build_engine(&cli, args)?;
            run_foreground(engine, ticks).await?;
        }
        Some(Commands::Status { json }) => {
            let status = TimerEngine::inspect(build_deps(&cli, &RunArgs::default())?);
            if *json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&status).context("failed to encode status")?
                );
            } else {
                Display::show_status(&status);
            }
        }
        Some(Commands::Skip) => {
            let (mut engine, _ticks) = build_engine(&cli, &RunArgs::default())?;
            engine.skip_to_next_session();
            Display::show_status(&engine.status());
        }
        Some(Commands::Reset) => {
            let (mut engine, _ticks) = build_engine(&cli, &RunArgs::default())?;
            engine.reset();
            Display::show_status(&engine.status());
        }
        Some(Commands::HardReset) => {
            let (mut engine, _ticks) = build_engine(&cli, &RunArgs::default())?;
            engine.hard_reset();
            Display::show_status(&engine.status());
        }
        Some(Commands::Completions { shell }) => {
            generate_completions(*shell);
        }
        None => {
            // No command provided, show help
            Cli::command().print_help()?;
        }
    }

    Ok(())
}

/// Restores the engine from the configured snapshot file.
fn build_engine(cli: &Cli, args: &RunArgs) -> Result<(TimerEngine, mpsc::UnboundedReceiver<Tick>)> {
    Ok(TimerEngine::restore(build_deps(cli, args)?))
}

/// Wires the file store and terminal collaborators.
fn build_deps(cli: &Cli, args: &RunArgs) -> Result<EngineDeps> {
    let path = cli.state_path();
    tracing::debug!("using state file {}", path.display());

    Ok(EngineDeps {
        store: Arc::new(JsonFileSnapshotStore::new(path)),
        notifier: Arc::new(TerminalNotifier::new()),
        haptics: Arc::new(TerminalHaptics::new(!args.no_bell)),
        scheduler: Box::new(
            TokioTickScheduler::from_current().context("no async runtime for the tick loop")?,
        ),
    })
}

/// Runs the countdown in the foreground, reading controls from stdin.
///
/// Returns when the session completes, on `quit`, or on Ctrl-C. Quitting
/// pauses first so the remaining time is saved.
async fn run_foreground(engine: TimerEngine, ticks: mpsc::UnboundedReceiver<Tick>) -> Result<()> {
    let (handle, task) = EngineDriver::spawn(engine, ticks);
    let mut updates = handle.subscribe().await?;

    Display::show_controls();
    handle.start().await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            update = updates.recv() => {
                let Some(update) = update else { break };
                Display::show_update(&update);
                if matches!(update.event, TimerEvent::SessionCompleted { .. }) {
                    break;
                }
            }
            line = lines.next_line(), if stdin_open => match line {
                Ok(Some(line)) => {
                    if apply_control(&handle, &line).await? {
                        break;
                    }
                }
                Ok(None) => stdin_open = false,
                Err(e) => {
                    tracing::warn!("stopped reading controls: {}", e);
                    stdin_open = false;
                }
            },
            _ = tokio::signal::ctrl_c() => {
                handle.pause().await?;
                break;
            }
        }
    }

    // Flush whatever the last command produced before printing the summary.
    let status = handle.status().await?;
    while let Ok(update) = updates.try_recv() {
        Display::show_update(&update);
    }
    handle.shutdown().await?;
    task.await.context("timer engine task failed")?;

    println!();
    Display::show_status(&status);
    Ok(())
}

/// Applies one stdin control. Returns true when the loop should end.
async fn apply_control(handle: &EngineHandle, line: &str) -> Result<bool> {
    let Some(control) = Control::parse(line) else {
        if !line.trim().is_empty() {
            Display::show_error(&format!("unknown control: {}", line.trim()));
        }
        return Ok(false);
    };

    match control {
        Control::Start => handle.start().await?,
        Control::Pause => handle.pause().await?,
        Control::Skip => handle.skip_to_next_session().await?,
        Control::Reset => handle.reset().await?,
        Control::HardReset => handle.hard_reset().await?,
        Control::Status => Display::show_status(&handle.status().await?),
        Control::Quit => {
            handle.pause().await?;
            return Ok(true);
        }
    }
    Ok(false)
}

/// Generates shell completion scripts.
fn generate_completions(shell: clap_complete::Shell) {
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut io::stdout());
}

// ============================================================================
// Tests
// ============================================================================

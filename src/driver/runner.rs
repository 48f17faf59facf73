//! Driver task: command loop, tick loop and event fan-out.

use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::core::ClockSource;
use crate::error::EngineError;
use crate::game::PlayerInput;
use super::{Engine, RoundSummary};

/// Player-side commands.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Begin a round
    Start,
    /// Submit an input
    Input(PlayerInput),
    /// End the round early
    Finish,
    /// Back to idle
    Reset,
    /// Stop the driver
    Shutdown,
}

/// What the driver reports when it stops.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DriverReport {
    /// When the driver started
    pub started_at: DateTime<Utc>,
    /// When the last round finished, if it did
    pub finished_at: Option<DateTime<Utc>>,
    /// When the driver stopped
    pub stopped_at: DateTime<Utc>,
    /// Ticks applied
    pub ticks: u64,
    /// Commands the engine rejected
    pub rejected_commands: u32,
    /// Final state of the engine
    pub summary: RoundSummary,
}

/// Handle to a spawned driver.
pub struct DriverHandle<E: Engine> {
    commands: mpsc::Sender<Command>,
    events: broadcast::Sender<E::Event>,
    task: JoinHandle<DriverReport>,
}

impl<E: Engine> DriverHandle<E> {
    /// Queue a command. Returns false if the driver has stopped.
    pub async fn send(&self, command: Command) -> bool {
        self.commands.send(command).await.is_ok()
    }

    /// Receive notifications emitted from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<E::Event> {
        self.events.subscribe()
    }

    /// Ask the driver to stop and wait for its report.
    pub async fn shutdown(self) -> Result<DriverReport, tokio::task::JoinError> {
        // A closed channel also stops the driver.
        let _ = self.commands.send(Command::Shutdown).await;
        self.task.await
    }
}

/// Spawn a driver task for an engine.
pub fn spawn<E, C>(engine: E, clock: C, capacity: usize) -> DriverHandle<E>
where
    E: Engine,
    C: ClockSource + 'static,
{
    let (command_tx, command_rx) = mpsc::channel(capacity.max(1));
    let (event_tx, _) = broadcast::channel(capacity.max(16));

    let events = event_tx.clone();
    let task = tokio::spawn(run(engine, clock, command_rx, events));

    DriverHandle {
        commands: command_tx,
        events: event_tx,
        task,
    }
}

/// Run the driver loop until shutdown, channel close or clock exhaustion.
pub async fn run<E, C>(
    mut engine: E,
    mut clock: C,
    mut commands: mpsc::Receiver<Command>,
    events: broadcast::Sender<E::Event>,
) -> DriverReport
where
    E: Engine,
    C: ClockSource,
{
    let started_at = Utc::now();
    let mut finished_at = None;
    let mut ticks = 0u64;
    let mut rejected_commands = 0u32;

    info!("Driver started");

    loop {
        tokio::select! {
            biased;

            command = commands.recv() => {
                match command {
                    None | Some(Command::Shutdown) => {
                        info!("Driver shutting down");
                        break;
                    }
                    Some(command) => {
                        if let Err(err) = apply(&mut engine, command) {
                            warn!("Command rejected: {}", err);
                            rejected_commands += 1;
                        }
                    }
                }
            }
            tick = clock.next_tick() => {
                match tick {
                    Some(_) => {
                        engine.tick();
                        ticks += 1;
                    }
                    None => {
                        info!("Clock exhausted");
                        break;
                    }
                }
            }
        }

        for event in engine.take_events() {
            // No subscribers is not an error.
            let _ = events.send(event);
        }

        if engine.is_finished() {
            if finished_at.is_none() {
                let summary = engine.summary();
                info!(score = summary.final_score, rank = ?summary.final_rank, "Round finished");
                finished_at = Some(Utc::now());
            }
        } else {
            finished_at = None;
        }
    }

    DriverReport {
        started_at,
        finished_at,
        stopped_at: Utc::now(),
        ticks,
        rejected_commands,
        summary: engine.summary(),
    }
}

fn apply<E: Engine>(engine: &mut E, command: Command) -> Result<(), EngineError> {
    match command {
        Command::Start => engine.start(),
        Command::Input(input) => {
            if engine.submit_input(input).is_none() {
                debug!("Input arrived outside an input window");
            }
            Ok(())
        }
        Command::Finish => engine.finish(),
        Command::Reset => {
            engine.reset();
            Ok(())
        }
        Command::Shutdown => Ok(()),
    }
}

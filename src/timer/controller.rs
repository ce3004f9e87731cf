use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use tokio::{
    sync::{mpsc, oneshot, watch, Mutex},
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;

use super::{PreciseInterval, RoutineSnapshot, TickTarget, TimerState, TimerStatus};
use crate::models::Routine;
use crate::settings::AppConfig;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_error, log_info};

type RoutineTask = Box<dyn FnOnce(&mut Routine) + Send + 'static>;

enum TimerCommand {
    Play,
    Pause,
    Toggle,
    Confirm,
    Reset,
    Execute(RoutineTask),
    Load(Box<Routine>),
    Shutdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerConfig {
    pub ticks_per_second: u32,
    pub autoplay: bool,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            ticks_per_second: 30,
            autoplay: false,
        }
    }
}

impl From<&AppConfig> for TimerConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            ticks_per_second: config.ticks_per_second,
            autoplay: config.autoplay,
        }
    }
}

/// Handle to the task that owns a routine while it runs.
///
/// The routine is never shared: ticks and commands are both handled on the worker
/// task, one at a time. Readers get snapshots through a watch channel.
#[derive(Clone)]
pub struct TimerController {
    commands: mpsc::UnboundedSender<TimerCommand>,
    snapshots: watch::Receiver<RoutineSnapshot>,
    cancel_token: CancellationToken,
    worker: Arc<Mutex<Option<JoinHandle<Routine>>>>,
}

impl TimerController {
    /// Spawns the worker on the current tokio runtime.
    pub fn spawn(routine: Routine, config: TimerConfig) -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) =
            watch::channel(RoutineSnapshot::capture(&routine, &TimerState::new()));
        let cancel_token = CancellationToken::new();

        let worker = tokio::spawn(timer_loop(
            routine,
            config,
            command_rx,
            snapshot_tx,
            cancel_token.clone(),
        ));

        Self {
            commands: command_tx,
            snapshots: snapshot_rx,
            cancel_token,
            worker: Arc::new(Mutex::new(Some(worker))),
        }
    }

    pub fn play(&self) -> Result<()> {
        self.send(TimerCommand::Play)
    }

    pub fn pause(&self) -> Result<()> {
        self.send(TimerCommand::Pause)
    }

    pub fn toggle(&self) -> Result<()> {
        self.send(TimerCommand::Toggle)
    }

    /// Completes the current manual segment.
    pub fn confirm(&self) -> Result<()> {
        self.send(TimerCommand::Confirm)
    }

    pub fn reset(&self) -> Result<()> {
        self.send(TimerCommand::Reset)
    }

    /// Swaps in another routine and returns the timer to idle.
    pub fn load(&self, routine: Routine) -> Result<()> {
        self.send(TimerCommand::Load(Box::new(routine)))
    }

    /// Runs `task` against the routine on the worker and returns its result.
    pub async fn execute<F, T>(&self, task: F) -> Result<T>
    where
        F: FnOnce(&mut Routine) -> T + Send + 'static,
        T: Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.send(TimerCommand::Execute(Box::new(move |routine| {
            if reply_tx.send(task(routine)).is_err() {
                log_error!("Timer caller dropped before receiving result");
            }
        })))?;

        reply_rx
            .await
            .map_err(|_| anyhow!("timer worker terminated unexpectedly"))
    }

    pub fn snapshot(&self) -> RoutineSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<RoutineSnapshot> {
        self.snapshots.clone()
    }

    /// Stops the worker and hands back the routine it owned.
    pub async fn shutdown(&self) -> Result<Routine> {
        let _ = self.commands.send(TimerCommand::Shutdown);
        self.cancel_token.cancel();

        let handle = self
            .worker
            .lock()
            .await
            .take()
            .ok_or_else(|| anyhow!("timer already shut down"))?;
        handle.await.context("timer worker task failed to join")
    }

    fn send(&self, command: TimerCommand) -> Result<()> {
        self.commands
            .send(command)
            .map_err(|_| anyhow!("timer worker is not running"))
    }
}

async fn timer_loop(
    mut routine: Routine,
    config: TimerConfig,
    mut commands: mpsc::UnboundedReceiver<TimerCommand>,
    snapshots: watch::Sender<RoutineSnapshot>,
    cancel_token: CancellationToken,
) -> Routine {
    let mut clock = PreciseInterval::new(config.ticks_per_second);
    let mut ticker = time::interval(clock.period());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut state = TimerState::new();
    if config.autoplay {
        play(&mut state, &routine, &mut clock, &mut ticker);
        publish(&snapshots, &routine, &state);
    }

    log_info!("Timer started for routine '{}'", routine.name());

    loop {
        tokio::select! {
            _ = ticker.tick(), if state.is_running() => {
                let delta = clock.tick(Instant::now());
                routine.on_tick(delta);
                state.record_tick(delta);
                state.sync_finished(routine.is_finished());
                if state.status == TimerStatus::Finished {
                    log_info!("Routine '{}' finished after {}ms", routine.name(), state.elapsed_ms);
                }
            }
            command = commands.recv() => {
                let Some(command) = command else { break };
                if matches!(command, TimerCommand::Shutdown) {
                    break;
                }
                apply(command, &mut routine, &mut state, &mut clock, &mut ticker);
            }
            _ = cancel_token.cancelled() => break,
        }

        publish(&snapshots, &routine, &state);
    }

    log_info!("Timer loop shutting down");
    routine
}

fn apply(
    command: TimerCommand,
    routine: &mut Routine,
    state: &mut TimerState,
    clock: &mut PreciseInterval,
    ticker: &mut time::Interval,
) {
    match command {
        TimerCommand::Play => play(state, routine, clock, ticker),
        TimerCommand::Pause => state.pause(),
        TimerCommand::Toggle if state.is_running() => state.pause(),
        TimerCommand::Toggle => play(state, routine, clock, ticker),
        TimerCommand::Confirm => {
            if state.status != TimerStatus::Finished {
                routine.on_confirm();
                log_debug!("Confirmed manual segment in '{}'", routine.name());
            }
        }
        TimerCommand::Reset => {
            routine.reset();
            state.reset();
            clock.restart();
        }
        TimerCommand::Execute(task) => task(routine),
        TimerCommand::Load(next) => {
            log_info!("Loaded routine '{}' in place of '{}'", next.name(), routine.name());
            *routine = *next;
            state.reset();
            clock.restart();
        }
        TimerCommand::Shutdown => {}
    }
    state.sync_finished(routine.is_finished());
}

fn play(
    state: &mut TimerState,
    routine: &Routine,
    clock: &mut PreciseInterval,
    ticker: &mut time::Interval,
) {
    if state.is_running() || state.status == TimerStatus::Finished {
        return;
    }

    state.start(Utc::now());
    // The first delta after a (re)start is nominal, so the next wake-up must be a
    // full period away.
    clock.restart();
    ticker.reset();
    state.sync_finished(routine.is_finished());
}

fn publish(snapshots: &watch::Sender<RoutineSnapshot>, routine: &Routine, state: &TimerState) {
    let next = RoutineSnapshot::capture(routine, state);
    snapshots.send_if_modified(|current| {
        if *current == next {
            false
        } else {
            *current = next;
            true
        }
    });
}

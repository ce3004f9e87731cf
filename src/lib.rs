mod editor;
mod engine;
pub mod error;
pub mod events;
pub mod models;
pub mod persistence;
pub mod settings;
pub mod shell;
pub mod timer;
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;

use std::path::PathBuf;

use anyhow::Context;

pub use error::{Result, RoutineError};
pub use events::{Event, EventLog};
pub use models::{
    ManualSegment, RepeatSegment, Routine, Segment, SegmentGroup, SegmentId, SegmentKind,
    TimeSegment,
};
pub use persistence::{decode, encode, encode_pretty, RoutineStore};
pub use timer::{RoutineSnapshot, TickTarget, TimerConfig, TimerController};

use settings::{debug_from_env, SettingsStore, DEFAULT_SETTINGS_PATH};

const UNTITLED: &str = "Untitled";

/// Entry point of the `workout-timer` binary: `workout-timer [ROUTINE]`.
pub fn run() -> anyhow::Result<()> {
    // Initialize logging (reads RUST_LOG env var)
    let level = if debug_from_env() {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    log::info!("Workout timer starting up...");

    let settings = SettingsStore::new(PathBuf::from(DEFAULT_SETTINGS_PATH))?;
    let config = settings.config();
    let store = RoutineStore::new(&config.routines_dir);

    let routine = match std::env::args().nth(1) {
        Some(name) if store.exists(&name) => store
            .load(&name)
            .with_context(|| format!("failed to load routine '{name}'"))?,
        Some(name) => Routine::new(name),
        None => Routine::new(UNTITLED),
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;

    let routine = runtime.block_on(async move {
        let controller = TimerController::spawn(routine, TimerConfig::from(&config));
        shell::run_shell(controller, store).await
    })?;

    log::info!("Closing routine '{}'", routine.name());
    println!("{}", EventLog::global().dump());
    Ok(())
}

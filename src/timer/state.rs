use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum TimerStatus {
    #[default]
    Idle,
    Running,
    Paused,
    Finished,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    pub status: TimerStatus,
    /// Milliseconds handed to the routine while running.
    pub elapsed_ms: u64,
    pub ticks: u64,
    pub started_at: Option<DateTime<Utc>>,
}

impl TimerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.status == TimerStatus::Running
    }

    pub fn start(&mut self, now: DateTime<Utc>) {
        self.status = TimerStatus::Running;
        self.started_at.get_or_insert(now);
    }

    pub fn pause(&mut self) {
        if self.status == TimerStatus::Running {
            self.status = TimerStatus::Paused;
        }
    }

    pub fn record_tick(&mut self, delta_ms: u64) {
        self.elapsed_ms = self.elapsed_ms.saturating_add(delta_ms);
        self.ticks = self.ticks.wrapping_add(1);
    }

    /// Aligns the status with the routine after something changed it.
    ///
    /// An idle timer stays idle; an active one finishes when the routine does, and a
    /// finished one drops back to paused if an edit reopened the routine.
    pub fn sync_finished(&mut self, routine_finished: bool) {
        match self.status {
            TimerStatus::Running | TimerStatus::Paused if routine_finished => {
                self.status = TimerStatus::Finished;
            }
            TimerStatus::Finished if !routine_finished => {
                self.status = TimerStatus::Paused;
            }
            _ => {}
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

use std::time::Duration;

use tokio::time::Instant;

use crate::models::{Routine, SegmentGroup};

/// What a tick source drives.
pub trait TickTarget {
    fn on_tick(&mut self, delta_ms: u64);

    fn on_confirm(&mut self);

    fn is_finished(&self) -> bool;
}

impl TickTarget for Routine {
    fn on_tick(&mut self, delta_ms: u64) {
        self.advance(delta_ms);
    }

    fn on_confirm(&mut self) {
        self.advance_manual();
    }

    fn is_finished(&self) -> bool {
        self.is_complete()
    }
}

/// Tick rates outside `1..=MAX_TICKS_PER_SECOND` are clamped.
pub const MAX_TICKS_PER_SECOND: u32 = 1000;

/// Converts periodic wake-ups into exact millisecond deltas.
///
/// Wake-ups drift, so every delta after the first is measured against the previous
/// tick. The first tick after a restart reports the nominal period. Sub-millisecond
/// remainders carry over so that no time is lost to truncation.
#[derive(Debug, Clone)]
pub struct PreciseInterval {
    period: Duration,
    last_tick: Option<Instant>,
    carry: Duration,
}

impl PreciseInterval {
    pub fn new(ticks_per_second: u32) -> Self {
        Self {
            period: Duration::from_secs(1) / ticks_per_second.clamp(1, MAX_TICKS_PER_SECOND),
            last_tick: None,
            carry: Duration::ZERO,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn nominal_ms(&self) -> u64 {
        self.period.as_millis() as u64
    }

    /// Forget the previous tick, e.g. after a pause.
    pub fn restart(&mut self) {
        self.last_tick = None;
        self.carry = Duration::ZERO;
    }

    pub fn tick(&mut self, now: Instant) -> u64 {
        let delta = match self.last_tick.replace(now) {
            None => return self.nominal_ms(),
            Some(last) => now.saturating_duration_since(last) + self.carry,
        };

        let whole_ms = delta.as_millis() as u64;
        self.carry = delta - Duration::from_millis(whole_ms);
        whole_ms
    }
}

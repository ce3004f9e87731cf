use std::cmp;

use super::SegmentId;

/// A segment that completes once enough wall-clock time has been poured into it.
#[derive(Debug, Clone)]
pub struct TimeSegment {
    id: SegmentId,
    name: String,
    total_ms: u64,
    current_ms: u64,
}

impl TimeSegment {
    pub fn new(name: impl Into<String>, total_ms: u64) -> Self {
        Self::with_progress(name, total_ms, 0)
    }

    /// Partially elapsed segment. `current_ms` is clamped to `total_ms`.
    pub fn with_progress(name: impl Into<String>, total_ms: u64, current_ms: u64) -> Self {
        Self {
            id: SegmentId::new(),
            name: name.into(),
            total_ms,
            current_ms: cmp::min(current_ms, total_ms),
        }
    }

    pub fn id(&self) -> SegmentId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn total_ms(&self) -> u64 {
        self.total_ms
    }

    pub fn current_ms(&self) -> u64 {
        self.current_ms
    }

    pub fn remaining_ms(&self) -> u64 {
        self.total_ms - self.current_ms
    }

    /// Pours `delta_ms` into the segment and returns whatever did not fit.
    pub fn add_ms(&mut self, delta_ms: u64) -> u64 {
        let poured = self.current_ms.saturating_add(delta_ms);
        let filled = cmp::min(self.total_ms, poured);
        self.current_ms = filled;
        poured - filled
    }

    pub fn set_total_time(&mut self, total_ms: u64) {
        self.total_ms = total_ms;
        self.current_ms = cmp::min(self.current_ms, total_ms);
    }

    pub fn is_complete(&self) -> bool {
        self.current_ms >= self.total_ms
    }

    pub fn reset(&mut self) {
        self.current_ms = 0;
    }
}

impl PartialEq for TimeSegment {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.total_ms == other.total_ms
            && self.current_ms == other.current_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_ms_partial() {
        let mut segment = TimeSegment::new("plank", 2000);
        assert_eq!(segment.add_ms(500), 0);
        assert_eq!(segment.current_ms(), 500);
        assert!(!segment.is_complete());
    }

    #[test]
    fn test_add_ms_returns_overflow() {
        let mut segment = TimeSegment::new("plank", 2000);
        segment.add_ms(500);
        assert_eq!(segment.add_ms(1800), 300);
        assert_eq!(segment.current_ms(), 2000);
        assert!(segment.is_complete());
    }

    #[test]
    fn test_add_ms_on_complete_segment_returns_everything() {
        let mut segment = TimeSegment::with_progress("done", 1000, 1000);
        assert_eq!(segment.add_ms(250), 250);
        assert_eq!(segment.current_ms(), 1000);
    }

    #[test]
    fn test_zero_length_is_complete() {
        let mut segment = TimeSegment::new("instant", 0);
        assert!(segment.is_complete());
        segment.reset();
        assert!(segment.is_complete());
    }

    #[test]
    fn test_set_total_time_clamps_progress() {
        let mut segment = TimeSegment::with_progress("run", 10_000, 7_000);
        segment.set_total_time(5_000);
        assert_eq!(segment.current_ms(), 5_000);
        assert!(segment.is_complete());

        segment.set_total_time(8_000);
        assert_eq!(segment.current_ms(), 5_000);
        assert_eq!(segment.remaining_ms(), 3_000);
    }

    #[test]
    fn test_with_progress_clamps() {
        let segment = TimeSegment::with_progress("odd", 100, 400);
        assert_eq!(segment.current_ms(), 100);
    }

    #[test]
    fn test_reset() {
        let mut segment = TimeSegment::with_progress("run", 1000, 600);
        segment.reset();
        assert_eq!(segment.current_ms(), 0);
        assert!(!segment.is_complete());
    }

    #[test]
    fn test_equality_ignores_identity() {
        let a = TimeSegment::with_progress("run", 1000, 600);
        let b = TimeSegment::with_progress("run", 1000, 600);
        assert_ne!(a.id(), b.id());
        assert_eq!(a, b);
    }
}

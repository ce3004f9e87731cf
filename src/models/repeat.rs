use std::cmp;

use super::{Segment, SegmentGroup, SegmentId};
use crate::error::{Result, RoutineError};

/// A segment that runs its children `total_cycles` times.
///
/// The cycle counter is promoted lazily by [`RepeatSegment::update`]: once the last
/// child completes on a non-final cycle, the counter moves up by one and every child
/// is reset. The child list is never empty.
#[derive(Debug, Clone)]
pub struct RepeatSegment {
    id: SegmentId,
    name: String,
    total_cycles: u32,
    current_cycle: u32,
    children: Vec<Segment>,
}

impl RepeatSegment {
    pub fn new(name: impl Into<String>, total_cycles: u32, children: Vec<Segment>) -> Result<Self> {
        Self::with_progress(name, total_cycles, 1, children)
    }

    /// Repeat resumed on `current_cycle`, children keep whatever progress they carry.
    pub fn with_progress(
        name: impl Into<String>,
        total_cycles: u32,
        current_cycle: u32,
        children: Vec<Segment>,
    ) -> Result<Self> {
        let name = name.into();
        if total_cycles == 0 {
            return Err(RoutineError::precondition(format!(
                "repeat '{name}' needs at least one cycle"
            )));
        }
        if current_cycle == 0 || current_cycle > total_cycles {
            return Err(RoutineError::precondition(format!(
                "repeat '{name}' cycle {current_cycle} is outside 1..={total_cycles}"
            )));
        }
        if children.is_empty() {
            return Err(RoutineError::precondition(format!(
                "repeat '{name}' needs at least one child"
            )));
        }

        Ok(Self {
            id: SegmentId::new(),
            name,
            total_cycles,
            current_cycle,
            children,
        })
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

    pub fn current_repetition(&self) -> u32 {
        self.current_cycle
    }

    pub fn total_repetitions(&self) -> u32 {
        self.total_cycles
    }

    /// Changes the cycle count after syncing. Child progress is retained, so lowering
    /// the count below the current cycle parks the repeat on its final cycle with its
    /// children exactly where they were.
    pub fn set_new_repeats(&mut self, total_cycles: u32) -> Result<()> {
        if total_cycles == 0 {
            return Err(RoutineError::precondition(format!(
                "repeat '{}' needs at least one cycle",
                self.name
            )));
        }
        self.sync();
        self.total_cycles = total_cycles;
        self.current_cycle = cmp::min(self.current_cycle, total_cycles);
        Ok(())
    }

    /// Promotes the cycle counter (at most once) and then updates nested repeats.
    /// Returns whether any repeat in this subtree was promoted.
    pub fn update(&mut self) -> bool {
        let mut promoted = false;
        if self.current_cycle < self.total_cycles && self.last_child_complete() {
            self.current_cycle += 1;
            self.children.iter_mut().for_each(Segment::reset);
            promoted = true;
        }

        for child in &mut self.children {
            if let Segment::Repeat(repeat) = child {
                promoted |= repeat.update();
            }
        }
        promoted
    }

    /// Updates until no repeat promotes. Cycles made of zero-length children need
    /// more than one pass.
    pub fn sync(&mut self) {
        while self.update() {}
    }

    pub fn reset(&mut self) {
        self.current_cycle = 1;
        self.children.iter_mut().for_each(Segment::reset);
    }

    pub(crate) fn children_mut(&mut self) -> &mut Vec<Segment> {
        &mut self.children
    }

    fn last_child_complete(&self) -> bool {
        self.children.last().map_or(true, Segment::is_complete)
    }
}

impl SegmentGroup for RepeatSegment {
    fn children(&self) -> &[Segment] {
        &self.children
    }

    fn is_complete(&self) -> bool {
        self.current_cycle == self.total_cycles && self.last_child_complete()
    }
}

impl PartialEq for RepeatSegment {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.total_cycles == other.total_cycles
            && self.current_cycle == other.current_cycle
            && self.children == other.children
    }
}

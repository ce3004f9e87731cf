//! Navigation shared by everything that owns an ordered list of segments.
//!
//! Both [`RepeatSegment`](super::RepeatSegment) and [`Routine`](super::Routine) are
//! groups; the routine behaves like a repeat that runs exactly once. Every method
//! here is a read-only view. Cycle counters are already synced because every
//! mutating entry point ends with a `sync`.

use super::{Segment, SegmentId};
use crate::error::{Result, RoutineError};

pub trait SegmentGroup {
    fn children(&self) -> &[Segment];

    fn is_complete(&self) -> bool;

    /// Direct children of this group.
    fn segments(&self) -> &[Segment] {
        self.children()
    }

    /// Depth-first pre-order listing of every segment below this group, repeats
    /// included. The position in this list is the user-facing segment index.
    fn flatten(&self) -> Vec<&Segment> {
        let mut all = Vec::new();
        flatten_into(self.children(), &mut all);
        all
    }

    /// First incomplete child at this level.
    fn current_segment(&self) -> Result<&Segment> {
        if self.is_complete() {
            return Err(RoutineError::precondition(
                "current segment requested on a complete group",
            ));
        }
        self.children()
            .iter()
            .find(|segment| !segment.is_complete())
            .ok_or_else(|| RoutineError::precondition("group has no incomplete child"))
    }

    /// First incomplete leaf reached by descending through current repeats.
    fn exact_current_segment(&self) -> Result<&Segment> {
        let mut current = self.current_segment()?;
        while let Segment::Repeat(repeat) = current {
            current = repeat.current_segment()?;
        }
        Ok(current)
    }

    fn find(&self, id: SegmentId) -> Option<&Segment> {
        self.flatten().into_iter().find(|segment| segment.id() == id)
    }

    /// Flat index of the segment with `id`.
    fn position(&self, id: SegmentId) -> Option<usize> {
        self.flatten().iter().position(|segment| segment.id() == id)
    }

    fn segment_at(&self, index: usize) -> Option<&Segment> {
        self.flatten().get(index).copied()
    }
}

fn flatten_into<'a>(segments: &'a [Segment], all: &mut Vec<&'a Segment>) {
    for segment in segments {
        all.push(segment);
        flatten_into(segment.children(), all);
    }
}

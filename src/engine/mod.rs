//! Advancement: turns elapsed time and user confirmations into routine progress.
//!
//! Time flows into the exact current leaf. Overflow rolls into the next Time leaf
//! within the same call, but stops dead at a Manual leaf: whatever is left over is
//! discarded and the driver resumes once the user confirms.

use crate::models::{Routine, Segment, SegmentGroup};

impl Routine {
    pub fn advance(&mut self, delta_ms: u64) {
        let mut remaining = delta_ms;
        loop {
            if self.is_complete() {
                return;
            }

            match current_leaf_mut(self.segments_mut()) {
                Some(Segment::Time(time)) => remaining = time.add_ms(remaining),
                Some(_) => return,
                // Only zero-length leaves are left in some cycle; the sync promotes it.
                None => {}
            }

            self.sync();
            if remaining == 0 {
                return;
            }
        }
    }

    pub fn advance_manual(&mut self) {
        if self.is_complete() {
            return;
        }

        if let Some(Segment::Manual(manual)) = current_leaf_mut(self.segments_mut()) {
            manual.set_complete();
        }
        self.sync();
    }
}

fn current_leaf_mut(segments: &mut [Segment]) -> Option<&mut Segment> {
    let current = segments.iter_mut().find(|segment| !segment.is_complete())?;
    match current {
        Segment::Repeat(repeat) => current_leaf_mut(repeat.children_mut()),
        leaf => Some(leaf),
    }
}

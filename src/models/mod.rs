//! Routine tree data model.

mod group;
mod id;
mod manual;
mod repeat;
mod routine;
mod segment;
mod time;

pub use group::SegmentGroup;
pub use id::SegmentId;
pub use manual::ManualSegment;
pub use repeat::RepeatSegment;
pub use routine::Routine;
pub use segment::{Segment, SegmentKind};
pub use time::TimeSegment;

use serde::{Deserialize, Serialize};

use super::{ManualSegment, RepeatSegment, SegmentGroup, SegmentId, TimeSegment};
use crate::error::Result;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SegmentKind {
    Time,
    Manual,
    Repeat,
}

impl SegmentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SegmentKind::Time => "TIME",
            SegmentKind::Manual => "MANUAL",
            SegmentKind::Repeat => "REPEAT",
        }
    }
}

/// One node of a routine tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Time(TimeSegment),
    Manual(ManualSegment),
    Repeat(RepeatSegment),
}

impl Segment {
    pub fn time(name: impl Into<String>, total_ms: u64) -> Self {
        Segment::Time(TimeSegment::new(name, total_ms))
    }

    pub fn manual(name: impl Into<String>) -> Self {
        Segment::Manual(ManualSegment::new(name))
    }

    pub fn repeat(name: impl Into<String>, total_cycles: u32, children: Vec<Segment>) -> Result<Self> {
        RepeatSegment::new(name, total_cycles, children).map(Segment::Repeat)
    }

    pub fn id(&self) -> SegmentId {
        match self {
            Segment::Time(time) => time.id(),
            Segment::Manual(manual) => manual.id(),
            Segment::Repeat(repeat) => repeat.id(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Segment::Time(time) => time.name(),
            Segment::Manual(manual) => manual.name(),
            Segment::Repeat(repeat) => repeat.name(),
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        match self {
            Segment::Time(time) => time.set_name(name),
            Segment::Manual(manual) => manual.set_name(name),
            Segment::Repeat(repeat) => repeat.set_name(name),
        }
    }

    pub fn kind(&self) -> SegmentKind {
        match self {
            Segment::Time(_) => SegmentKind::Time,
            Segment::Manual(_) => SegmentKind::Manual,
            Segment::Repeat(_) => SegmentKind::Repeat,
        }
    }

    pub fn is_time(&self) -> bool {
        matches!(self, Segment::Time(_))
    }

    pub fn is_manual(&self) -> bool {
        matches!(self, Segment::Manual(_))
    }

    pub fn is_repeat(&self) -> bool {
        matches!(self, Segment::Repeat(_))
    }

    pub fn is_complete(&self) -> bool {
        match self {
            Segment::Time(time) => time.is_complete(),
            Segment::Manual(manual) => manual.is_complete(),
            Segment::Repeat(repeat) => repeat.is_complete(),
        }
    }

    pub fn reset(&mut self) {
        match self {
            Segment::Time(time) => time.reset(),
            Segment::Manual(manual) => manual.reset(),
            Segment::Repeat(repeat) => repeat.reset(),
        }
    }

    /// Direct children; empty for leaves.
    pub fn children(&self) -> &[Segment] {
        match self {
            Segment::Repeat(repeat) => repeat.children(),
            _ => &[],
        }
    }

    pub fn as_time(&self) -> Option<&TimeSegment> {
        match self {
            Segment::Time(time) => Some(time),
            _ => None,
        }
    }

    pub fn as_time_mut(&mut self) -> Option<&mut TimeSegment> {
        match self {
            Segment::Time(time) => Some(time),
            _ => None,
        }
    }

    pub fn as_manual(&self) -> Option<&ManualSegment> {
        match self {
            Segment::Manual(manual) => Some(manual),
            _ => None,
        }
    }

    pub fn as_manual_mut(&mut self) -> Option<&mut ManualSegment> {
        match self {
            Segment::Manual(manual) => Some(manual),
            _ => None,
        }
    }

    pub fn as_repeat(&self) -> Option<&RepeatSegment> {
        match self {
            Segment::Repeat(repeat) => Some(repeat),
            _ => None,
        }
    }

    pub fn as_repeat_mut(&mut self) -> Option<&mut RepeatSegment> {
        match self {
            Segment::Repeat(repeat) => Some(repeat),
            _ => None,
        }
    }
}

impl From<TimeSegment> for Segment {
    fn from(time: TimeSegment) -> Self {
        Segment::Time(time)
    }
}

impl From<ManualSegment> for Segment {
    fn from(manual: ManualSegment) -> Self {
        Segment::Manual(manual)
    }
}

impl From<RepeatSegment> for Segment {
    fn from(repeat: RepeatSegment) -> Self {
        Segment::Repeat(repeat)
    }
}

use super::{Segment, SegmentGroup};
use crate::events::EventLog;

/// A named, ordered list of top-level segments.
///
/// Behaves as a one-cycle repeat: complete once the list is empty or its last
/// segment is complete. Structural edits live in [`crate::editor`] and time
/// advancement in [`crate::engine`].
#[derive(Debug, Clone)]
pub struct Routine {
    name: String,
    segments: Vec<Segment>,
    events: EventLog,
}

impl Routine {
    /// Empty routine journaling to the process-wide event log.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_event_log(name, EventLog::global())
    }

    pub fn with_event_log(name: impl Into<String>, events: EventLog) -> Self {
        Self {
            name: name.into(),
            segments: Vec::new(),
            events,
        }
    }

    /// Builds a routine from already validated segments without journaling.
    pub(crate) fn from_parts(name: String, segments: Vec<Segment>, events: EventLog) -> Self {
        let mut routine = Self {
            name,
            segments,
            events,
        };
        routine.sync();
        routine
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        self.events
            .log_event(format!("Renamed routine '{}' to '{}'", self.name, name));
        self.name = name;
    }

    pub fn event_log(&self) -> &EventLog {
        &self.events
    }

    /// One promotion pass over every repeat in the tree. Returns whether anything
    /// was promoted.
    pub fn update(&mut self) -> bool {
        let mut promoted = false;
        for segment in &mut self.segments {
            if let Segment::Repeat(repeat) = segment {
                promoted |= repeat.update();
            }
        }
        promoted
    }

    /// Updates until the tree is fully synced. Every mutating entry point ends here.
    pub fn sync(&mut self) {
        while self.update() {}
    }

    pub fn reset(&mut self) {
        self.segments.iter_mut().for_each(Segment::reset);
        self.sync();
    }

    pub(crate) fn segments_mut(&mut self) -> &mut Vec<Segment> {
        &mut self.segments
    }
}

impl SegmentGroup for Routine {
    fn children(&self) -> &[Segment] {
        &self.segments
    }

    fn is_complete(&self) -> bool {
        self.segments.last().map_or(true, Segment::is_complete)
    }
}

impl PartialEq for Routine {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.segments == other.segments
    }
}

use super::SegmentId;

/// A segment that only completes when the user confirms it.
#[derive(Debug, Clone)]
pub struct ManualSegment {
    id: SegmentId,
    name: String,
    finished: bool,
}

impl ManualSegment {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_finished(name, false)
    }

    pub fn with_finished(name: impl Into<String>, finished: bool) -> Self {
        Self {
            id: SegmentId::new(),
            name: name.into(),
            finished,
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

    pub fn set_complete(&mut self) {
        self.finished = true;
    }

    pub fn is_complete(&self) -> bool {
        self.finished
    }

    pub fn reset(&mut self) {
        self.finished = false;
    }
}

impl PartialEq for ManualSegment {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.finished == other.finished
    }
}

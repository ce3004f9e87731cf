use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity of a segment within the running process.
///
/// Names are labels and may repeat; the id is what editing operations anchor on.
/// Ids are never persisted, a decoded routine receives fresh ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SegmentId(Uuid);

impl SegmentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SegmentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

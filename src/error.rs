use std::{io, path::PathBuf};

use thiserror::Error;

use crate::models::SegmentId;

#[derive(Debug, Error)]
pub enum RoutineError {
    /// Malformed or semantically invalid routine document.
    #[error("failed to decode routine: {0}")]
    Decode(String),
    #[error("failed to encode routine: {0}")]
    Encode(String),
    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Insert/remove/edit target is not present anywhere in the tree.
    #[error("segment {0} not found in routine")]
    AnchorNotFound(SegmentId),
    /// A caller bug: the operation's precondition does not hold.
    #[error("precondition violated: {0}")]
    PreconditionViolation(String),
}

impl RoutineError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        RoutineError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn precondition(message: impl Into<String>) -> Self {
        RoutineError::PreconditionViolation(message.into())
    }
}

impl From<serde_json::Error> for RoutineError {
    fn from(err: serde_json::Error) -> Self {
        RoutineError::Decode(err.to_string())
    }
}

pub type Result<T, E = RoutineError> = std::result::Result<T, E>;

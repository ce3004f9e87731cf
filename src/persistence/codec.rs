use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use super::document::RoutineDocument;
use crate::error::{Result, RoutineError};
use crate::events::EventLog;
use crate::models::{Routine, Segment};

/// Compact single-line document.
pub fn encode(routine: &Routine) -> Result<String> {
    serde_json::to_string(&RoutineDocument::from(routine))
        .map_err(|err| RoutineError::Encode(err.to_string()))
}

/// Four-space indented document, the format saved routines are written in.
pub fn encode_pretty(routine: &Routine) -> Result<String> {
    let mut buffer = Vec::new();
    let mut serializer =
        Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(b"    "));
    RoutineDocument::from(routine)
        .serialize(&mut serializer)
        .map_err(|err| RoutineError::Encode(err.to_string()))?;
    String::from_utf8(buffer).map_err(|err| RoutineError::Encode(err.to_string()))
}

/// Parses and validates a document. The routine journals to the global event log.
pub fn decode(json: &str) -> Result<Routine> {
    decode_with_log(json, EventLog::global())
}

pub fn decode_with_log(json: &str, events: EventLog) -> Result<Routine> {
    let document: RoutineDocument = serde_json::from_str(json)?;
    if document.name.is_empty() {
        return Err(RoutineError::Decode("routine name must not be empty".into()));
    }

    let segments = document
        .segments
        .into_iter()
        .map(Segment::try_from)
        .collect::<Result<Vec<_>>>()?;
    Ok(Routine::from_parts(document.name, segments, events))
}

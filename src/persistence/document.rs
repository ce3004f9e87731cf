use serde::{Deserialize, Serialize};

use crate::error::{Result, RoutineError};
use crate::models::{ManualSegment, RepeatSegment, Routine, Segment, SegmentGroup, TimeSegment};

/// On-disk shape of a routine. Keys are part of the file format.
#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RoutineDocument {
    pub name: String,
    pub segments: Vec<SegmentDocument>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub(crate) enum SegmentDocument {
    Time(TimeDocument),
    Manual(ManualDocument),
    Repeat(RepeatDocument),
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct TimeDocument {
    pub name: String,
    pub total_time: u64,
    pub current_time: u64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ManualDocument {
    pub name: String,
    pub finished: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct RepeatDocument {
    pub name: String,
    pub total_repetitions: u32,
    pub current_repetitions: u32,
    pub children: Vec<SegmentDocument>,
}

impl From<&Routine> for RoutineDocument {
    fn from(routine: &Routine) -> Self {
        Self {
            name: routine.name().to_string(),
            segments: routine.segments().iter().map(SegmentDocument::from).collect(),
        }
    }
}

impl From<&Segment> for SegmentDocument {
    fn from(segment: &Segment) -> Self {
        match segment {
            Segment::Time(time) => SegmentDocument::Time(TimeDocument {
                name: time.name().to_string(),
                total_time: time.total_ms(),
                current_time: time.current_ms(),
            }),
            Segment::Manual(manual) => SegmentDocument::Manual(ManualDocument {
                name: manual.name().to_string(),
                finished: manual.is_complete(),
            }),
            Segment::Repeat(repeat) => SegmentDocument::Repeat(RepeatDocument {
                name: repeat.name().to_string(),
                total_repetitions: repeat.total_repetitions(),
                current_repetitions: repeat.current_repetition(),
                children: repeat.children().iter().map(SegmentDocument::from).collect(),
            }),
        }
    }
}

impl TryFrom<SegmentDocument> for Segment {
    type Error = RoutineError;

    /// Checks the numeric and structural rules serde cannot express.
    fn try_from(document: SegmentDocument) -> Result<Self> {
        match document {
            SegmentDocument::Time(time) => {
                require_name(&time.name)?;
                if time.current_time > time.total_time {
                    return Err(RoutineError::Decode(format!(
                        "time segment '{}' has currentTime {} beyond totalTime {}",
                        time.name, time.current_time, time.total_time
                    )));
                }
                Ok(Segment::Time(TimeSegment::with_progress(
                    time.name,
                    time.total_time,
                    time.current_time,
                )))
            }
            SegmentDocument::Manual(manual) => {
                require_name(&manual.name)?;
                Ok(Segment::Manual(ManualSegment::with_finished(
                    manual.name,
                    manual.finished,
                )))
            }
            SegmentDocument::Repeat(repeat) => {
                require_name(&repeat.name)?;
                if repeat.total_repetitions == 0 {
                    return Err(RoutineError::Decode(format!(
                        "repeat segment '{}' has totalRepetitions 0",
                        repeat.name
                    )));
                }
                if !(1..=repeat.total_repetitions).contains(&repeat.current_repetitions) {
                    return Err(RoutineError::Decode(format!(
                        "repeat segment '{}' has currentRepetitions {} outside 1..={}",
                        repeat.name, repeat.current_repetitions, repeat.total_repetitions
                    )));
                }
                if repeat.children.is_empty() {
                    return Err(RoutineError::Decode(format!(
                        "repeat segment '{}' has no children",
                        repeat.name
                    )));
                }

                let children = repeat
                    .children
                    .into_iter()
                    .map(Segment::try_from)
                    .collect::<Result<Vec<_>>>()?;
                RepeatSegment::with_progress(
                    repeat.name,
                    repeat.total_repetitions,
                    repeat.current_repetitions,
                    children,
                )
                .map(Segment::Repeat)
                .map_err(|err| RoutineError::Decode(err.to_string()))
            }
        }
    }
}

fn require_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(RoutineError::Decode("segment name must not be empty".into()));
    }
    Ok(())
}

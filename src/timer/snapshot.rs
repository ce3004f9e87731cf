use serde::Serialize;

use super::TimerState;
use crate::models::{Routine, Segment, SegmentGroup, SegmentId, SegmentKind};
use crate::utils::duration::format_ms;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SegmentState {
    Pending,
    /// On the path from the routine down to the exact current leaf.
    Current,
    Complete,
}

/// One row of the flattened render model.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SegmentView {
    pub index: usize,
    pub depth: usize,
    pub id: SegmentId,
    pub name: String,
    pub kind: SegmentKind,
    pub state: SegmentState,
    pub progress: f64,
    pub detail: String,
    /// Elapsed and total milliseconds, Time segments only.
    pub time_ms: Option<(u64, u64)>,
}

/// Everything a front end needs to draw one frame.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RoutineSnapshot {
    pub name: String,
    pub timer: TimerState,
    pub complete: bool,
    /// Flat index of the exact current leaf.
    pub current: Option<usize>,
    pub segments: Vec<SegmentView>,
}

impl RoutineSnapshot {
    pub fn capture(routine: &Routine, timer: &TimerState) -> Self {
        let complete = routine.is_complete();
        let mut segments = Vec::new();
        collect(routine.segments(), 0, !complete, &mut segments);

        let current = segments
            .iter()
            .filter(|view| view.state == SegmentState::Current && view.kind != SegmentKind::Repeat)
            .map(|view| view.index)
            .next();

        Self {
            name: routine.name().to_string(),
            timer: timer.clone(),
            complete,
            current,
            segments,
        }
    }

    pub fn current_segment(&self) -> Option<&SegmentView> {
        self.current.and_then(|index| self.segments.get(index))
    }
}

fn collect(segments: &[Segment], depth: usize, active: bool, views: &mut Vec<SegmentView>) {
    let current = if active {
        segments.iter().position(|segment| !segment.is_complete())
    } else {
        None
    };

    for (position, segment) in segments.iter().enumerate() {
        let state = if segment.is_complete() {
            SegmentState::Complete
        } else if current == Some(position) {
            SegmentState::Current
        } else {
            SegmentState::Pending
        };

        views.push(SegmentView {
            index: views.len(),
            depth,
            id: segment.id(),
            name: segment.name().to_string(),
            kind: segment.kind(),
            state,
            progress: progress(segment, state),
            detail: detail(segment, state),
            time_ms: segment
                .as_time()
                .map(|time| (time.current_ms(), time.total_ms())),
        });
        collect(
            segment.children(),
            depth + 1,
            state == SegmentState::Current,
            views,
        );
    }
}

fn progress(segment: &Segment, state: SegmentState) -> f64 {
    match segment {
        Segment::Time(time) => fraction(time.current_ms(), time.total_ms()),
        Segment::Manual(manual) if manual.is_complete() => 1.0,
        Segment::Manual(_) => 0.0,
        Segment::Repeat(_) if state == SegmentState::Complete => 1.0,
        Segment::Repeat(repeat) => fraction(
            u64::from(repeat.current_repetition() - 1),
            u64::from(repeat.total_repetitions()),
        ),
    }
}

fn fraction(done: u64, total: u64) -> f64 {
    if done == total {
        1.0
    } else if done == 0 {
        0.0
    } else {
        done as f64 / total as f64
    }
}

fn detail(segment: &Segment, state: SegmentState) -> String {
    match segment {
        Segment::Time(time) => format!(
            "{}/{}",
            format_ms(time.current_ms(), true),
            format_ms(time.total_ms(), false)
        ),
        Segment::Manual(_) if state == SegmentState::Current => "confirm to continue".into(),
        Segment::Manual(_) => String::new(),
        Segment::Repeat(repeat) => format!(
            "{}/{}",
            repeat.current_repetition(),
            repeat.total_repetitions()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventLog;

    fn routine() -> Routine {
        let mut routine = Routine::with_event_log("circuit", EventLog::new());
        routine.add(Segment::time("warm up", 2000));
        routine.add(
            Segment::repeat(
                "sets",
                3,
                vec![Segment::manual("push ups"), Segment::time("rest", 1000)],
            )
            .unwrap(),
        );
        routine
    }

    fn states(snapshot: &RoutineSnapshot) -> Vec<SegmentState> {
        snapshot.segments.iter().map(|view| view.state).collect()
    }

    #[test]
    fn test_fresh_routine() {
        let snapshot = RoutineSnapshot::capture(&routine(), &TimerState::new());
        use SegmentState::*;
        assert_eq!(states(&snapshot), vec![Current, Pending, Pending, Pending]);
        assert_eq!(snapshot.current, Some(0));
        assert_eq!(snapshot.segments[0].detail, "0.00/2");
        assert_eq!(snapshot.segments[1].detail, "1/3");
        assert_eq!(snapshot.segments[1].progress, 0.0);
        assert_eq!(snapshot.segments[2].depth, 1);
        assert!(!snapshot.complete);
    }

    #[test]
    fn test_mid_routine() {
        let mut routine = routine();
        routine.advance(2000);
        routine.advance_manual();
        routine.advance(1000);
        routine.advance_manual();
        routine.advance(500);

        let snapshot = RoutineSnapshot::capture(&routine, &TimerState::new());
        use SegmentState::*;
        assert_eq!(states(&snapshot), vec![Complete, Current, Complete, Current]);
        assert_eq!(snapshot.current_segment().unwrap().name, "rest");
        assert_eq!(snapshot.segments[3].progress, 0.5);
        assert_eq!(snapshot.segments[3].detail, "0.50/1");
        assert!((snapshot.segments[1].progress - 1.0 / 3.0).abs() < 1e-9);
        assert_eq!(snapshot.segments[1].detail, "2/3");
    }

    #[test]
    fn test_manual_current_detail() {
        let mut routine = routine();
        routine.advance(2000);
        let snapshot = RoutineSnapshot::capture(&routine, &TimerState::new());
        assert_eq!(snapshot.current, Some(2));
        assert_eq!(snapshot.segments[2].detail, "confirm to continue");
    }

    #[test]
    fn test_complete_routine() {
        let mut routine = routine();
        routine.advance(2000);
        for _ in 0..3 {
            routine.advance_manual();
            routine.advance(1000);
        }

        let snapshot = RoutineSnapshot::capture(&routine, &TimerState::new());
        assert!(snapshot.complete);
        assert_eq!(snapshot.current, None);
        assert!(snapshot
            .segments
            .iter()
            .all(|view| view.state == SegmentState::Complete && view.progress == 1.0));
    }

    #[test]
    fn test_zero_length_time_reports_full_progress() {
        let mut routine = Routine::with_event_log("z", EventLog::new());
        routine.add(Segment::time("instant", 0));
        routine.add(Segment::time("plank", 1000));

        let snapshot = RoutineSnapshot::capture(&routine, &TimerState::new());
        assert_eq!(snapshot.segments[0].state, SegmentState::Complete);
        assert_eq!(snapshot.segments[0].progress, 1.0);
        assert_eq!(snapshot.segments[1].progress, 0.0);
    }

    #[test]
    fn test_empty_routine() {
        let routine = Routine::with_event_log("empty", EventLog::new());
        let snapshot = RoutineSnapshot::capture(&routine, &TimerState::new());
        assert!(snapshot.complete);
        assert!(snapshot.segments.is_empty());
    }
}

//! Proptest strategies and tree checks shared by the unit tests.

use proptest::prelude::*;

use crate::events::EventLog;
use crate::models::{Routine, Segment, SegmentGroup};

fn arb_name() -> impl Strategy<Value = String> {
    "[a-z][a-z ]{0,7}"
}

fn arb_leaf(with_manual: bool) -> BoxedStrategy<Segment> {
    let time = (arb_name(), 1u64..3_000).prop_map(|(name, total)| Segment::time(name, total));
    if with_manual {
        prop_oneof![
            2 => time,
            1 => arb_name().prop_map(|name| Segment::manual(name)),
        ]
        .boxed()
    } else {
        time.boxed()
    }
}

pub(crate) fn arb_segment(with_manual: bool) -> impl Strategy<Value = Segment> {
    arb_leaf(with_manual).prop_recursive(3, 24, 4, |inner| {
        (arb_name(), 1u32..4, prop::collection::vec(inner, 1..4)).prop_map(
            |(name, cycles, children)| {
                Segment::repeat(name, cycles, children).expect("generated repeat is valid")
            },
        )
    })
}

/// Fresh routine with its own event log.
pub(crate) fn arb_routine(with_manual: bool) -> impl Strategy<Value = Routine> {
    (arb_name(), prop::collection::vec(arb_segment(with_manual), 0..4))
        .prop_map(|(name, segments)| Routine::from_parts(name, segments, EventLog::new()))
}

/// Routine driven part of the way through by a random mix of ticks and confirms.
pub(crate) fn arb_progressed_routine() -> impl Strategy<Value = Routine> {
    (
        arb_routine(true),
        prop::collection::vec(prop::option::of(0u64..4_000), 0..16),
    )
        .prop_map(|(mut routine, steps)| {
            for step in steps {
                match step {
                    Some(delta) => routine.advance(delta),
                    None => routine.advance_manual(),
                }
            }
            routine
        })
}

pub(crate) fn assert_tree_invariants(routine: &Routine) {
    for segment in routine.flatten() {
        match segment {
            Segment::Time(time) => assert!(
                time.current_ms() <= time.total_ms(),
                "time segment '{}' overflowed",
                time.name()
            ),
            Segment::Repeat(repeat) => {
                assert!(!repeat.children().is_empty(), "repeat '{}' is empty", repeat.name());
                assert!(repeat.total_repetitions() >= 1);
                assert!(
                    (1..=repeat.total_repetitions()).contains(&repeat.current_repetition()),
                    "repeat '{}' cycle out of range",
                    repeat.name()
                );
            }
            Segment::Manual(_) => {}
        }
    }
}

//! Structural edits on a routine tree.
//!
//! The walks here operate on the raw child vectors, never on a listing returned by
//! [`SegmentGroup::segments`]. Every successful edit is journaled and leaves the tree
//! synced. A failed edit leaves the tree untouched.

use crate::error::{Result, RoutineError};
use crate::models::{Routine, Segment, SegmentGroup, SegmentId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    Before,
    After,
}

impl Placement {
    fn offset(self) -> usize {
        match self {
            Placement::Before => 0,
            Placement::After => 1,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Placement::Before => "before",
            Placement::After => "after",
        }
    }
}

/// Outcome of a removal walk: the removed segment plus every repeat that was pruned
/// because the removal emptied it, innermost first.
struct Removal {
    removed: Segment,
    pruned: Vec<Segment>,
}

impl Routine {
    /// Appends to the top-level list.
    pub fn add(&mut self, segment: Segment) {
        let description = format!("Added segment '{}'", segment.name());
        self.segments_mut().push(segment);
        self.sync();
        self.event_log().log_event(description);
    }

    /// Inserts `segment` in the parent list of `anchor`, directly before it.
    pub fn insert_before(&mut self, segment: Segment, anchor: SegmentId) -> Result<()> {
        self.insert_relative(segment, anchor, Placement::Before)
    }

    /// Inserts `segment` in the parent list of `anchor`, directly after it.
    pub fn insert_after(&mut self, segment: Segment, anchor: SegmentId) -> Result<()> {
        self.insert_relative(segment, anchor, Placement::After)
    }

    /// Removes `target` from wherever it lives. Repeats left without children are
    /// removed as well, cascading upward. The top-level list may end up empty.
    pub fn remove(&mut self, target: SegmentId) -> Result<Segment> {
        let Removal { removed, pruned } = remove_from(self.segments_mut(), target)
            .ok_or(RoutineError::AnchorNotFound(target))?;
        self.sync();

        self.event_log()
            .log_event(format!("Removed segment '{}'", removed.name()));
        for repeat in &pruned {
            self.event_log()
                .log_event(format!("Pruned empty repeat '{}'", repeat.name()));
        }
        Ok(removed)
    }

    /// Applies `edit` to the segment with `id` in place, then re-syncs the tree.
    pub fn edit_segment<R>(
        &mut self,
        id: SegmentId,
        edit: impl FnOnce(&mut Segment) -> R,
    ) -> Result<R> {
        let segment =
            find_mut(self.segments_mut(), id).ok_or(RoutineError::AnchorNotFound(id))?;
        let result = edit(&mut *segment);
        let description = format!("Edited segment '{}'", segment.name());
        self.sync();
        self.event_log().log_event(description);
        Ok(result)
    }

    fn insert_relative(
        &mut self,
        segment: Segment,
        anchor: SegmentId,
        placement: Placement,
    ) -> Result<()> {
        let anchor_name = match self.find(anchor) {
            Some(found) => found.name().to_string(),
            None => return Err(RoutineError::AnchorNotFound(anchor)),
        };
        let description = format!(
            "Inserted segment '{}' {} '{}'",
            segment.name(),
            placement.as_str(),
            anchor_name
        );

        insert_at(self.segments_mut(), anchor, placement, segment)
            .map_err(|_| RoutineError::AnchorNotFound(anchor))?;
        self.sync();
        self.event_log().log_event(description);
        Ok(())
    }
}

/// Depth-first search for `anchor`; the first occurrence wins. Hands the segment
/// back when the anchor is not in this subtree.
fn insert_at(
    list: &mut Vec<Segment>,
    anchor: SegmentId,
    placement: Placement,
    segment: Segment,
) -> std::result::Result<(), Segment> {
    let mut segment = segment;
    for index in 0..list.len() {
        if list[index].id() == anchor {
            list.insert(index + placement.offset(), segment);
            return Ok(());
        }
        if let Segment::Repeat(repeat) = &mut list[index] {
            match insert_at(repeat.children_mut(), anchor, placement, segment) {
                Ok(()) => return Ok(()),
                Err(unplaced) => segment = unplaced,
            }
        }
    }
    Err(segment)
}

fn remove_from(list: &mut Vec<Segment>, target: SegmentId) -> Option<Removal> {
    for index in 0..list.len() {
        if list[index].id() == target {
            return Some(Removal {
                removed: list.remove(index),
                pruned: Vec::new(),
            });
        }
        if let Segment::Repeat(repeat) = &mut list[index] {
            if let Some(mut removal) = remove_from(repeat.children_mut(), target) {
                if repeat.children().is_empty() {
                    removal.pruned.push(list.remove(index));
                }
                return Some(removal);
            }
        }
    }
    None
}

fn find_mut(list: &mut [Segment], id: SegmentId) -> Option<&mut Segment> {
    for segment in list.iter_mut() {
        if segment.id() == id {
            return Some(segment);
        }
        if let Segment::Repeat(repeat) = segment {
            if let Some(found) = find_mut(repeat.children_mut(), id) {
                return Some(found);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventLog;
    use crate::models::RepeatSegment;

    struct Fixture {
        routine: Routine,
        level1: SegmentId,
        level2: SegmentId,
        man1: SegmentId,
        man2: SegmentId,
        time1: SegmentId,
        time2: SegmentId,
    }

    /// level 1 (x2) -+- level 2 (x1) -+- level 3 (x1) --- man 2
    ///               |                \- man 1
    ///               +- time 1
    ///               \- time 2
    fn fixture() -> Fixture {
        let man1 = Segment::manual("man 1");
        let man2 = Segment::manual("man 2");
        let time1 = Segment::time("time 1", 2000);
        let time2 = Segment::time("time 2", 1000);
        let (man1_id, man2_id, time1_id, time2_id) =
            (man1.id(), man2.id(), time1.id(), time2.id());

        let level3 = Segment::repeat("level 3", 1, vec![man2]).unwrap();
        let level2 = Segment::repeat("level 2", 1, vec![level3, man1]).unwrap();
        let level2_id = level2.id();
        let level1 = Segment::repeat("level 1", 2, vec![level2, time1, time2]).unwrap();
        let level1_id = level1.id();

        let mut routine = Routine::with_event_log("nested", EventLog::new());
        routine.add(level1);
        routine.event_log().clear();

        Fixture {
            routine,
            level1: level1_id,
            level2: level2_id,
            man1: man1_id,
            man2: man2_id,
            time1: time1_id,
            time2: time2_id,
        }
    }

    fn flat_names(routine: &Routine) -> Vec<&str> {
        routine.flatten().into_iter().map(Segment::name).collect()
    }

    fn top_names(routine: &Routine) -> Vec<&str> {
        routine.segments().iter().map(Segment::name).collect()
    }

    #[test]
    fn test_add_appends_and_journals() {
        let mut routine = Routine::with_event_log("r", EventLog::new());
        routine.add(Segment::manual("first"));
        routine.add(Segment::time("second", 500));
        assert_eq!(top_names(&routine), vec!["first", "second"]);
        assert_eq!(
            routine.event_log().descriptions(),
            vec!["Added segment 'first'", "Added segment 'second'"]
        );
    }

    #[test]
    fn test_add_zero_length_repeat_is_synced() {
        let mut routine = Routine::with_event_log("z", EventLog::new());
        routine.add(Segment::repeat("instant sets", 3, vec![Segment::time("instant", 0)]).unwrap());
        assert!(routine.is_complete());
        assert_eq!(
            routine.segments()[0].as_repeat().unwrap().current_repetition(),
            3
        );

        routine.add(Segment::time("plank", 1000));
        assert!(!routine.is_complete());
        assert_eq!(routine.exact_current_segment().unwrap().name(), "plank");
    }

    #[test]
    fn test_insert_before_top_level_and_nested() {
        let mut f = fixture();
        f.routine
            .insert_before(Segment::manual("test"), f.level1)
            .unwrap();
        assert_eq!(top_names(&f.routine), vec!["test", "level 1"]);

        f.routine
            .insert_before(Segment::manual("test2"), f.level2)
            .unwrap();
        assert_eq!(top_names(&f.routine), vec!["test", "level 1"]);
        assert_eq!(
            flat_names(&f.routine),
            vec![
                "test", "level 1", "test2", "level 2", "level 3", "man 2", "man 1", "time 1",
                "time 2"
            ]
        );
    }

    #[test]
    fn test_insert_after_top_level_and_nested() {
        let mut f = fixture();
        f.routine
            .insert_after(Segment::manual("test"), f.level1)
            .unwrap();
        f.routine
            .insert_after(Segment::manual("test2"), f.level2)
            .unwrap();
        assert_eq!(top_names(&f.routine), vec!["level 1", "test"]);
        assert_eq!(
            flat_names(&f.routine),
            vec![
                "level 1", "level 2", "level 3", "man 2", "man 1", "test2", "time 1", "time 2",
                "test"
            ]
        );
        assert_eq!(
            f.routine.event_log().descriptions(),
            vec![
                "Inserted segment 'test' after 'level 1'",
                "Inserted segment 'test2' after 'level 2'"
            ]
        );
    }

    #[test]
    fn test_insert_with_missing_anchor_is_rejected() {
        let mut f = fixture();
        let before = f.routine.clone();
        let stranger = SegmentId::new();

        let err = f
            .routine
            .insert_after(Segment::manual("lost"), stranger)
            .unwrap_err();
        assert!(matches!(err, RoutineError::AnchorNotFound(id) if id == stranger));
        assert_eq!(f.routine, before);
        assert!(f.routine.event_log().is_empty());
    }

    #[test]
    fn test_remove_cascades_pruning() {
        let mut f = fixture();

        let removed = f.routine.remove(f.time1).unwrap();
        assert_eq!(removed.name(), "time 1");
        assert_eq!(
            flat_names(&f.routine),
            vec!["level 1", "level 2", "level 3", "man 2", "man 1", "time 2"]
        );

        // Only child of level 3: level 3 goes too.
        f.routine.remove(f.man2).unwrap();
        assert_eq!(
            flat_names(&f.routine),
            vec!["level 1", "level 2", "man 1", "time 2"]
        );

        f.routine.remove(f.time2).unwrap();
        assert_eq!(flat_names(&f.routine), vec!["level 1", "level 2", "man 1"]);

        // Empties level 2, which empties level 1.
        f.routine.remove(f.man1).unwrap();
        assert!(f.routine.segments().is_empty());
        assert!(f.routine.is_complete());

        assert_eq!(
            f.routine.event_log().descriptions(),
            vec![
                "Removed segment 'time 1'",
                "Removed segment 'man 2'",
                "Pruned empty repeat 'level 3'",
                "Removed segment 'time 2'",
                "Removed segment 'man 1'",
                "Pruned empty repeat 'level 2'",
                "Pruned empty repeat 'level 1'",
            ]
        );
    }

    #[test]
    fn test_remove_only_child_prunes_repeat() {
        let only = Segment::manual("only");
        let only_id = only.id();
        let mut routine = Routine::with_event_log("r", EventLog::new());
        routine.add(Segment::repeat("r", 2, vec![only]).unwrap());

        routine.remove(only_id).unwrap();
        assert!(routine.segments().is_empty());
    }

    #[test]
    fn test_remove_whole_repeat() {
        let mut f = fixture();
        let removed = f.routine.remove(f.level2).unwrap();
        assert_eq!(removed.children().len(), 2);
        assert_eq!(flat_names(&f.routine), vec!["level 1", "time 1", "time 2"]);
    }

    #[test]
    fn test_remove_missing_target() {
        let mut f = fixture();
        let before = f.routine.clone();
        assert!(matches!(
            f.routine.remove(SegmentId::new()),
            Err(RoutineError::AnchorNotFound(_))
        ));
        assert_eq!(f.routine, before);
    }

    #[test]
    fn test_edit_segment_renames_and_resizes() {
        let mut f = fixture();
        f.routine
            .edit_segment(f.time1, |segment| {
                segment.set_name("sprint");
                if let Some(time) = segment.as_time_mut() {
                    time.set_total_time(5000);
                }
            })
            .unwrap();

        let edited = f.routine.find(f.time1).unwrap().as_time().unwrap();
        assert_eq!(edited.name(), "sprint");
        assert_eq!(edited.total_ms(), 5000);
        assert_eq!(
            f.routine.event_log().descriptions(),
            vec!["Edited segment 'sprint'"]
        );
    }

    #[test]
    fn test_edit_segment_syncs_cycles() {
        let m = Segment::manual("m");
        let m_id = m.id();
        let repeat = Segment::repeat("r", 3, vec![m]).unwrap();
        let mut routine = Routine::with_event_log("r", EventLog::new());
        routine.add(repeat);

        routine
            .edit_segment(m_id, |segment| {
                segment.as_manual_mut().map(|manual| manual.set_complete())
            })
            .unwrap();

        let repeat = routine.segments()[0].as_repeat().unwrap();
        assert_eq!(repeat.current_repetition(), 2);
        assert!(!repeat.children()[0].is_complete());
    }

    #[test]
    fn test_edit_repeat_count() {
        let mut f = fixture();
        let result = f
            .routine
            .edit_segment(f.level1, |segment| {
                segment
                    .as_repeat_mut()
                    .map(|repeat: &mut RepeatSegment| repeat.set_new_repeats(5))
            })
            .unwrap();
        assert!(matches!(result, Some(Ok(()))));
        let level1 = f.routine.find(f.level1).unwrap().as_repeat().unwrap();
        assert_eq!(level1.total_repetitions(), 5);
    }

    #[test]
    fn test_edit_missing_segment() {
        let mut f = fixture();
        assert!(matches!(
            f.routine.edit_segment(SegmentId::new(), |_| ()),
            Err(RoutineError::AnchorNotFound(_))
        ));
    }
}

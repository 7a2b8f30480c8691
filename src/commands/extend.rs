//! Anchor/cursor vertical extension.
//!
//! Selected units are grouped into vertical slices: units in the same
//! measure that start at the same quant, whatever their staff. In each slice
//! the extreme farthest from the anchor is the cursor. Moving the cursor
//! toward the anchor contracts the slice; moving it away expands it.
//! Positions are compared with the vertical metric throughout.

use super::{changed, SelectionCommand, VerticalDirection};
use crate::score::quant::quant_key;
use crate::score::{Score, QUANT_EPSILON};
use crate::selection::metric::{metric_of, within};
use crate::selection::{
    live_members, members_of, Focus, MemberSet, Metric, ResolvedNote, SelectedNote, Selection,
};
use std::collections::BTreeMap;
use tracing::trace;

/// Shift+Up/Down over pitch and staves, bounded by the anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtendSelectionVerticallyCommand {
    pub direction: VerticalDirection,
}

/// Where one cursor step lands.
struct Step {
    note: SelectedNote,
    /// True if the step left the chord for another staff.
    crossed: bool,
}

/// Result of processing one slice.
struct SliceOutcome {
    members: Vec<SelectedNote>,
    /// Last unit touched that is still selected. None if the slice emptied.
    touched: Option<SelectedNote>,
}

impl ExtendSelectionVerticallyCommand {
    pub fn new(direction: VerticalDirection) -> Self {
        Self { direction }
    }

    /// Moves the cursor one position: first within its chord by pitch, then
    /// into the overlapping event of the adjacent staff.
    fn step(&self, score: &Score, cursor: &ResolvedNote<'_>) -> Option<Step> {
        let member = cursor.member;
        let chord = members_of(member.staff_index, member.measure_index, cursor.event);
        let index = chord.iter().position(|n| *n == member)?;
        let inside = match self.direction {
            VerticalDirection::Up => chord.get(index + 1),
            VerticalDirection::Down => index.checked_sub(1).and_then(|i| chord.get(i)),
            VerticalDirection::All => None,
        };
        if let Some(note) = inside {
            return Some(Step {
                note: *note,
                crossed: false,
            });
        }

        let staff_index = match self.direction {
            VerticalDirection::Up => member.staff_index.checked_sub(1)?,
            VerticalDirection::Down => member.staff_index + 1,
            VerticalDirection::All => return None,
        };
        let measure = score.measure(staff_index, member.measure_index)?;
        let spans = measure.spans();
        let event = spans
            .iter()
            .find(|(_, s, e)| {
                *s <= cursor.start + QUANT_EPSILON && cursor.start < *e - QUANT_EPSILON
            })
            .map(|(event, _, _)| *event)
            .or_else(|| {
                measure
                    .events_overlapping(cursor.start, cursor.end)
                    .first()
                    .copied()
            })?;
        let entry = members_of(staff_index, member.measure_index, event);
        // Coming from above lands on the top note, from below on the bottom.
        let note = match self.direction {
            VerticalDirection::Down => entry.last(),
            _ => entry.first(),
        };
        note.map(|n| Step {
            note: *n,
            crossed: true,
        })
    }

    /// Moves one slice's cursor. Every slice measures against the global
    /// anchor, including slices that do not contain it.
    fn extend_slice(
        &self,
        score: &Score,
        slice: &[ResolvedNote<'_>],
        anchor_metric: Metric,
    ) -> Option<SliceOutcome> {
        let a = anchor_metric;

        let lowest = slice.iter().min_by_key(|r| metric_of(r))?;
        let highest = slice.iter().max_by_key(|r| metric_of(r))?;
        let (to_low, to_high) = ((metric_of(lowest) - a).abs(), (metric_of(highest) - a).abs());
        let cursor = if to_high > to_low {
            highest
        } else if to_low > to_high {
            lowest
        } else if self.direction == VerticalDirection::Down {
            lowest
        } else {
            highest
        };
        let c = metric_of(cursor);

        let step = self.step(score, cursor)?;
        let new_cursor = score.resolve(&step.note)?;
        let n = metric_of(&new_cursor);

        let contracting = c != a
            && (n == a || ((n - a).signum() == (c - a).signum() && (n - a).abs() < (c - a).abs()));

        let current: MemberSet = slice.iter().map(|r| r.member).collect();
        let mut next: MemberSet;
        if contracting {
            next = slice
                .iter()
                .filter(|r| within(metric_of(r), a, n))
                .map(|r| r.member)
                .collect();
        } else {
            next = current.clone();
            if step.crossed {
                next.extend(members_of(
                    cursor.member.staff_index,
                    cursor.member.measure_index,
                    cursor.event,
                ));
                next.extend(members_of(
                    step.note.staff_index,
                    step.note.measure_index,
                    new_cursor.event,
                ));
            } else {
                next.insert(step.note);
            }
        }

        if next.len() == current.len() && next.iter().all(|n| current.contains(n)) {
            return None;
        }
        // A contracting step can land on a unit outside the kept range.
        let touched = if next.contains(&step.note) {
            Some(step.note)
        } else {
            slice
                .iter()
                .filter(|r| next.contains(&r.member))
                .min_by_key(|r| (metric_of(r) - n).abs())
                .map(|r| r.member)
        };
        Some(SliceOutcome {
            members: next.into_vec(),
            touched,
        })
    }

    /// `All`: complete every chord in the slice and pull in the overlapping
    /// events of every other staff.
    fn extend_slice_everywhere(
        &self,
        score: &Score,
        slice: &[ResolvedNote<'_>],
    ) -> Option<SliceOutcome> {
        let mut next: MemberSet = slice.iter().map(|r| r.member).collect();
        let mut touched = None;
        let mut add = |next: &mut MemberSet, notes: Vec<SelectedNote>| {
            for note in notes {
                if next.insert(note) {
                    touched = Some(note);
                }
            }
        };

        for r in slice {
            add(
                &mut next,
                members_of(r.member.staff_index, r.member.measure_index, r.event),
            );
        }
        let measure_index = slice.first()?.member.measure_index;
        let start = slice.iter().map(|r| r.start).fold(f64::INFINITY, f64::min);
        let end = slice.iter().map(|r| r.end).fold(f64::NEG_INFINITY, f64::max);
        for staff_index in 0..score.staff_count() {
            if slice.iter().any(|r| r.member.staff_index == staff_index) {
                continue;
            }
            let Some(measure) = score.measure(staff_index, measure_index) else {
                continue;
            };
            for event in measure.events_overlapping(start, end) {
                add(&mut next, members_of(staff_index, measure_index, event));
            }
        }

        touched.map(|note| SliceOutcome {
            members: next.into_vec(),
            touched: Some(note),
        })
    }
}

impl SelectionCommand for ExtendSelectionVerticallyCommand {
    fn name(&self) -> &'static str {
        match self.direction {
            VerticalDirection::Up => "extend selection up",
            VerticalDirection::Down => "extend selection down",
            VerticalDirection::All => "extend selection across staves",
        }
    }

    fn execute(&self, selection: &Selection, score: &Score) -> Option<Selection> {
        let members = live_members(selection, score);
        if members.is_empty() {
            trace!("vertical extend: nothing selected");
            return None;
        }
        let anchor = selection
            .anchor()
            .filter(|a| score.is_resolvable(a))
            .unwrap_or(members[0]);
        let anchor_metric = metric_of(&score.resolve(&anchor)?);

        let mut slices: BTreeMap<(usize, i64), Vec<ResolvedNote<'_>>> = BTreeMap::new();
        for resolved in members.iter().filter_map(|n| score.resolve(n)) {
            slices
                .entry((resolved.member.measure_index, quant_key(resolved.start)))
                .or_default()
                .push(resolved);
        }

        let mut result = MemberSet::new();
        let mut focus = None;
        let mut moved = false;
        for slice in slices.values() {
            let outcome = match self.direction {
                VerticalDirection::All => self.extend_slice_everywhere(score, slice),
                _ => self.extend_slice(score, slice, anchor_metric),
            };
            match outcome {
                Some(outcome) => {
                    moved = true;
                    result.extend(outcome.members);
                    focus = outcome.touched.or(focus);
                }
                None => result.extend(slice.iter().map(|r| r.member)),
            }
        }

        if !moved {
            trace!(direction = ?self.direction, "vertical extend: no slice can move");
            return None;
        }
        // Falls back to the last member when every touched slice emptied.
        let focus = focus.map(|f| Focus::on(&f)).unwrap_or_default();
        changed(selection, Selection::new(focus, Some(anchor), result.into_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::score::{Clef, Event, NoteValue, Tuplet};
    use crate::test_support::{at, grand_staff, pitches, score_of, whole_event};

    fn up() -> ExtendSelectionVerticallyCommand {
        ExtendSelectionVerticallyCommand::new(VerticalDirection::Up)
    }

    fn down() -> ExtendSelectionVerticallyCommand {
        ExtendSelectionVerticallyCommand::new(VerticalDirection::Down)
    }

    #[test]
    fn test_chord_steps_then_stops_at_top() {
        let score = score_of(vec![(
            Clef::Treble,
            vec![vec![Event::chord(NoteValue::Whole, &[60, 64, 67])]],
        )]);
        let mut sel = Selection::single(at(&score, 0, 0, 0, 0));
        sel = up().execute(&sel, &score).unwrap();
        assert_eq!(pitches(&score, &sel), vec![(0, 60), (0, 64)]);
        sel = up().execute(&sel, &score).unwrap();
        assert_eq!(pitches(&score, &sel), vec![(0, 60), (0, 64), (0, 67)]);
        // No cycling and no staff above.
        assert!(up().execute(&sel, &score).is_none());
    }

    #[test]
    fn test_contracts_back_to_anchor_then_expands_other_way() {
        let score = score_of(vec![(
            Clef::Treble,
            vec![vec![Event::chord(NoteValue::Whole, &[60, 64, 67, 72])]],
        )]);
        let anchor = at(&score, 0, 0, 0, 1);
        let mut sel = Selection::single(anchor);

        sel = up().execute(&sel, &score).unwrap();
        sel = up().execute(&sel, &score).unwrap();
        assert_eq!(pitches(&score, &sel), vec![(0, 64), (0, 67), (0, 72)]);

        sel = down().execute(&sel, &score).unwrap();
        assert_eq!(pitches(&score, &sel), vec![(0, 64), (0, 67)]);
        assert_eq!(sel.focus().note_id, at(&score, 0, 0, 0, 2).note_id);

        sel = down().execute(&sel, &score).unwrap();
        assert_eq!(pitches(&score, &sel), vec![(0, 64)]);

        sel = down().execute(&sel, &score).unwrap();
        assert_eq!(pitches(&score, &sel), vec![(0, 60), (0, 64)]);
        assert_eq!(sel.anchor(), Some(anchor));
    }

    #[test]
    fn test_crossing_pulls_in_both_chords() {
        let score = grand_staff();
        let bottom_of_treble = at(&score, 0, 0, 0, 0);
        let sel = Selection::single(bottom_of_treble);

        let next = down().execute(&sel, &score).unwrap();
        assert_eq!(
            pitches(&score, &next),
            vec![(0, 72), (0, 76), (0, 79), (1, 48), (1, 55)]
        );
        // Entered the bass chord from above: its top note is the cursor.
        assert_eq!(next.focus(), Focus::on(&at(&score, 1, 0, 0, 1)));
        assert_eq!(next.anchor(), Some(bottom_of_treble));
    }

    #[test]
    fn test_contraction_across_staves_uses_metric_range() {
        let score = grand_staff();
        let anchor = at(&score, 0, 0, 0, 0);
        let mut sel = down().execute(&Selection::single(anchor), &score).unwrap();

        // Cursor is the lowest bass note; moving up contracts toward the anchor.
        sel = up().execute(&sel, &score).unwrap();
        assert_eq!(pitches(&score, &sel), vec![(0, 72), (1, 55)]);

        // Leaving the bass staff upward lands on the bottom treble note: the anchor.
        sel = up().execute(&sel, &score).unwrap();
        assert_eq!(pitches(&score, &sel), vec![(0, 72)]);
        assert_eq!(sel.anchor(), Some(anchor));
    }

    #[test]
    fn test_up_from_bass_enters_bottom_of_treble() {
        let score = grand_staff();
        let top_of_bass = at(&score, 1, 0, 2, 1);
        let next = up().execute(&Selection::single(top_of_bass), &score).unwrap();
        assert_eq!(
            pitches(&score, &next),
            vec![(0, 72), (0, 76), (0, 79), (1, 48), (1, 55)]
        );
        assert_eq!(next.focus(), Focus::on(&at(&score, 0, 0, 2, 0)));
    }

    #[test]
    fn test_slices_move_independently() {
        let score = grand_staff();
        let first = at(&score, 0, 0, 0, 0);
        let other_beat = at(&score, 0, 1, 3, 1);
        let sel = Selection::new(Focus::on(&first), Some(first), vec![first, other_beat]);

        let next = up().execute(&sel, &score).unwrap();
        assert!(next.contains(&at(&score, 0, 0, 0, 1)));
        assert!(next.contains(&at(&score, 0, 1, 3, 2)));
        assert_eq!(next.len(), 4);
    }

    #[test]
    fn test_no_staff_below_is_no_op() {
        let score = grand_staff();
        let bottom = Selection::single(at(&score, 1, 0, 0, 0));
        assert!(down().execute(&bottom, &score).is_none());
    }

    #[test]
    fn test_overlap_picks_event_sounding_at_cursor_start() {
        let score = score_of(vec![
            (
                Clef::Treble,
                vec![vec![
                    Event::note(NoteValue::Half, 72),
                    Event::note(NoteValue::Quarter, 74),
                    Event::note(NoteValue::Quarter, 76),
                ]],
            ),
            (
                Clef::Bass,
                vec![vec![
                    Event::rest(NoteValue::Quarter),
                    Event::chord(NoteValue::Half, &[43, 50]),
                    Event::note(NoteValue::Quarter, 48),
                ]],
            ),
        ]);
        // Treble quarter at 32 sits inside the bass half note (16..48).
        let sel = Selection::single(at(&score, 0, 0, 1, 0));
        let next = down().execute(&sel, &score).unwrap();
        assert_eq!(pitches(&score, &next), vec![(0, 74), (1, 43), (1, 50)]);
    }

    #[test]
    fn test_returns_to_anchor_after_crossing_into_earlier_event() {
        // Bass chord starts at 16, before the anchor's treble quarter at 32,
        // so the crossing creates a second slice without the anchor.
        let score = score_of(vec![
            (
                Clef::Treble,
                vec![vec![
                    Event::note(NoteValue::Half, 72),
                    Event::note(NoteValue::Quarter, 74),
                    Event::note(NoteValue::Quarter, 76),
                ]],
            ),
            (
                Clef::Bass,
                vec![vec![
                    Event::rest(NoteValue::Quarter),
                    Event::chord(NoteValue::Half, &[43, 50]),
                    Event::note(NoteValue::Quarter, 48),
                ]],
            ),
        ]);
        let anchor = at(&score, 0, 0, 1, 0);
        let mut sel = down().execute(&Selection::single(anchor), &score).unwrap();
        assert_eq!(pitches(&score, &sel), vec![(0, 74), (1, 43), (1, 50)]);

        sel = up().execute(&sel, &score).unwrap();
        assert_eq!(pitches(&score, &sel), vec![(0, 74), (1, 50)]);
        assert_eq!(sel.focus(), Focus::on(&at(&score, 1, 0, 1, 1)));

        // Stepping up again moves toward the anchor, so nothing new joins.
        sel = up().execute(&sel, &score).unwrap();
        assert_eq!(pitches(&score, &sel), vec![(0, 74)]);
        assert_eq!(sel, Selection::single(anchor));

        assert!(up().execute(&sel, &score).is_none());
    }

    #[test]
    fn test_triplet_group_and_plain_quarter_share_a_slice() {
        // Three triplet eighths fill the first beat; the quarter after them
        // starts at 16 despite fractional triplet lengths.
        let triplets = (0..3).map(|i| {
            Event::note(NoteValue::Eighth, 67 + i as u8).with_tuplet(Tuplet::triplet(i))
        });
        let mut treble: Vec<Event> = triplets.collect();
        treble.push(Event::note(NoteValue::Quarter, 72));
        treble.push(Event::note(NoteValue::Half, 74));
        let score = score_of(vec![
            (Clef::Treble, vec![treble]),
            (
                Clef::Bass,
                vec![vec![
                    Event::note(NoteValue::Quarter, 41),
                    Event::chord(NoteValue::Quarter, &[43, 48]),
                    Event::note(NoteValue::Half, 45),
                ]],
            ),
        ]);
        let anchor = at(&score, 1, 0, 1, 1);
        let treble_quarter = at(&score, 0, 0, 3, 0);
        let sel = Selection::new(
            Focus::on(&treble_quarter),
            Some(anchor),
            vec![anchor, treble_quarter],
        );

        // One slice: the treble quarter is the cursor and steps down onto
        // the anchor, contracting to it. Separate slices would instead grow
        // the bass chord to 43.
        let next = down().execute(&sel, &score).unwrap();
        assert_eq!(pitches(&score, &next), vec![(1, 48)]);
    }

    #[test]
    fn test_stale_members_are_skipped() {
        let score = grand_staff();
        let good = at(&score, 0, 0, 0, 0);
        let stale = SelectedNote::new(0, 7, good.event_id, good.note_id);

        let sel = Selection::new(Focus::on(&good), Some(good), vec![good, stale]);
        let next = up().execute(&sel, &score).unwrap();
        assert_eq!(pitches(&score, &next), vec![(0, 72), (0, 76)]);
        assert!(!next.contains(&stale));

        assert!(down().execute(&Selection::single(stale), &score).is_none());
        assert!(up().execute(&Selection::single(stale), &score).is_none());
    }

    #[test]
    fn test_all_is_always_expansion() {
        let score = grand_staff();
        let sel = Selection::new(Focus::default(), None, whole_event(&score, 1, 0, 1));
        let all = ExtendSelectionVerticallyCommand::new(VerticalDirection::All);
        let next = all.execute(&sel, &score).unwrap();
        assert_eq!(next.len(), 5);
        assert!(all.execute(&next, &score).is_none());
    }

    #[test]
    fn test_empty_is_no_op() {
        let score = grand_staff();
        assert!(up().execute(&Selection::empty(), &score).is_none());
    }
}

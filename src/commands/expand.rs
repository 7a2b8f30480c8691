//! Unidirectional vertical expansion.
//!
//! Partial chords are filled one note at a time, cycling around the chord.
//! Once every touched event is complete the selection spills onto
//! neighbouring staves. Nothing is ever removed.

use super::{changed, SelectionCommand, VerticalDirection};
use crate::score::{Quants, Score};
use crate::selection::{live_members, members_of, Focus, MemberSet, SelectedNote, Selection};
use std::collections::{BTreeMap, BTreeSet};
use tracing::trace;

/// Grows the selection up, down, or across every staff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpandSelectionVerticallyCommand {
    pub direction: VerticalDirection,
}

impl ExpandSelectionVerticallyCommand {
    pub fn new(direction: VerticalDirection) -> Self {
        Self { direction }
    }

    /// The next unselected unit of a partial chord, wrapping at the ends.
    fn next_in_chord(&self, chord: &[SelectedNote], selected: &MemberSet) -> Vec<SelectedNote> {
        let len = chord.len();
        let chosen: Vec<usize> = (0..len).filter(|i| selected.contains(&chord[*i])).collect();
        let (Some(&lowest), Some(&highest)) = (chosen.first(), chosen.last()) else {
            return Vec::new();
        };
        let candidate = match self.direction {
            VerticalDirection::All => {
                return chord
                    .iter()
                    .filter(|n| !selected.contains(n))
                    .copied()
                    .collect();
            }
            VerticalDirection::Up => (1..len)
                .map(|k| (highest + k) % len)
                .find(|i| !selected.contains(&chord[*i])),
            VerticalDirection::Down => (1..len)
                .map(|k| (lowest + len - k) % len)
                .find(|i| !selected.contains(&chord[*i])),
        };
        candidate.map(|i| vec![chord[i]]).unwrap_or_default()
    }

    /// Staves to spill onto once every touched event is complete.
    fn target_staves(&self, touched: &BTreeSet<usize>, staff_count: usize) -> Vec<usize> {
        match self.direction {
            VerticalDirection::Up => touched
                .first()
                .and_then(|top| top.checked_sub(1))
                .into_iter()
                .collect(),
            VerticalDirection::Down => touched
                .last()
                .map(|bottom| bottom + 1)
                .filter(|s| *s < staff_count)
                .into_iter()
                .collect(),
            VerticalDirection::All => (0..staff_count).filter(|s| !touched.contains(s)).collect(),
        }
    }
}

impl SelectionCommand for ExpandSelectionVerticallyCommand {
    fn name(&self) -> &'static str {
        match self.direction {
            VerticalDirection::Up => "expand selection up",
            VerticalDirection::Down => "expand selection down",
            VerticalDirection::All => "expand selection to all staves",
        }
    }

    fn execute(&self, selection: &Selection, score: &Score) -> Option<Selection> {
        let members = live_members(selection, score);
        if members.is_empty() {
            trace!("vertical expand: nothing selected");
            return None;
        }
        let anchor = selection
            .anchor()
            .filter(|a| score.is_resolvable(a))
            .unwrap_or(members[0]);

        let mut result: MemberSet = members.iter().copied().collect();
        let mut appended: Vec<SelectedNote> = Vec::new();

        let chords: Vec<Vec<SelectedNote>> = Selection::new(Focus::default(), None, members.clone())
            .touched_events()
            .into_iter()
            .filter_map(|(s, m, id)| score.event(s, m, id).map(|e| members_of(s, m, e)))
            .collect();
        let partial: Vec<&Vec<SelectedNote>> = chords
            .iter()
            .filter(|chord| chord.iter().any(|n| !result.contains(n)))
            .collect();

        if !partial.is_empty() {
            let before = result.clone();
            for chord in partial {
                for note in self.next_in_chord(chord, &before) {
                    if result.insert(note) {
                        appended.push(note);
                    }
                }
            }
        } else {
            let touched: BTreeSet<usize> = members.iter().map(|n| n.staff_index).collect();
            let targets = self.target_staves(&touched, score.staff_count());
            if targets.is_empty() {
                trace!(direction = ?self.direction, "vertical expand: no staff to spill onto");
                return None;
            }

            // Span of the selection per measure index, across staves.
            let mut spans: BTreeMap<usize, (Quants, Quants)> = BTreeMap::new();
            for resolved in members.iter().filter_map(|n| score.resolve(n)) {
                let span = spans
                    .entry(resolved.member.measure_index)
                    .or_insert((resolved.start, resolved.end));
                span.0 = span.0.min(resolved.start);
                span.1 = span.1.max(resolved.end);
            }

            for staff_index in targets {
                for (&measure_index, &(start, end)) in &spans {
                    let Some(measure) = score.measure(staff_index, measure_index) else {
                        continue;
                    };
                    for event in measure.events_overlapping(start, end) {
                        for note in members_of(staff_index, measure_index, event) {
                            if result.insert(note) {
                                appended.push(note);
                            }
                        }
                    }
                }
            }
        }

        let Some(last) = appended.last() else {
            trace!("vertical expand: nothing to add");
            return None;
        };
        changed(
            selection,
            Selection::new(Focus::on(last), Some(anchor), result.into_vec()),
        )
    }
}

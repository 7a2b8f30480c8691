//! Selection state: anchor, focus and the set of selected units.
//!
//! A `Selection` is immutable once built. Commands read one and produce a
//! new one; nothing edits a selection in place.

pub mod metric;
mod resolve;

pub use metric::{vertical_metric, Metric, PITCH_SCALE, STAFF_LIMIT};
pub use resolve::{members_of, ResolvedNote};
pub(crate) use resolve::live_members;

use crate::score::{EventId, NoteId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// One selectable unit: a note of an event, or a rest placeholder
/// (`note_id = None`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SelectedNote {
    pub staff_index: usize,
    pub measure_index: usize,
    pub event_id: EventId,
    pub note_id: Option<NoteId>,
}

/// Identifies an event by its position in the tree.
pub type EventKey = (usize, usize, EventId);

impl SelectedNote {
    pub fn new(
        staff_index: usize,
        measure_index: usize,
        event_id: EventId,
        note_id: Option<NoteId>,
    ) -> Self {
        Self {
            staff_index,
            measure_index,
            event_id,
            note_id,
        }
    }

    /// The (staff, measure, event) this unit belongs to.
    pub fn event_key(&self) -> EventKey {
        (self.staff_index, self.measure_index, self.event_id)
    }

    /// True if both units belong to the same event.
    pub fn same_event(&self, other: &SelectedNote) -> bool {
        self.event_key() == other.event_key()
    }
}

/// The most recently touched unit. `event_id = None` means no selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Focus {
    pub staff_index: usize,
    pub measure_index: usize,
    pub event_id: Option<EventId>,
    pub note_id: Option<NoteId>,
}

impl Focus {
    /// Focus on a selected unit.
    pub fn on(note: &SelectedNote) -> Self {
        Self {
            staff_index: note.staff_index,
            measure_index: note.measure_index,
            event_id: Some(note.event_id),
            note_id: note.note_id,
        }
    }

    /// The unit this focus points at, if any.
    pub fn as_member(&self) -> Option<SelectedNote> {
        self.event_id.map(|event_id| {
            SelectedNote::new(self.staff_index, self.measure_index, event_id, self.note_id)
        })
    }
}

/// Anchor, focus and selected units.
///
/// Invariant: `selected_notes` is empty exactly when `focus.event_id` is
/// `None`. Members never repeat; their order is insertion order, which some
/// commands use to pick the new focus.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Selection {
    focus: Focus,
    anchor: Option<SelectedNote>,
    selected_notes: Vec<SelectedNote>,
}

impl Selection {
    /// The "no selection" state.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A fresh selection of one unit, which becomes both anchor and focus.
    pub fn single(note: SelectedNote) -> Self {
        Self {
            focus: Focus::on(&note),
            anchor: Some(note),
            selected_notes: vec![note],
        }
    }

    /// Builds a selection, dropping duplicate members.
    ///
    /// An empty member list yields the empty selection regardless of the
    /// focus and anchor passed in. A focus with no event falls back to the
    /// last member.
    pub fn new(
        focus: Focus,
        anchor: Option<SelectedNote>,
        notes: impl IntoIterator<Item = SelectedNote>,
    ) -> Self {
        let selected_notes = MemberSet::from_iter(notes).into_vec();
        let Some(last) = selected_notes.last().copied() else {
            return Self::empty();
        };
        let focus = if focus.event_id.is_some() {
            focus
        } else {
            Focus::on(&last)
        };
        Self {
            focus,
            anchor,
            selected_notes,
        }
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn anchor(&self) -> Option<SelectedNote> {
        self.anchor
    }

    /// Selected units in insertion order.
    pub fn notes(&self) -> &[SelectedNote] {
        &self.selected_notes
    }

    pub fn len(&self) -> usize {
        self.selected_notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected_notes.is_empty()
    }

    pub fn contains(&self, note: &SelectedNote) -> bool {
        self.selected_notes.contains(note)
    }

    /// Indices of staves holding at least one selected unit.
    pub fn touched_staves(&self) -> BTreeSet<usize> {
        self.selected_notes.iter().map(|n| n.staff_index).collect()
    }

    /// Distinct events holding at least one selected unit, in order of first
    /// appearance.
    pub fn touched_events(&self) -> Vec<EventKey> {
        let mut seen = HashSet::new();
        self.selected_notes
            .iter()
            .map(SelectedNote::event_key)
            .filter(|key| seen.insert(*key))
            .collect()
    }

    /// The anchor, or the first selected unit when none was set.
    pub fn anchor_or_first(&self) -> Option<SelectedNote> {
        self.anchor.or_else(|| self.selected_notes.first().copied())
    }

    /// The anchor, or the focused unit, or the first selected unit.
    pub fn anchor_or_focus(&self) -> Option<SelectedNote> {
        self.anchor
            .or_else(|| self.focus.as_member().filter(|f| self.contains(f)))
            .or_else(|| self.selected_notes.first().copied())
    }

    /// Members added and removed going from `self` to `next`.
    pub fn diff(&self, next: &Selection) -> SelectionDelta {
        let before: HashSet<&SelectedNote> = self.selected_notes.iter().collect();
        let after: HashSet<&SelectedNote> = next.selected_notes.iter().collect();
        SelectionDelta {
            added: next
                .selected_notes
                .iter()
                .filter(|n| !before.contains(n))
                .copied()
                .collect(),
            removed: self
                .selected_notes
                .iter()
                .filter(|n| !after.contains(n))
                .copied()
                .collect(),
        }
    }

    /// Same members regardless of order.
    pub fn same_members(&self, other: &Selection) -> bool {
        self.len() == other.len() && other.selected_notes.iter().all(|n| self.contains(n))
    }
}

/// Selections are equal when focus, anchor and member set match; member
/// order is not significant.
impl PartialEq for Selection {
    fn eq(&self, other: &Self) -> bool {
        self.focus == other.focus && self.anchor == other.anchor && self.same_members(other)
    }
}

impl Eq for Selection {}

/// Membership change produced by one command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionDelta {
    pub added: Vec<SelectedNote>,
    pub removed: Vec<SelectedNote>,
}

impl SelectionDelta {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Insertion-ordered set of members used while a command accumulates its
/// result.
#[derive(Debug, Clone, Default)]
pub(crate) struct MemberSet {
    order: Vec<SelectedNote>,
    seen: HashSet<SelectedNote>,
}

impl MemberSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a member; returns false if it was already present.
    pub fn insert(&mut self, note: SelectedNote) -> bool {
        if self.seen.insert(note) {
            self.order.push(note);
            true
        } else {
            false
        }
    }

    pub fn contains(&self, note: &SelectedNote) -> bool {
        self.seen.contains(note)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SelectedNote> {
        self.order.iter()
    }

    pub fn into_vec(self) -> Vec<SelectedNote> {
        self.order
    }
}

impl Extend<SelectedNote> for MemberSet {
    fn extend<T: IntoIterator<Item = SelectedNote>>(&mut self, iter: T) {
        for note in iter {
            self.insert(note);
        }
    }
}

impl FromIterator<SelectedNote> for MemberSet {
    fn from_iter<T: IntoIterator<Item = SelectedNote>>(iter: T) -> Self {
        let mut set = MemberSet::new();
        set.extend(iter);
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(staff: usize, event: EventId, note: Option<NoteId>) -> SelectedNote {
        SelectedNote::new(staff, 0, event, note)
    }

    #[test]
    fn test_empty_invariant() {
        let empty = Selection::empty();
        assert!(empty.is_empty());
        assert!(empty.focus().event_id.is_none());

        let e = EventId::new();
        let forced = Selection::new(Focus::on(&member(0, e, None)), None, Vec::new());
        assert!(forced.is_empty());
        assert!(forced.focus().event_id.is_none());
        assert!(forced.anchor().is_none());
    }

    #[test]
    fn test_new_dedups_and_defaults_focus() {
        let e = EventId::new();
        let a = member(0, e, Some(NoteId::new()));
        let b = member(0, e, Some(NoteId::new()));
        let sel = Selection::new(Focus::default(), None, vec![a, b, a]);
        assert_eq!(sel.len(), 2);
        assert_eq!(sel.focus().note_id, b.note_id);
    }

    #[test]
    fn test_equality_ignores_order() {
        let e = EventId::new();
        let a = member(0, e, Some(NoteId::new()));
        let b = member(1, e, Some(NoteId::new()));
        let focus = Focus::on(&a);
        let one = Selection::new(focus, Some(a), vec![a, b]);
        let two = Selection::new(focus, Some(a), vec![b, a]);
        assert_eq!(one, two);
        assert_ne!(one, Selection::new(focus, None, vec![a, b]));
    }

    #[test]
    fn test_touched_events_first_appearance() {
        let e1 = EventId::new();
        let e2 = EventId::new();
        let sel = Selection::new(
            Focus::default(),
            None,
            vec![
                member(0, e2, Some(NoteId::new())),
                member(0, e1, Some(NoteId::new())),
                member(0, e2, Some(NoteId::new())),
            ],
        );
        assert_eq!(sel.touched_events(), vec![(0, 0, e2), (0, 0, e1)]);
        assert_eq!(sel.touched_staves().into_iter().collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn test_anchor_fallbacks() {
        let e = EventId::new();
        let a = member(0, e, Some(NoteId::new()));
        let b = member(0, e, Some(NoteId::new()));
        let sel = Selection::new(Focus::on(&b), None, vec![a, b]);
        assert_eq!(sel.anchor_or_first(), Some(a));
        assert_eq!(sel.anchor_or_focus(), Some(b));
        assert_eq!(Selection::single(a).anchor_or_focus(), Some(a));
    }

    #[test]
    fn test_diff() {
        let e = EventId::new();
        let a = member(0, e, Some(NoteId::new()));
        let b = member(0, e, Some(NoteId::new()));
        let c = member(0, e, Some(NoteId::new()));
        let before = Selection::new(Focus::default(), None, vec![a, b]);
        let after = Selection::new(Focus::default(), None, vec![b, c]);
        let delta = before.diff(&after);
        assert_eq!(delta.added, vec![c]);
        assert_eq!(delta.removed, vec![a]);
        assert!(before.diff(&before).is_empty());
    }
}

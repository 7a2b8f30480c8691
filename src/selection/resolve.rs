//! Re-resolving selected units against a score snapshot.
//!
//! Selections hold ids, never references. Every command looks its members
//! up again here and silently drops the ones that no longer exist.

use super::{Focus, SelectedNote, Selection};
use crate::score::{Event, Measure, Quants, Score, Staff};

/// A selected unit located in the tree, with its timing and pitch.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedNote<'a> {
    pub member: SelectedNote,
    pub staff: &'a Staff,
    pub measure: &'a Measure,
    pub event: &'a Event,
    /// Index of the event within its measure.
    pub event_index: usize,
    pub start: Quants,
    pub end: Quants,
    /// Note pitch, or the clef's default pitch for a rest.
    pub pitch: u8,
}

/// Every selectable unit of `event`, lowest pitch first.
pub fn members_of(staff_index: usize, measure_index: usize, event: &Event) -> Vec<SelectedNote> {
    event
        .selectable_ids()
        .into_iter()
        .map(|note_id| SelectedNote::new(staff_index, measure_index, event.id, note_id))
        .collect()
}

impl Score {
    /// Locates a selected unit. Returns None if any level of its path no
    /// longer exists.
    pub fn resolve(&self, member: &SelectedNote) -> Option<ResolvedNote<'_>> {
        let staff = self.staff(member.staff_index)?;
        let measure = staff.measure(member.measure_index)?;
        let event_index = measure.event_index(member.event_id)?;
        let event = &measure.events()[event_index];
        if !event.has_selectable(member.note_id) {
            return None;
        }
        let (start, end) = measure.event_span(member.event_id)?;
        let pitch = member
            .note_id
            .and_then(|id| event.get_note(id))
            .map(|n| n.pitch)
            .unwrap_or_else(|| staff.clef.default_pitch());
        Some(ResolvedNote {
            member: *member,
            staff,
            measure,
            event,
            event_index,
            start,
            end,
            pitch,
        })
    }

    pub fn is_resolvable(&self, member: &SelectedNote) -> bool {
        self.resolve(member).is_some()
    }

    /// Addresses a unit by position: the `note_index`-th note from the
    /// bottom of the event. Rests accept only index 0.
    pub fn member_at(
        &self,
        staff: usize,
        measure: usize,
        event_index: usize,
        note_index: usize,
    ) -> Option<SelectedNote> {
        let event = self.measure(staff, measure)?.events().get(event_index)?;
        let note_id = *event.selectable_ids().get(note_index)?;
        Some(SelectedNote::new(staff, measure, event.id, note_id))
    }

    /// Every selectable unit of the event at a position.
    pub fn event_members_at(
        &self,
        staff: usize,
        measure: usize,
        event_index: usize,
    ) -> Option<Vec<SelectedNote>> {
        let event = self.measure(staff, measure)?.events().get(event_index)?;
        Some(members_of(staff, measure, event))
    }
}

/// Members of `selection` that still resolve, in selection order.
pub(crate) fn live_members(selection: &Selection, score: &Score) -> Vec<SelectedNote> {
    selection
        .notes()
        .iter()
        .filter(|n| score.is_resolvable(n))
        .copied()
        .collect()
}

impl Selection {
    /// Drops members that no longer resolve against `score`.
    ///
    /// The anchor is kept only if it still resolves; the focus falls back to
    /// the last surviving member when its own unit is gone.
    pub fn retain_resolvable(&self, score: &Score) -> Selection {
        let members = live_members(self, score);
        let anchor = self.anchor().filter(|a| score.is_resolvable(a));
        let focus = self
            .focus()
            .as_member()
            .filter(|f| score.is_resolvable(f))
            .map(|f| Focus::on(&f))
            .unwrap_or_default();
        Selection::new(focus, anchor, members)
    }
}

//! Fresh selections: click a note, click a chord, clear.
//!
//! These replace the selection wholesale and set a new anchor.

use super::{changed, SelectionCommand};
use crate::score::Score;
use crate::selection::{members_of, EventKey, Focus, SelectedNote, Selection};
use tracing::trace;

/// Selects a single unit, making it the anchor and focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectNoteCommand {
    pub target: SelectedNote,
}

impl SelectNoteCommand {
    pub fn new(target: SelectedNote) -> Self {
        Self { target }
    }
}

impl SelectionCommand for SelectNoteCommand {
    fn name(&self) -> &'static str {
        "select note"
    }

    fn execute(&self, selection: &Selection, score: &Score) -> Option<Selection> {
        if !score.is_resolvable(&self.target) {
            trace!(note = ?self.target, "select note: target does not resolve");
            return None;
        }
        changed(selection, Selection::single(self.target))
    }
}

/// Selects every unit of one event. The lowest note becomes anchor and
/// focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectEventCommand {
    pub event: EventKey,
}

impl SelectEventCommand {
    pub fn new(event: EventKey) -> Self {
        Self { event }
    }
}

impl SelectionCommand for SelectEventCommand {
    fn name(&self) -> &'static str {
        "select chord"
    }

    fn execute(&self, selection: &Selection, score: &Score) -> Option<Selection> {
        let (staff_index, measure_index, event_id) = self.event;
        let Some(event) = score.event(staff_index, measure_index, event_id) else {
            trace!(?event_id, "select chord: event does not resolve");
            return None;
        };
        let members = members_of(staff_index, measure_index, event);
        let lowest = *members.first()?;
        changed(
            selection,
            Selection::new(Focus::on(&lowest), Some(lowest), members),
        )
    }
}

/// Drops the whole selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClearSelectionCommand;

impl SelectionCommand for ClearSelectionCommand {
    fn name(&self) -> &'static str {
        "clear selection"
    }

    fn execute(&self, selection: &Selection, _score: &Score) -> Option<Selection> {
        if selection.is_empty() {
            None
        } else {
            Some(Selection::empty())
        }
    }
}

//! Completing partially selected chords.

use super::{changed, SelectionCommand};
use crate::score::Score;
use crate::selection::{live_members, members_of, Focus, MemberSet, Selection};
use tracing::trace;

/// Replaces partial membership of every touched event with the whole event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectFullEventsCommand;

impl SelectionCommand for SelectFullEventsCommand {
    fn name(&self) -> &'static str {
        "select full chords"
    }

    fn execute(&self, selection: &Selection, score: &Score) -> Option<Selection> {
        let members = live_members(selection, score);
        if members.is_empty() {
            trace!("full events: nothing selected");
            return None;
        }
        let anchor = selection
            .anchor()
            .filter(|a| score.is_resolvable(a))
            .unwrap_or(members[0]);

        let mut result = MemberSet::new();
        for member in &members {
            let (staff_index, measure_index) = (member.staff_index, member.measure_index);
            if let Some(event) = score.event(staff_index, measure_index, member.event_id) {
                result.extend(members_of(staff_index, measure_index, event));
            }
        }

        let focus = selection
            .focus()
            .as_member()
            .filter(|f| result.contains(f))
            .map(|f| Focus::on(&f))
            .unwrap_or_default();
        changed(selection, Selection::new(focus, Some(anchor), result.into_vec()))
    }
}

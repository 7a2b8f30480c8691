//! Select-all with progressive broadening.
//!
//! Repeated invocations climb a fixed ladder of scopes: the touched chords,
//! then the touched measures, then the touched staves, then the whole score.

use super::{changed, SelectionCommand};
use crate::score::Score;
use crate::selection::{live_members, members_of, Focus, MemberSet, SelectedNote, Selection};
use std::collections::BTreeSet;
use tracing::trace;

/// One rung of the select-all ladder, narrowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SelectScope {
    Events,
    Measures,
    Staves,
    Score,
}

impl SelectScope {
    pub const LADDER: [SelectScope; 4] = [
        SelectScope::Events,
        SelectScope::Measures,
        SelectScope::Staves,
        SelectScope::Score,
    ];

    /// Every unit inside this scope around `members`.
    fn members(self, score: &Score, members: &[SelectedNote]) -> Vec<SelectedNote> {
        let mut out = MemberSet::new();
        match self {
            SelectScope::Events => {
                for n in members {
                    if let Some(event) = score.event(n.staff_index, n.measure_index, n.event_id) {
                        out.extend(members_of(n.staff_index, n.measure_index, event));
                    }
                }
            }
            SelectScope::Measures => {
                let measures: BTreeSet<(usize, usize)> = members
                    .iter()
                    .map(|n| (n.staff_index, n.measure_index))
                    .collect();
                for (s, m) in measures {
                    if let Some(measure) = score.measure(s, m) {
                        for event in measure.events() {
                            out.extend(members_of(s, m, event));
                        }
                    }
                }
            }
            SelectScope::Staves => {
                let staves: BTreeSet<usize> = members.iter().map(|n| n.staff_index).collect();
                for s in staves {
                    out.extend(staff_members(score, s));
                }
            }
            SelectScope::Score => {
                for s in 0..score.staff_count() {
                    out.extend(staff_members(score, s));
                }
            }
        }
        out.into_vec()
    }
}

fn staff_members(score: &Score, staff_index: usize) -> Vec<SelectedNote> {
    score
        .staff(staff_index)
        .map(|staff| {
            staff
                .events_in_order()
                .into_iter()
                .flat_map(|(m, event)| members_of(staff_index, m, event))
                .collect()
        })
        .unwrap_or_default()
}

/// Select everything, or with `expand_if_selected` widen one scope at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectAllCommand {
    pub expand_if_selected: bool,
}

impl SelectAllCommand {
    pub fn new(expand_if_selected: bool) -> Self {
        Self { expand_if_selected }
    }
}

impl SelectionCommand for SelectAllCommand {
    fn name(&self) -> &'static str {
        "select all"
    }

    fn execute(&self, selection: &Selection, score: &Score) -> Option<Selection> {
        let members = live_members(selection, score);
        let current: MemberSet = members.iter().copied().collect();

        let target = if !self.expand_if_selected || members.is_empty() {
            SelectScope::Score.members(score, &members)
        } else {
            // Each rung contains the previous one, so the first that adds
            // anything is the next wider scope.
            SelectScope::LADDER
                .iter()
                .map(|scope| scope.members(score, &members))
                .find(|candidate| candidate.len() > current.len())
                .unwrap_or_else(|| members.clone())
        };
        if target.is_empty() {
            trace!("select all: score has no events");
            return None;
        }

        let anchor = selection
            .anchor()
            .filter(|a| target.contains(a))
            .unwrap_or(target[0]);
        let focus = selection
            .focus()
            .as_member()
            .filter(|f| target.contains(f))
            .map(|f| Focus::on(&f))
            .unwrap_or_default();
        changed(selection, Selection::new(focus, Some(anchor), target))
    }
}

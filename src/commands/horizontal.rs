//! Extending and contracting the selection along the time axis.
//!
//! Each staff holding selected units is handled on its own: the range on
//! one staff never swallows or drops another staff's members. Whole events
//! are added and removed together, so horizontal moves never leave a chord
//! half-selected.

use super::{changed, HorizontalDirection, SelectionCommand};
use crate::score::{Event, Quants, Score};
use crate::selection::{live_members, members_of, Focus, MemberSet, SelectedNote, Selection};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::trace;

/// Shift+Left/Right, or shift-click when `target` is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtendSelectionHorizontallyCommand {
    pub direction: HorizontalDirection,
    /// Explicit unit to extend or contract to. Only its staff is affected.
    pub target: Option<SelectedNote>,
}

/// New membership of one staff.
struct StaffExtension {
    members: Vec<SelectedNote>,
    focus: Option<Focus>,
    changed: bool,
}

impl ExtendSelectionHorizontallyCommand {
    pub fn new(direction: HorizontalDirection) -> Self {
        Self {
            direction,
            target: None,
        }
    }

    pub fn to_target(direction: HorizontalDirection, target: SelectedNote) -> Self {
        Self {
            direction,
            target: Some(target),
        }
    }

    fn extend_staff(
        &self,
        score: &Score,
        staff_index: usize,
        members: &[SelectedNote],
        anchor: &SelectedNote,
        anchor_time: (usize, Quants),
        focus: Option<SelectedNote>,
    ) -> Option<StaffExtension> {
        let order = score.staff(staff_index)?.events_in_order();
        let position_of = |n: &SelectedNote| {
            order
                .iter()
                .position(|(m, e)| *m == n.measure_index && e.id == n.event_id)
        };

        let staff_members: Vec<(usize, SelectedNote)> = members
            .iter()
            .filter(|n| n.staff_index == staff_index)
            .filter_map(|n| position_of(n).map(|p| (p, *n)))
            .collect();
        let lo = staff_members.iter().map(|(p, _)| *p).min()?;
        let hi = staff_members.iter().map(|(p, _)| *p).max()?;

        let anchor_pos = if anchor.staff_index == staff_index {
            position_of(anchor)?
        } else {
            nearest_in_time(score, &staff_members, anchor_time)?
        };

        let cursor = focus
            .filter(|f| f.staff_index == staff_index)
            .and_then(|f| position_of(&f))
            .filter(|p| *p != anchor_pos && (*p == lo || *p == hi))
            .unwrap_or(if hi > anchor_pos {
                hi
            } else if lo < anchor_pos {
                lo
            } else {
                anchor_pos
            });

        let next = match (self.target, self.direction) {
            (Some(target), _) => position_of(&target)?,
            (None, HorizontalDirection::Right) => Some(cursor + 1).filter(|p| *p < order.len())?,
            (None, HorizontalDirection::Left) => cursor.checked_sub(1)?,
        };

        let expanding = next != anchor_pos
            && (cursor == anchor_pos
                || (next > anchor_pos) != (cursor > anchor_pos)
                || next.abs_diff(anchor_pos) > cursor.abs_diff(anchor_pos));
        let (from, to) = (anchor_pos.min(next), anchor_pos.max(next));

        let mut kept: MemberSet = staff_members
            .iter()
            .filter(|(p, _)| (from..=to).contains(p))
            .map(|(_, n)| *n)
            .collect();
        if expanding {
            // Pulls in the whole anchor chord as well as every event passed.
            for (measure_index, event) in &order[from..=to] {
                kept.extend(members_of(staff_index, *measure_index, event));
            }
        }

        let before: HashSet<SelectedNote> = staff_members.iter().map(|(_, n)| *n).collect();
        let changed = kept.len() != before.len() || kept.iter().any(|n| !before.contains(n));

        let (measure_index, event) = order[next];
        let focus = representative(staff_index, measure_index, event, &kept);

        Some(StaffExtension {
            members: kept.into_vec(),
            focus,
            changed,
        })
    }
}

impl SelectionCommand for ExtendSelectionHorizontallyCommand {
    fn name(&self) -> &'static str {
        match self.direction {
            HorizontalDirection::Left => "extend selection left",
            HorizontalDirection::Right => "extend selection right",
        }
    }

    fn execute(&self, selection: &Selection, score: &Score) -> Option<Selection> {
        let members = live_members(selection, score);
        if members.is_empty() {
            trace!("horizontal extend: nothing selected");
            return None;
        }

        let anchor = selection
            .anchor()
            .filter(|a| score.is_resolvable(a))
            .or_else(|| selection.focus().as_member().filter(|f| members.contains(f)))
            .unwrap_or(members[0]);
        let anchor_start = score.resolve(&anchor)?.start;
        let anchor_time = (anchor.measure_index, anchor_start);

        let touched: BTreeSet<usize> = members.iter().map(|n| n.staff_index).collect();
        let staves: Vec<usize> = match self.target {
            Some(target) if !score.is_resolvable(&target) => {
                trace!(note = ?target, "horizontal extend: target does not resolve");
                return None;
            }
            Some(target) if !touched.contains(&target.staff_index) => {
                trace!(
                    staff = target.staff_index,
                    "horizontal extend: target staff has no selection"
                );
                return None;
            }
            Some(target) => vec![target.staff_index],
            None => touched.iter().copied().collect(),
        };

        let focus_member = selection.focus().as_member();
        let outcomes: BTreeMap<usize, StaffExtension> = staves
            .into_iter()
            .filter_map(|s| {
                self.extend_staff(score, s, &members, &anchor, anchor_time, focus_member)
                    .map(|o| (s, o))
            })
            .collect();

        let changed_staves: Vec<usize> = outcomes
            .iter()
            .filter(|(_, o)| o.changed)
            .map(|(s, _)| *s)
            .collect();
        if changed_staves.is_empty() {
            trace!(direction = ?self.direction, "horizontal extend: no staff can move");
            return None;
        }

        let mut result = MemberSet::new();
        for staff_index in &touched {
            match outcomes.get(staff_index) {
                Some(outcome) => result.extend(outcome.members.iter().copied()),
                None => result.extend(
                    members
                        .iter()
                        .filter(|n| n.staff_index == *staff_index)
                        .copied(),
                ),
            }
        }

        let focus_staff = if changed_staves.contains(&anchor.staff_index) {
            anchor.staff_index
        } else {
            changed_staves[0]
        };
        let focus = outcomes
            .get(&focus_staff)
            .and_then(|o| o.focus)
            .unwrap_or_default();

        changed(selection, Selection::new(focus, Some(anchor), result.into_vec()))
    }
}

/// The selected unit on a staff closest in time to the anchor.
fn nearest_in_time(
    score: &Score,
    staff_members: &[(usize, SelectedNote)],
    anchor_time: (usize, Quants),
) -> Option<usize> {
    let (anchor_measure, anchor_start) = anchor_time;
    staff_members
        .iter()
        .filter_map(|(p, n)| {
            let start = score.resolve(n)?.start;
            Some((
                *p,
                n.measure_index.abs_diff(anchor_measure),
                (start - anchor_start).abs(),
            ))
        })
        .min_by(|a, b| a.1.cmp(&b.1).then(a.2.total_cmp(&b.2)).then(a.0.cmp(&b.0)))
        .map(|(p, _, _)| p)
}

/// Lowest selected unit of an event, used as the focus after a move.
fn representative(
    staff_index: usize,
    measure_index: usize,
    event: &Event,
    selected: &MemberSet,
) -> Option<Focus> {
    members_of(staff_index, measure_index, event)
        .into_iter()
        .find(|n| selected.contains(n))
        .map(|n| Focus::on(&n))
}

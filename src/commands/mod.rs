//! Selection commands.
//!
//! Every command is a pure function from the current selection and a score
//! snapshot to a new selection. `None` means "nothing changed": the store
//! records no history for it.
//!
//! Two vertical families exist on purpose and must not be merged:
//!
//! - [`ExpandSelectionVerticallyCommand`] only ever adds, and cycles around
//!   chord boundaries before escalating to neighbouring staves.
//! - [`ExtendSelectionVerticallyCommand`] moves a cursor relative to the
//!   anchor, so it can shrink the selection, and never cycles.

mod expand;
mod extend;
mod full_events;
mod horizontal;
mod select;
mod select_all;

pub use expand::ExpandSelectionVerticallyCommand;
pub use extend::ExtendSelectionVerticallyCommand;
pub use full_events::SelectFullEventsCommand;
pub use horizontal::ExtendSelectionHorizontallyCommand;
pub use select::{ClearSelectionCommand, SelectEventCommand, SelectNoteCommand};
pub use select_all::{SelectAllCommand, SelectScope};

use crate::score::Score;
use crate::selection::Selection;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A discrete selection change dispatched through the store.
pub trait SelectionCommand: fmt::Debug {
    /// Short label used for history entries and logs.
    fn name(&self) -> &'static str;

    /// Computes the next selection, or None if the command does not apply.
    ///
    /// Implementations must not keep references into `score` past the call.
    fn execute(&self, selection: &Selection, score: &Score) -> Option<Selection>;
}

/// Direction along the time axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HorizontalDirection {
    Left,
    Right,
}

/// Direction along the pitch/staff axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalDirection {
    Up,
    Down,
    All,
}

/// Wraps a computed selection, collapsing "same as before" into None.
fn changed(previous: &Selection, next: Selection) -> Option<Selection> {
    if next == *previous {
        None
    } else {
        Some(next)
    }
}

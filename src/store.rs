//! The selection store: current selection plus its undo/redo history.
//!
//! All selection changes go through [`SelectionStore::dispatch`], which runs
//! one command to completion, including its history write, before returning.

use crate::commands::SelectionCommand;
use crate::history::{HistoryManager, SelectionSnapshot, MAX_HISTORY_SIZE};
use crate::score::Score;
use crate::selection::Selection;
use tracing::debug;

/// Tunables for a [`SelectionStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreConfig {
    /// Maximum number of undo (and redo) entries kept.
    pub history_limit: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            history_limit: MAX_HISTORY_SIZE,
        }
    }
}

/// Holds the current selection and serializes command dispatch.
#[derive(Debug, Default)]
pub struct SelectionStore {
    selection: Selection,
    history: HistoryManager,
}

impl SelectionStore {
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            selection: Selection::empty(),
            history: HistoryManager::with_limit(config.history_limit),
        }
    }

    /// The current selection. Callers must treat it as read-only.
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Runs `command` against the current selection and `score`.
    ///
    /// Returns true if the selection changed. A no-op leaves both the
    /// selection and the history untouched.
    pub fn dispatch(&mut self, command: &dyn SelectionCommand, score: &Score) -> bool {
        let Some(next) = command.execute(&self.selection, score) else {
            debug!(command = command.name(), "no-op, nothing recorded");
            return false;
        };
        if next == self.selection {
            debug!(command = command.name(), "result equals current selection");
            return false;
        }

        let delta = self.selection.diff(&next);
        debug!(
            command = command.name(),
            added = delta.added.len(),
            removed = delta.removed.len(),
            size = next.len(),
            "selection changed"
        );
        self.history
            .push_undo(SelectionSnapshot::new(&self.selection, command.name(), delta));
        self.selection = next;
        true
    }

    /// Restores the previous selection, dropping members `score` no longer
    /// contains. Returns false if there is nothing to undo.
    pub fn undo(&mut self, score: &Score) -> bool {
        let Some(previous) = self.history.pop_undo() else {
            debug!("nothing to undo");
            return false;
        };
        let restored = previous.valid_selection(score);
        let delta = self.selection.diff(&restored);
        debug!(command = %previous.description, size = restored.len(), "undo");

        self.history.push_redo(SelectionSnapshot::new(
            &self.selection,
            previous.description,
            delta,
        ));
        self.selection = restored;
        true
    }

    /// Re-applies the most recently undone selection.
    /// Returns false if there is nothing to redo.
    pub fn redo(&mut self, score: &Score) -> bool {
        let Some(next) = self.history.pop_redo() else {
            debug!("nothing to redo");
            return false;
        };
        let restored = next.valid_selection(score);
        let delta = self.selection.diff(&restored);
        debug!(command = %next.description, size = restored.len(), "redo");

        self.history.push_undo_preserve_redo(SelectionSnapshot::new(
            &self.selection,
            next.description,
            delta,
        ));
        self.selection = restored;
        true
    }

    /// Document-replacement hook: empties the selection and forgets history,
    /// since none of the old ids resolve against a new document.
    pub fn reset(&mut self) {
        debug!("selection reset");
        self.selection = Selection::empty();
        self.history.clear();
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }
}

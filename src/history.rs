use crate::score::Score;
use crate::selection::{Selection, SelectionDelta};

/// Default number of undo/redo states to keep.
pub const MAX_HISTORY_SIZE: usize = 32;

/// A selection at a point in time, with the command that moved away from it.
///
/// Selection history is kept apart from document history: snapshots hold
/// ids only, so they are re-resolved against the current score on restore.
#[derive(Debug, Clone)]
pub struct SelectionSnapshot {
    /// The selection before (for undo) or after (for redo) the command.
    pub selection: Selection,

    /// Name of the command that produced the transition.
    /// Used for status messages when undoing/redoing.
    pub description: String,

    /// Members the command added and removed.
    pub delta: SelectionDelta,
}

impl SelectionSnapshot {
    /// Creates a new snapshot of `selection`.
    ///
    /// # Arguments
    ///
    /// * `selection` - The selection to restore later
    /// * `description` - The command name
    /// * `delta` - What the command changed
    pub fn new(
        selection: &Selection,
        description: impl Into<String>,
        delta: SelectionDelta,
    ) -> Self {
        Self {
            selection: selection.clone(),
            description: description.into(),
            delta,
        }
    }

    /// Returns the stored selection filtered to units that still exist in
    /// `score`.
    ///
    /// This handles cases where notes were deleted by a document edit after
    /// the snapshot was taken.
    pub fn valid_selection(&self, score: &Score) -> Selection {
        self.selection.retain_resolvable(score)
    }
}

/// Manages undo/redo history using a snapshot-based approach.
///
/// The manager maintains two stacks:
/// - `undo_stack`: Past states that can be reverted to
/// - `redo_stack`: Future states that can be restored after undoing
///
/// When a new command changes the selection, the previous state is pushed
/// to the undo stack and the redo stack is cleared (branching creates a new
/// timeline).
#[derive(Debug)]
pub struct HistoryManager {
    /// Stack of states to undo to (most recent last).
    undo_stack: Vec<SelectionSnapshot>,

    /// Stack of states to redo to (most recent last).
    redo_stack: Vec<SelectionSnapshot>,

    /// Maximum entries per stack.
    limit: usize,
}

impl HistoryManager {
    /// Creates a new empty history manager with the default limit.
    pub fn new() -> Self {
        Self::with_limit(MAX_HISTORY_SIZE)
    }

    /// Creates a history manager that keeps at most `limit` states per stack.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            undo_stack: Vec::with_capacity(limit),
            redo_stack: Vec::with_capacity(limit),
            limit,
        }
    }

    /// Records a snapshot before a change.
    ///
    /// The redo stack is cleared since we're starting a new branch of history.
    pub fn push_undo(&mut self, snapshot: SelectionSnapshot) {
        self.redo_stack.clear();
        self.push_undo_preserve_redo(snapshot);
    }

    /// Pushes a state to the undo stack WITHOUT clearing the redo stack.
    ///
    /// Used during redo: the current state goes to undo, but the remaining
    /// redo states must survive.
    pub fn push_undo_preserve_redo(&mut self, snapshot: SelectionSnapshot) {
        self.undo_stack.push(snapshot);
        trim_oldest(&mut self.undo_stack, self.limit);
    }

    /// Pops the most recent undo state.
    ///
    /// The caller should push the CURRENT state to redo before applying
    /// the returned snapshot.
    pub fn pop_undo(&mut self) -> Option<SelectionSnapshot> {
        self.undo_stack.pop()
    }

    /// Pushes a state to the redo stack.
    pub fn push_redo(&mut self, snapshot: SelectionSnapshot) {
        self.redo_stack.push(snapshot);
        trim_oldest(&mut self.redo_stack, self.limit);
    }

    /// Pops the most recent redo state.
    ///
    /// The caller should push the CURRENT state to undo before applying
    /// the returned snapshot.
    pub fn pop_redo(&mut self) -> Option<SelectionSnapshot> {
        self.redo_stack.pop()
    }

    /// Clears all history.
    ///
    /// Called when the document is replaced: old snapshots reference ids the
    /// new document cannot resolve.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    /// Returns true if there are states available to undo to.
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Returns true if there are states available to redo to.
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Returns the number of undo states available.
    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    /// Returns the number of redo states available.
    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    /// The most recent undo entry, if any.
    pub fn last_undo(&self) -> Option<&SelectionSnapshot> {
        self.undo_stack.last()
    }
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Enforces maximum history size by removing oldest entries.
fn trim_oldest(stack: &mut Vec<SelectionSnapshot>, limit: usize) {
    if stack.len() > limit {
        let excess = stack.len() - limit;
        stack.drain(..excess);
    }
}

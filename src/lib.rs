//! scorenav - selection and navigation for a music score editor.
//!
//! A score is staves of measures of events (single notes, chords or rests).
//! Selection commands are pure functions from the current [`Selection`] and
//! a read-only [`Score`] to a new selection; the [`SelectionStore`] runs
//! them and keeps an undo/redo history of the results.

pub mod commands;
pub mod error;
pub mod history;
pub mod score;
pub mod script;
pub mod selection;
pub mod store;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use commands::{HorizontalDirection, SelectionCommand, VerticalDirection};
pub use error::{LoadError, ScoreError};
pub use score::{Clef, Event, Measure, Note, NoteValue, Score, Staff, TimeSignature, Tuplet};
pub use selection::{Focus, SelectedNote, Selection, SelectionDelta};
pub use store::{SelectionStore, StoreConfig};

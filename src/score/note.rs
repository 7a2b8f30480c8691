//! Pitched note representation.
//!
//! A note is one pitch sounding inside an event. Chords are events holding
//! more than one note; rests hold none and are addressed through the event.

use super::MAX_PITCH;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Global counter for generating unique note IDs.
static NOTE_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Opaque identifier for a note.
///
/// Generated ids are unique for the whole process, which is stricter than
/// the per-event uniqueness selection relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NoteId(u64);

impl NoteId {
    /// Generates a new unique note ID.
    pub fn new() -> Self {
        Self(NOTE_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw ID value (for serialization/debugging).
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Default for NoteId {
    fn default() -> Self {
        Self::new()
    }
}

/// A single pitch inside an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Unique identifier for this note instance.
    pub id: NoteId,

    /// MIDI note number (0-127). 60 = Middle C (C4).
    pub pitch: u8,
}

impl Note {
    /// Creates a new note with a fresh id, clamping the pitch to 0-127.
    pub fn new(pitch: u8) -> Self {
        Self {
            id: NoteId::new(),
            pitch: pitch.min(MAX_PITCH),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_creation() {
        let note = Note::new(60);
        assert_eq!(note.pitch, 60);
    }

    #[test]
    fn test_note_clamping() {
        let note = Note::new(200);
        assert_eq!(note.pitch, 127);
    }

    #[test]
    fn test_ids_are_unique() {
        let a = Note::new(60);
        let b = Note::new(60);
        assert_ne!(a.id, b.id);
        assert!(b.id.as_u64() > a.id.as_u64());
    }
}

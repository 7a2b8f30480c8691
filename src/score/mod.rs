//! Score data structures: staves, measures, events and notes.
//!
//! This module provides the read-only document tree that selection commands
//! are evaluated against, plus the quant clock used to line up events on
//! different staves in time.

mod document;
mod event;
mod measure;
mod note;
pub mod quant;
mod staff;

pub use document::Score;
pub use event::{Event, EventId, NoteValue, Tuplet};
pub use measure::{Measure, TimeSignature};
pub use note::{Note, NoteId};
pub use quant::{duration_to_quants, event_start_quant, Quants, QUANT_EPSILON};
pub use staff::{Clef, Staff};

/// Standard note names for display purposes.
/// Maps MIDI note number (0-127) to note name within an octave.
pub const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Highest legal MIDI pitch.
pub const MAX_PITCH: u8 = 127;

/// Converts a MIDI note number to a human-readable note name with octave.
///
/// # Examples
///
/// ```
/// use scorenav::score::note_to_name;
///
/// assert_eq!(note_to_name(60), "C4");
/// ```
pub fn note_to_name(note: u8) -> String {
    let octave = (note / 12) as i8 - 1; // MIDI octave convention
    let note_index = (note % 12) as usize;
    format!("{}{}", NOTE_NAMES[note_index], octave)
}

/// Converts a note name like "C4" or "F#5" to a MIDI note number.
///
/// Returns None if the name is malformed or falls outside 0-127.
pub fn name_to_note(name: &str) -> Option<u8> {
    let name = name.trim();
    if name.is_empty() {
        return None;
    }

    let octave_start = name.chars().position(|c| c.is_ascii_digit() || c == '-')?;

    let note_part = &name[..octave_start];
    let octave_part = &name[octave_start..];

    let note_index = NOTE_NAMES.iter().position(|&n| n == note_part)?;
    let octave: i16 = octave_part.parse().ok()?;

    let midi_note = (octave + 1) * 12 + note_index as i16;
    if (0..=MAX_PITCH as i16).contains(&midi_note) {
        Some(midi_note as u8)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_to_name() {
        assert_eq!(note_to_name(60), "C4");
        assert_eq!(note_to_name(69), "A4");
        assert_eq!(note_to_name(0), "C-1");
        assert_eq!(note_to_name(127), "G9");
    }

    #[test]
    fn test_name_to_note() {
        assert_eq!(name_to_note("C4"), Some(60));
        assert_eq!(name_to_note("A4"), Some(69));
        assert_eq!(name_to_note("C-1"), Some(0));
        assert_eq!(name_to_note("G9"), Some(127));
        assert_eq!(name_to_note("G#9"), None);
        assert_eq!(name_to_note("H2"), None);
        assert_eq!(name_to_note(""), None);
    }
}

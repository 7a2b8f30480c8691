//! Rhythmic events: single notes, chords and rests.
//!
//! An event is one time slot inside a measure. Its duration is symbolic
//! (note value, dot, tuplet) and converted to quants by the quant clock.

use super::note::{Note, NoteId};
use super::quant::{duration_to_quants, Quants};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Global counter for generating unique event IDs.
static EVENT_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Opaque identifier for an event within its measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventId(u64);

impl EventId {
    /// Generates a new unique event ID.
    pub fn new() -> Self {
        Self(EVENT_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw ID value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

/// Symbolic note value, from whole note down to sixty-fourth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteValue {
    Whole,
    Half,
    Quarter,
    Eighth,
    Sixteenth,
    ThirtySecond,
    SixtyFourth,
}

impl NoteValue {
    /// Base length in quants. A sixty-fourth note is the smallest tick.
    pub fn base_quants(self) -> u32 {
        match self {
            NoteValue::Whole => 64,
            NoteValue::Half => 32,
            NoteValue::Quarter => 16,
            NoteValue::Eighth => 8,
            NoteValue::Sixteenth => 4,
            NoteValue::ThirtySecond => 2,
            NoteValue::SixtyFourth => 1,
        }
    }
}

/// Tuplet membership: `actual` notes played in the time of `normal`.
///
/// A triplet is `actual = 3, normal = 2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tuplet {
    pub actual: u32,
    pub normal: u32,
    /// Number of events in the tuplet group.
    pub group_size: u32,
    /// Zero-based index of this event within its group.
    pub position: u32,
}

impl Tuplet {
    /// A standard 3:2 triplet member at `position`.
    pub fn triplet(position: u32) -> Self {
        Self {
            actual: 3,
            normal: 2,
            group_size: 3,
            position,
        }
    }

    /// Returns true if the ratio can scale a duration.
    pub fn is_valid(&self) -> bool {
        self.actual > 0 && self.normal > 0
    }
}

/// One time slot in a measure: a note, a chord or a rest.
///
/// Notes are kept sorted from lowest to highest pitch. A rest holds no notes
/// and is addressed by selection as its single placeholder (`note_id = None`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Unique identifier for this event.
    pub id: EventId,

    /// Symbolic duration before dots and tuplets.
    pub value: NoteValue,

    #[serde(default)]
    pub dotted: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tuplet: Option<Tuplet>,

    #[serde(default)]
    pub is_rest: bool,

    #[serde(default)]
    notes: Vec<Note>,
}

impl Event {
    /// Creates a single-note event.
    pub fn note(value: NoteValue, pitch: u8) -> Self {
        Self::chord(value, &[pitch])
    }

    /// Creates a chord from the given pitches (any order).
    pub fn chord(value: NoteValue, pitches: &[u8]) -> Self {
        let mut notes: Vec<Note> = pitches.iter().map(|&p| Note::new(p)).collect();
        notes.sort_by_key(|n| n.pitch);
        Self {
            id: EventId::new(),
            value,
            dotted: false,
            tuplet: None,
            is_rest: false,
            notes,
        }
    }

    /// Creates a rest.
    pub fn rest(value: NoteValue) -> Self {
        Self {
            id: EventId::new(),
            value,
            dotted: false,
            tuplet: None,
            is_rest: true,
            notes: Vec::new(),
        }
    }

    /// Marks the event as dotted.
    pub fn dotted(mut self) -> Self {
        self.dotted = true;
        self
    }

    /// Places the event in a tuplet group.
    pub fn with_tuplet(mut self, tuplet: Tuplet) -> Self {
        self.tuplet = Some(tuplet);
        self
    }

    /// Duration of this event in quants.
    pub fn duration_quants(&self) -> Quants {
        duration_to_quants(self.value, self.dotted, self.tuplet.as_ref())
    }

    /// Notes in stored order (lowest pitch first for events built here).
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// Notes sorted from lowest to highest pitch.
    ///
    /// Deserialized events are not guaranteed to be stored sorted, so
    /// commands that walk pitch order go through this.
    pub fn notes_by_pitch(&self) -> Vec<&Note> {
        let mut notes: Vec<&Note> = self.notes.iter().collect();
        notes.sort_by_key(|n| (n.pitch, n.id));
        notes
    }

    /// Returns a note by its ID.
    pub fn get_note(&self, id: NoteId) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == id)
    }

    /// True if this event holds more than one note.
    pub fn is_chord(&self) -> bool {
        self.notes.len() > 1
    }

    /// Every selectable unit of this event, lowest pitch first.
    ///
    /// A rest (or a note event that lost all its notes) yields the single
    /// placeholder `None`.
    pub fn selectable_ids(&self) -> Vec<Option<NoteId>> {
        if self.is_rest || self.notes.is_empty() {
            vec![None]
        } else {
            self.notes_by_pitch().into_iter().map(|n| Some(n.id)).collect()
        }
    }

    /// True if `note_id` addresses a selectable unit of this event.
    pub fn has_selectable(&self, note_id: Option<NoteId>) -> bool {
        match note_id {
            None => self.is_rest || self.notes.is_empty(),
            Some(id) => !self.is_rest && self.get_note(id).is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chord_is_sorted_by_pitch() {
        let event = Event::chord(NoteValue::Quarter, &[67, 60, 64]);
        let pitches: Vec<u8> = event.notes().iter().map(|n| n.pitch).collect();
        assert_eq!(pitches, vec![60, 64, 67]);
        assert!(event.is_chord());
    }

    #[test]
    fn test_rest_placeholder() {
        let rest = Event::rest(NoteValue::Half);
        assert_eq!(rest.selectable_ids(), vec![None]);
        assert!(rest.has_selectable(None));
        assert!(!rest.has_selectable(Some(NoteId::new())));
    }

    #[test]
    fn test_note_event_rejects_placeholder() {
        let event = Event::note(NoteValue::Quarter, 60);
        let id = event.notes()[0].id;
        assert!(event.has_selectable(Some(id)));
        assert!(!event.has_selectable(None));
    }

    #[test]
    fn test_duration_modifiers() {
        assert_eq!(Event::note(NoteValue::Quarter, 60).duration_quants(), 16.0);
        assert_eq!(Event::rest(NoteValue::Quarter).dotted().duration_quants(), 24.0);
        let triplet = Event::note(NoteValue::Eighth, 60).with_tuplet(Tuplet::triplet(0));
        assert!((triplet.duration_quants() - 16.0 / 3.0).abs() < 1e-9);
    }
}

//! Fixture scores shared by unit tests.

use crate::score::{Clef, Event, Measure, NoteValue, Score, Staff};
use crate::selection::{SelectedNote, Selection};

/// Builds a score from `(clef, measures)` pairs, each measure a list of
/// events in 4/4.
pub fn score_of(staves: Vec<(Clef, Vec<Vec<Event>>)>) -> Score {
    let mut score = Score::new("Fixture");
    for (clef, measures) in staves {
        let mut staff = Staff::new(clef);
        for events in measures {
            let mut measure = Measure::default();
            for event in events {
                measure.add_event(event).unwrap();
            }
            staff.add_measure(measure);
        }
        score.add_staff(staff).unwrap();
    }
    score
}

/// Four quarter notes C4 D4 E4 F4 on one staff.
pub fn four_quarters() -> Score {
    score_of(vec![(
        Clef::Treble,
        vec![vec![
            Event::note(NoteValue::Quarter, 60),
            Event::note(NoteValue::Quarter, 62),
            Event::note(NoteValue::Quarter, 64),
            Event::note(NoteValue::Quarter, 65),
        ]],
    )])
}

/// Grand staff, two measures each of four quarter-note chords.
///
/// Treble: triads on C5 (72, 76, 79). Bass: dyads (48, 55).
pub fn grand_staff() -> Score {
    let treble = (0..2)
        .map(|_| {
            (0..4)
                .map(|_| Event::chord(NoteValue::Quarter, &[72, 76, 79]))
                .collect()
        })
        .collect();
    let bass = (0..2)
        .map(|_| {
            (0..4)
                .map(|_| Event::chord(NoteValue::Quarter, &[48, 55]))
                .collect()
        })
        .collect();
    score_of(vec![(Clef::Treble, treble), (Clef::Bass, bass)])
}

/// Unit at a position; panics if the position does not exist.
pub fn at(score: &Score, staff: usize, measure: usize, event: usize, note: usize) -> SelectedNote {
    score
        .member_at(staff, measure, event, note)
        .unwrap_or_else(|| panic!("no unit at {}/{}/{}/{}", staff, measure, event, note))
}

/// Every unit of the event at a position.
pub fn whole_event(score: &Score, staff: usize, measure: usize, event: usize) -> Vec<SelectedNote> {
    score.event_members_at(staff, measure, event).unwrap()
}

/// Selected `(staff, measure, event_index)` positions, sorted and deduped.
pub fn event_positions(score: &Score, selection: &Selection) -> Vec<(usize, usize, usize)> {
    let mut positions: Vec<_> = selection
        .notes()
        .iter()
        .map(|n| {
            let resolved = score.resolve(n).unwrap();
            (n.staff_index, n.measure_index, resolved.event_index)
        })
        .collect();
    positions.sort();
    positions.dedup();
    positions
}

/// Selected `(staff, pitch)` pairs, sorted.
pub fn pitches(score: &Score, selection: &Selection) -> Vec<(usize, u8)> {
    let mut out: Vec<_> = selection
        .notes()
        .iter()
        .map(|n| (n.staff_index, score.resolve(n).unwrap().pitch))
        .collect();
    out.sort();
    out
}

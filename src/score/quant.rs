//! Quant clock: symbolic durations to a common time unit.
//!
//! One quant is a sixty-fourth note. Tuplets make durations fractional, so
//! quants are carried as `f64` and compared with [`QUANT_EPSILON`].

use super::event::{EventId, NoteValue, Tuplet};
use super::measure::Measure;

/// Musical time measured in sixty-fourth notes.
pub type Quants = f64;

/// Tolerance for comparing fractional (tuplet) quant positions.
pub const QUANT_EPSILON: f64 = 1e-6;

/// Quants in a whole note.
pub const QUANTS_PER_WHOLE: u32 = 64;

/// Converts a symbolic duration into quants.
///
/// Dotted values last 1.5x the base; a tuplet scales the (dotted) length
/// by `normal / actual`. An invalid tuplet ratio is ignored.
pub fn duration_to_quants(value: NoteValue, dotted: bool, tuplet: Option<&Tuplet>) -> Quants {
    let mut quants = value.base_quants() as f64;
    if dotted {
        quants *= 1.5;
    }
    if let Some(t) = tuplet.filter(|t| t.is_valid()) {
        quants = quants * t.normal as f64 / t.actual as f64;
    }
    quants
}

/// Start position of an event within its measure.
///
/// Sums the durations of all preceding events. Returns 0 when the event is
/// first or cannot be found.
pub fn event_start_quant(measure: &Measure, event_id: EventId) -> Quants {
    let mut start = 0.0;
    for event in measure.events() {
        if event.id == event_id {
            return start;
        }
        start += event.duration_quants();
    }
    0.0
}

/// Half-open interval overlap with epsilon tolerance at the edges.
pub fn spans_overlap(a_start: Quants, a_end: Quants, b_start: Quants, b_end: Quants) -> bool {
    a_start < b_end - QUANT_EPSILON && b_start < a_end - QUANT_EPSILON
}

/// Integer key for grouping simultaneous positions despite float noise.
pub fn quant_key(quants: Quants) -> i64 {
    (quants / QUANT_EPSILON).round() as i64
}

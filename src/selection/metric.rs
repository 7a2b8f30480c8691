//! Vertical metric: a single orderable position across staves and pitch.
//!
//! Higher metric means visually higher on the page. A lower staff index
//! always outranks any pitch on a staff below it; within one staff the
//! metric rises with pitch.

use super::ResolvedNote;
use crate::score::MAX_PITCH;

/// Position on the vertical axis.
pub type Metric = i64;

/// Upper bound on staff count. Staff indices must stay below this.
pub const STAFF_LIMIT: usize = 1000;

/// Weight of one staff step. Must exceed the whole MIDI pitch range.
pub const PITCH_SCALE: Metric = 1000;

const _: () = assert!(PITCH_SCALE > MAX_PITCH as Metric);

/// `(STAFF_LIMIT - staff_index) * PITCH_SCALE + pitch`.
pub fn vertical_metric(staff_index: usize, pitch: u8) -> Metric {
    (STAFF_LIMIT as Metric - staff_index as Metric) * PITCH_SCALE + pitch as Metric
}

/// Metric of a resolved unit (rests sit at their clef's default pitch).
pub fn metric_of(note: &ResolvedNote<'_>) -> Metric {
    vertical_metric(note.member.staff_index, note.pitch)
}

/// Inclusive containment in the range spanned by `a` and `b`.
pub fn within(value: Metric, a: Metric, b: Metric) -> bool {
    a.min(b) <= value && value <= a.max(b)
}

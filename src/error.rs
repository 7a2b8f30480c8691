//! Error types for building and loading scores.
//!
//! Selection commands themselves never fail: a command that cannot act
//! returns no new selection. Errors only arise while constructing or
//! loading the document they run against.

use crate::score::Quants;
use thiserror::Error;

/// Structural violations when building a score.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoreError {
    /// Event longer than the space left in its measure
    #[error("measure overflow: event needs {needed} quants but only {remaining} remain")]
    MeasureOverflow { needed: Quants, remaining: Quants },

    /// Zero beats, or a beat unit that is not a power of two up to 64
    #[error("invalid time signature {numerator}/{denominator}")]
    InvalidTimeSignature { numerator: u8, denominator: u8 },

    /// Tuplet ratio with a zero term
    #[error("invalid tuplet ratio {actual}:{normal}")]
    InvalidTuplet { actual: u32, normal: u32 },

    /// More staves than the vertical metric can order
    #[error("score already has the maximum of {max} staves")]
    TooManyStaves { max: usize },

    /// Pitch outside 0-127
    #[error("pitch {0} is outside the MIDI range 0-127")]
    PitchOutOfRange(u8),

    /// Two events of one measure share an id
    #[error("event id {id} appears twice in one measure")]
    DuplicateEventId { id: u64 },

    /// Two notes of one event share an id
    #[error("note id {id} appears twice in one event")]
    DuplicateNoteId { id: u64 },
}

/// Failures while reading a score from disk or JSON.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid score: {0}")]
    Invalid(#[from] ScoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = ScoreError::InvalidTimeSignature {
            numerator: 4,
            denominator: 3,
        };
        assert_eq!(err.to_string(), "invalid time signature 4/3");

        let err = LoadError::from(ScoreError::PitchOutOfRange(200));
        assert_eq!(
            err.to_string(),
            "invalid score: pitch 200 is outside the MIDI range 0-127"
        );
    }
}

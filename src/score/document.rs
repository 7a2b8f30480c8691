//! Score container.
//!
//! A score is the root of the document tree: an ordered list of staves.
//! Selection commands receive it read-only and re-resolve every id against
//! it on each call.

use super::event::{Event, EventId};
use super::measure::Measure;
use super::quant::QUANT_EPSILON;
use super::staff::Staff;
use super::MAX_PITCH;
use crate::error::{LoadError, ScoreError};
use crate::selection::metric::STAFF_LIMIT;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// A complete score with one or more staves.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Score {
    /// Score title.
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    staves: Vec<Staff>,
}

impl Score {
    /// Creates an empty score.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            staves: Vec::new(),
        }
    }

    /// Appends a staff and returns its index.
    ///
    /// # Errors
    ///
    /// Returns `TooManyStaves` once the vertical metric's staff term would
    /// overflow.
    pub fn add_staff(&mut self, staff: Staff) -> Result<usize, ScoreError> {
        if self.staves.len() >= STAFF_LIMIT {
            return Err(ScoreError::TooManyStaves { max: STAFF_LIMIT });
        }
        self.staves.push(staff);
        Ok(self.staves.len() - 1)
    }

    /// Returns a staff by index.
    pub fn staff(&self, index: usize) -> Option<&Staff> {
        self.staves.get(index)
    }

    /// Returns a mutable staff by index.
    pub fn staff_mut(&mut self, index: usize) -> Option<&mut Staff> {
        self.staves.get_mut(index)
    }

    /// Returns all staves.
    pub fn staves(&self) -> &[Staff] {
        &self.staves
    }

    pub fn staff_count(&self) -> usize {
        self.staves.len()
    }

    /// Returns a measure by staff and measure index.
    pub fn measure(&self, staff: usize, measure: usize) -> Option<&Measure> {
        self.staff(staff)?.measure(measure)
    }

    /// Returns an event by position and id.
    pub fn event(&self, staff: usize, measure: usize, event_id: EventId) -> Option<&Event> {
        self.measure(staff, measure)?.event(event_id)
    }

    /// Total number of events across all staves.
    pub fn event_count(&self) -> usize {
        self.staves
            .iter()
            .flat_map(|s| s.measures())
            .map(Measure::event_count)
            .sum()
    }

    /// Checks the structural invariants the editor relies on.
    ///
    /// Scores built through the API always pass; this guards scores that
    /// arrive through deserialization.
    pub fn validate(&self) -> Result<(), ScoreError> {
        if self.staves.len() > STAFF_LIMIT {
            return Err(ScoreError::TooManyStaves { max: STAFF_LIMIT });
        }
        for measure in self.staves.iter().flat_map(|s| s.measures()) {
            let sig = measure.time_signature;
            if !sig.is_valid() {
                return Err(ScoreError::InvalidTimeSignature {
                    numerator: sig.numerator,
                    denominator: sig.denominator,
                });
            }
            let mut event_ids = HashSet::new();
            for event in measure.events() {
                if !event_ids.insert(event.id) {
                    return Err(ScoreError::DuplicateEventId {
                        id: event.id.as_u64(),
                    });
                }
                let mut note_ids = HashSet::new();
                if let Some(note) = event.notes().iter().find(|n| !note_ids.insert(n.id)) {
                    return Err(ScoreError::DuplicateNoteId {
                        id: note.id.as_u64(),
                    });
                }
                if let Some(t) = event.tuplet.filter(|t| !t.is_valid()) {
                    return Err(ScoreError::InvalidTuplet {
                        actual: t.actual,
                        normal: t.normal,
                    });
                }
                if let Some(note) = event.notes().iter().find(|n| n.pitch > MAX_PITCH) {
                    return Err(ScoreError::PitchOutOfRange(note.pitch));
                }
            }
            let capacity = sig.capacity_quants();
            let used = measure.used_quants();
            if used > capacity + QUANT_EPSILON {
                return Err(ScoreError::MeasureOverflow {
                    needed: used,
                    remaining: capacity,
                });
            }
        }
        Ok(())
    }

    /// Serializes the score to pretty JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parses and validates a score from JSON.
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        let score: Score = serde_json::from_str(json)?;
        score.validate()?;
        Ok(score)
    }

    /// Loads and validates a score from a JSON file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

//! Measure representation.
//!
//! A measure holds a time-ordered list of events whose summed duration never
//! exceeds the capacity of its time signature.

use super::event::{Event, EventId};
use super::quant::{spans_overlap, Quants, QUANTS_PER_WHOLE, QUANT_EPSILON};
use crate::error::ScoreError;
use serde::{Deserialize, Serialize};

/// Time signature, e.g. 3/4 or 6/8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSignature {
    /// Beats per measure.
    pub numerator: u8,
    /// Beat unit as a power of two (4 = quarter note).
    pub denominator: u8,
}

impl TimeSignature {
    /// Creates a time signature, rejecting zero beats and beat units that
    /// are not a power of two up to 64.
    pub fn new(numerator: u8, denominator: u8) -> Result<Self, ScoreError> {
        let sig = Self {
            numerator,
            denominator,
        };
        if sig.is_valid() {
            Ok(sig)
        } else {
            Err(ScoreError::InvalidTimeSignature {
                numerator,
                denominator,
            })
        }
    }

    /// 4/4.
    pub fn common() -> Self {
        Self {
            numerator: 4,
            denominator: 4,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.numerator > 0
            && self.denominator.is_power_of_two()
            && self.denominator as u32 <= QUANTS_PER_WHOLE
    }

    /// Length of a full measure in quants.
    pub fn capacity_quants(&self) -> Quants {
        QUANTS_PER_WHOLE as f64 * self.numerator as f64 / self.denominator as f64
    }
}

impl Default for TimeSignature {
    fn default() -> Self {
        Self::common()
    }
}

/// A measure: time signature plus ordered events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measure {
    pub time_signature: TimeSignature,

    #[serde(default)]
    events: Vec<Event>,
}

impl Measure {
    /// Creates an empty measure.
    pub fn new(time_signature: TimeSignature) -> Self {
        Self {
            time_signature,
            events: Vec::new(),
        }
    }

    /// Appends an event, enforcing the time signature capacity.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateEventId` if an event with the same id is already
    /// present, `InvalidTuplet` for a zero tuplet ratio and `MeasureOverflow`
    /// if the event does not fit in the remaining space.
    pub fn add_event(&mut self, event: Event) -> Result<EventId, ScoreError> {
        if self.event(event.id).is_some() {
            return Err(ScoreError::DuplicateEventId {
                id: event.id.as_u64(),
            });
        }
        if let Some(t) = event.tuplet.filter(|t| !t.is_valid()) {
            return Err(ScoreError::InvalidTuplet {
                actual: t.actual,
                normal: t.normal,
            });
        }
        let needed = event.duration_quants();
        let remaining = self.remaining_quants();
        if needed > remaining + QUANT_EPSILON {
            return Err(ScoreError::MeasureOverflow { needed, remaining });
        }
        let id = event.id;
        self.events.push(event);
        Ok(id)
    }

    /// Returns all events in time order.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Returns a reference to an event by its ID.
    pub fn event(&self, id: EventId) -> Option<&Event> {
        self.events.iter().find(|e| e.id == id)
    }

    /// Position of an event within the measure.
    pub fn event_index(&self, id: EventId) -> Option<usize> {
        self.events.iter().position(|e| e.id == id)
    }

    /// Returns the number of events in the measure.
    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    /// Summed duration of all events.
    pub fn used_quants(&self) -> Quants {
        self.events.iter().map(Event::duration_quants).sum()
    }

    /// Space left before the measure is full.
    pub fn remaining_quants(&self) -> Quants {
        (self.time_signature.capacity_quants() - self.used_quants()).max(0.0)
    }

    /// Each event with its `[start, end)` interval.
    pub fn spans(&self) -> Vec<(&Event, Quants, Quants)> {
        let mut start = 0.0;
        self.events
            .iter()
            .map(|event| {
                let end = start + event.duration_quants();
                let span = (event, start, end);
                start = end;
                span
            })
            .collect()
    }

    /// The `[start, end)` interval of an event, if it exists.
    pub fn event_span(&self, id: EventId) -> Option<(Quants, Quants)> {
        self.spans()
            .into_iter()
            .find(|(e, _, _)| e.id == id)
            .map(|(_, start, end)| (start, end))
    }

    /// Events whose interval has a non-empty intersection with `[start, end)`.
    pub fn events_overlapping(&self, start: Quants, end: Quants) -> Vec<&Event> {
        self.spans()
            .into_iter()
            .filter(|(_, s, e)| spans_overlap(*s, *e, start, end))
            .map(|(event, _, _)| event)
            .collect()
    }
}

impl Default for Measure {
    fn default() -> Self {
        Self::new(TimeSignature::common())
    }
}

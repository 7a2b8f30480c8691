//! Staff representation.
//!
//! A staff is one horizontal line of music with a clef and an ordered list
//! of measures. Staves are identified by their index in the score.

use super::event::Event;
use super::measure::Measure;
use serde::{Deserialize, Serialize};

/// Clef of a staff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Clef {
    #[default]
    Treble,
    Bass,
    Alto,
    Tenor,
}

impl Clef {
    /// Pitch of the middle staff line.
    ///
    /// Rests have no pitch of their own; vertical navigation places them
    /// here.
    pub fn default_pitch(self) -> u8 {
        match self {
            Clef::Treble => 71, // B4
            Clef::Bass => 50,   // D3
            Clef::Alto => 60,   // C4
            Clef::Tenor => 57,  // A3
        }
    }
}

/// A staff: clef plus ordered measures.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Staff {
    #[serde(default)]
    pub clef: Clef,

    #[serde(default)]
    measures: Vec<Measure>,
}

impl Staff {
    /// Creates an empty staff.
    pub fn new(clef: Clef) -> Self {
        Self {
            clef,
            measures: Vec::new(),
        }
    }

    /// Appends a measure and returns its index.
    pub fn add_measure(&mut self, measure: Measure) -> usize {
        self.measures.push(measure);
        self.measures.len() - 1
    }

    /// Returns a measure by index.
    pub fn measure(&self, index: usize) -> Option<&Measure> {
        self.measures.get(index)
    }

    /// Returns a mutable measure by index.
    pub fn measure_mut(&mut self, index: usize) -> Option<&mut Measure> {
        self.measures.get_mut(index)
    }

    /// Returns all measures.
    pub fn measures(&self) -> &[Measure] {
        &self.measures
    }

    pub fn measure_count(&self) -> usize {
        self.measures.len()
    }

    /// Every event of the staff in reading order, tagged with its measure
    /// index.
    pub fn events_in_order(&self) -> Vec<(usize, &Event)> {
        self.measures
            .iter()
            .enumerate()
            .flat_map(|(m, measure)| measure.events().iter().map(move |e| (m, e)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::score::NoteValue;

    #[test]
    fn test_events_in_order_cross_measures() {
        let mut staff = Staff::new(Clef::Bass);
        let mut first = Measure::default();
        first.add_event(Event::note(NoteValue::Whole, 48)).unwrap();
        let mut second = Measure::default();
        second.add_event(Event::note(NoteValue::Half, 50)).unwrap();
        second.add_event(Event::rest(NoteValue::Half)).unwrap();
        staff.add_measure(first);
        staff.add_measure(second);

        let order: Vec<usize> = staff.events_in_order().iter().map(|(m, _)| *m).collect();
        assert_eq!(order, vec![0, 1, 1]);
        assert_eq!(staff.measure_count(), 2);
    }

    #[test]
    fn test_default_pitches_follow_clef() {
        assert!(Clef::Treble.default_pitch() > Clef::Alto.default_pitch());
        assert!(Clef::Alto.default_pitch() > Clef::Bass.default_pitch());
    }
}

//! Scripted replay of selection commands.
//!
//! A script is a JSON array of steps. Steps address notes by position
//! (staff, measure, event, note index from the bottom) or by pitch name, so
//! a script never depends on the ids generated when a score is loaded.
//!
//! ```json
//! [
//!   { "command": "select", "at": { "staff": 0, "measure": 0, "event": 1 } },
//!   { "command": "extend_horizontal", "direction": "right" },
//!   { "command": "expand_vertical", "direction": "up" },
//!   { "command": "undo" }
//! ]
//! ```

use crate::commands::{
    ClearSelectionCommand, ExpandSelectionVerticallyCommand, ExtendSelectionHorizontallyCommand,
    ExtendSelectionVerticallyCommand, HorizontalDirection, SelectAllCommand, SelectEventCommand,
    SelectFullEventsCommand, SelectNoteCommand, SelectionCommand, VerticalDirection,
};
use crate::score::{name_to_note, note_to_name, Score};
use crate::selection::{SelectedNote, Selection};
use crate::store::{SelectionStore, StoreConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Positional address of one selectable unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub staff: usize,
    pub measure: usize,
    pub event: usize,
    /// Note index counted from the lowest pitch. Ignored when `pitch` is set.
    #[serde(default)]
    pub note: usize,
    /// Pitch name such as "E4", picking the chord note with that pitch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pitch: Option<String>,
}

impl Position {
    pub fn new(staff: usize, measure: usize, event: usize, note: usize) -> Self {
        Self {
            staff,
            measure,
            event,
            note,
            pitch: None,
        }
    }

    fn resolve(&self, score: &Score) -> Option<SelectedNote> {
        let Some(name) = &self.pitch else {
            return score.member_at(self.staff, self.measure, self.event, self.note);
        };
        let pitch = name_to_note(name)?;
        let event = score.measure(self.staff, self.measure)?.events().get(self.event)?;
        let note = event.notes().iter().find(|n| n.pitch == pitch)?;
        Some(SelectedNote::new(self.staff, self.measure, event.id, Some(note.id)))
    }
}

/// One scripted action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Step {
    Select {
        at: Position,
    },
    SelectEvent {
        at: Position,
    },
    ExtendHorizontal {
        direction: HorizontalDirection,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target: Option<Position>,
    },
    ExpandVertical {
        direction: VerticalDirection,
    },
    ExtendVertical {
        direction: VerticalDirection,
    },
    SelectFullEvents,
    SelectAll {
        #[serde(default)]
        expand_if_selected: bool,
    },
    Clear,
    Undo,
    Redo,
}

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("step {step}: no note at staff {staff}, measure {measure}, event {event}")]
    UnknownPosition {
        step: usize,
        staff: usize,
        measure: usize,
        event: usize,
    },

    #[error("failed to read script: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse script: {0}")]
    Json(#[from] serde_json::Error),
}

/// Parses a script from JSON text.
pub fn parse_script(json: &str) -> Result<Vec<Step>, ScriptError> {
    Ok(serde_json::from_str(json)?)
}

/// Reads and parses a script file.
pub fn load_script<P: AsRef<Path>>(path: P) -> Result<Vec<Step>, ScriptError> {
    let json = fs::read_to_string(path)?;
    parse_script(&json)
}

/// Result of replaying a script.
#[derive(Debug)]
pub struct Replay {
    pub store: SelectionStore,
    /// How many steps changed the selection.
    pub changes: usize,
}

/// Runs `steps` in order against `score`, starting from an empty selection.
pub fn run_script(
    score: &Score,
    steps: &[Step],
    config: StoreConfig,
) -> Result<Replay, ScriptError> {
    let mut store = SelectionStore::with_config(config);
    let mut changes = 0;

    for (index, step) in steps.iter().enumerate() {
        let changed = match build_command(index, step, score)? {
            Some(command) => store.dispatch(command.as_ref(), score),
            None if *step == Step::Undo => store.undo(score),
            None => store.redo(score),
        };
        debug!(step = index, changed, "replayed");
        if changed {
            changes += 1;
        }
    }

    Ok(Replay { store, changes })
}

/// The command a step dispatches, or None for steps that act on history.
fn build_command(
    index: usize,
    step: &Step,
    score: &Score,
) -> Result<Option<Box<dyn SelectionCommand>>, ScriptError> {
    let locate = |position: &Position| {
        position
            .resolve(score)
            .ok_or(ScriptError::UnknownPosition {
                step: index,
                staff: position.staff,
                measure: position.measure,
                event: position.event,
            })
    };

    let command: Box<dyn SelectionCommand> = match step {
        Step::Select { at } => Box::new(SelectNoteCommand::new(locate(at)?)),
        Step::SelectEvent { at } => Box::new(SelectEventCommand::new(locate(at)?.event_key())),
        Step::ExtendHorizontal { direction, target } => match target {
            Some(target) => Box::new(ExtendSelectionHorizontallyCommand::to_target(
                *direction,
                locate(target)?,
            )),
            None => Box::new(ExtendSelectionHorizontallyCommand::new(*direction)),
        },
        Step::ExpandVertical { direction } => {
            Box::new(ExpandSelectionVerticallyCommand::new(*direction))
        }
        Step::ExtendVertical { direction } => {
            Box::new(ExtendSelectionVerticallyCommand::new(*direction))
        }
        Step::SelectFullEvents => Box::new(SelectFullEventsCommand),
        Step::SelectAll { expand_if_selected } => {
            Box::new(SelectAllCommand::new(*expand_if_selected))
        }
        Step::Clear => Box::new(ClearSelectionCommand),
        Step::Undo | Step::Redo => return Ok(None),
    };
    Ok(Some(command))
}

/// A selected unit described by position and pitch name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberReport {
    pub staff: usize,
    pub measure: usize,
    pub event: usize,
    /// Pitch name, or None for a rest.
    pub pitch: Option<String>,
}

impl MemberReport {
    fn of(score: &Score, member: &SelectedNote) -> Option<Self> {
        let measure = score.measure(member.staff_index, member.measure_index)?;
        let event_index = measure.event_index(member.event_id)?;
        let pitch = match member.note_id {
            Some(id) => Some(note_to_name(measure.events()[event_index].get_note(id)?.pitch)),
            None => None,
        };
        Some(Self {
            staff: member.staff_index,
            measure: member.measure_index,
            event: event_index,
            pitch,
        })
    }
}

/// Human-readable form of a selection, printed by the replay binary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionReport {
    pub anchor: Option<MemberReport>,
    pub focus: Option<MemberReport>,
    pub notes: Vec<MemberReport>,
}

impl SelectionReport {
    /// Describes `selection`, skipping members `score` cannot resolve.
    pub fn new(score: &Score, selection: &Selection) -> Self {
        Self {
            anchor: selection.anchor().and_then(|a| MemberReport::of(score, &a)),
            focus: selection
                .focus()
                .as_member()
                .and_then(|f| MemberReport::of(score, &f)),
            notes: selection
                .notes()
                .iter()
                .filter_map(|n| MemberReport::of(score, n))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{four_quarters, grand_staff, pitches};

    #[test]
    fn test_parse_steps() {
        let steps = parse_script(
            r#"[
                {"command": "select", "at": {"staff": 0, "measure": 0, "event": 1}},
                {"command": "extend_horizontal", "direction": "right"},
                {"command": "extend_horizontal", "direction": "left",
                 "target": {"staff": 0, "measure": 0, "event": 0}},
                {"command": "select_all"},
                {"command": "undo"}
            ]"#,
        )
        .unwrap();

        assert_eq!(steps.len(), 5);
        assert_eq!(
            steps[0],
            Step::Select {
                at: Position::new(0, 0, 1, 0)
            }
        );
        assert_eq!(
            steps[3],
            Step::SelectAll {
                expand_if_selected: false
            }
        );
        assert_eq!(steps[4], Step::Undo);
    }

    #[test]
    fn test_unknown_command_is_rejected() {
        assert!(matches!(
            parse_script(r#"[{"command": "transpose"}]"#),
            Err(ScriptError::Json(_))
        ));
    }

    #[test]
    fn test_replay_counts_changes() {
        let score = four_quarters();
        let steps = vec![
            Step::Select {
                at: Position::new(0, 0, 0, 0),
            },
            Step::ExtendHorizontal {
                direction: HorizontalDirection::Left,
                target: None,
            },
            Step::ExtendHorizontal {
                direction: HorizontalDirection::Right,
                target: None,
            },
            Step::Undo,
            Step::Redo,
        ];
        let replay = run_script(&score, &steps, StoreConfig::default()).unwrap();
        // Extending left from the first event is a no-op.
        assert_eq!(replay.changes, 4);
        assert_eq!(replay.store.selection().len(), 2);
    }

    #[test]
    fn test_pitch_addressing() {
        let score = grand_staff();
        let mut at = Position::new(0, 0, 2, 0);
        at.pitch = Some("E5".to_string());
        let replay = run_script(&score, &[Step::Select { at }], StoreConfig::default()).unwrap();
        assert_eq!(pitches(&score, replay.store.selection()), vec![(0, 76)]);
    }

    #[test]
    fn test_unknown_position_reports_step() {
        let score = four_quarters();
        let steps = vec![
            Step::Clear,
            Step::Select {
                at: Position::new(0, 0, 9, 0),
            },
        ];
        let err = run_script(&score, &steps, StoreConfig::default()).unwrap_err();
        assert!(matches!(err, ScriptError::UnknownPosition { step: 1, event: 9, .. }));
    }

    #[test]
    fn test_report_names_pitches() {
        let score = four_quarters();
        let steps = vec![
            Step::Select {
                at: Position::new(0, 0, 1, 0),
            },
            Step::ExtendHorizontal {
                direction: HorizontalDirection::Right,
                target: None,
            },
        ];
        let replay = run_script(&score, &steps, StoreConfig::default()).unwrap();
        let report = SelectionReport::new(&score, replay.store.selection());

        let mut names: Vec<_> = report.notes.iter().map(|m| m.pitch.clone()).collect();
        names.sort();
        assert_eq!(names, vec![Some("D4".to_string()), Some("E4".to_string())]);
        assert_eq!(report.anchor.unwrap().event, 1);
        assert_eq!(report.focus.unwrap().event, 2);
    }
}

//! Chart commands and undo/redo history.

use serde::{Deserialize, Serialize};

use super::ToothStates;
use crate::models::{Condition, Surface, ToothCondition, ToothState, TreatmentKind};
use crate::taxonomy::ToothNumber;

/// How a surface edit changes the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "condition")]
pub enum SurfaceAction {
    /// Advance through the click cycle
    Cycle,
    /// Set a condition directly (radial menu)
    Set(Condition),
}

/// A single mutation request against the chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "command")]
pub enum ChartCommand {
    SurfaceEdit {
        tooth: ToothNumber,
        surface: Surface,
        action: SurfaceAction,
    },
    ToothEdit {
        tooth: ToothNumber,
        condition: ToothCondition,
    },
    Reset {
        tooth: ToothNumber,
    },
}

impl ChartCommand {
    pub fn cycle(tooth: ToothNumber, surface: Surface) -> Self {
        ChartCommand::SurfaceEdit {
            tooth,
            surface,
            action: SurfaceAction::Cycle,
        }
    }

    pub fn set_surface(tooth: ToothNumber, surface: Surface, condition: Condition) -> Self {
        ChartCommand::SurfaceEdit {
            tooth,
            surface,
            action: SurfaceAction::Set(condition),
        }
    }

    pub fn tooth(&self) -> ToothNumber {
        match *self {
            ChartCommand::SurfaceEdit { tooth, .. }
            | ChartCommand::ToothEdit { tooth, .. }
            | ChartCommand::Reset { tooth } => tooth,
        }
    }

    pub fn surface(&self) -> Option<Surface> {
        match *self {
            ChartCommand::SurfaceEdit { surface, .. } => Some(surface),
            _ => None,
        }
    }

    pub fn treatment_kind(&self) -> TreatmentKind {
        match self {
            ChartCommand::SurfaceEdit { .. } => TreatmentKind::Surface,
            ChartCommand::ToothEdit { .. } => TreatmentKind::Tooth,
            ChartCommand::Reset { .. } => TreatmentKind::Reset,
        }
    }

    /// Run the matching transition and capture the full before/after state.
    pub fn apply(&self, states: &mut ToothStates) -> AppliedCommand {
        let tooth = self.tooth();
        let before = states.get(tooth);
        match *self {
            ChartCommand::SurfaceEdit {
                surface,
                action: SurfaceAction::Cycle,
                ..
            } => {
                states.cycle(tooth, surface);
            }
            ChartCommand::SurfaceEdit {
                surface,
                action: SurfaceAction::Set(condition),
                ..
            } => states.set_surface(tooth, surface, condition),
            ChartCommand::ToothEdit { condition, .. } => {
                states.set_tooth_condition(tooth, condition)
            }
            ChartCommand::Reset { .. } => states.reset(tooth),
        }
        AppliedCommand {
            command: *self,
            before,
            after: states.get(tooth),
        }
    }
}

/// A command together with the tooth state it replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppliedCommand {
    pub command: ChartCommand,
    pub before: ToothState,
    pub after: ToothState,
}

impl AppliedCommand {
    pub fn tooth(&self) -> ToothNumber {
        self.command.tooth()
    }

    /// Whether the command actually changed anything.
    pub fn changed(&self) -> bool {
        self.before != self.after
    }

    /// Restore the state this command replaced.
    pub fn revert(&self, states: &mut ToothStates) {
        states.replace(self.tooth(), self.before);
    }

    /// Re-apply the recorded outcome.
    pub fn reapply(&self, states: &mut ToothStates) {
        states.replace(self.tooth(), self.after);
    }
}

/// Bounded undo/redo stacks.
#[derive(Debug, Clone)]
pub struct CommandHistory {
    undo: Vec<AppliedCommand>,
    redo: Vec<AppliedCommand>,
    limit: usize,
}

/// Default number of undoable steps.
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

impl Default for CommandHistory {
    fn default() -> Self {
        Self::with_limit(DEFAULT_HISTORY_LIMIT)
    }
}

impl CommandHistory {
    pub fn with_limit(limit: usize) -> Self {
        Self {
            undo: Vec::new(),
            redo: Vec::new(),
            limit: limit.max(1),
        }
    }

    /// Record a freshly applied command; clears the redo stack.
    pub fn push(&mut self, applied: AppliedCommand) {
        self.redo.clear();
        self.undo.push(applied);
        if self.undo.len() > self.limit {
            self.undo.remove(0);
        }
    }

    pub fn undo(&mut self, states: &mut ToothStates) -> Option<AppliedCommand> {
        let applied = self.undo.pop()?;
        applied.revert(states);
        self.redo.push(applied);
        Some(applied)
    }

    pub fn redo(&mut self, states: &mut ToothStates) -> Option<AppliedCommand> {
        let applied = self.redo.pop()?;
        applied.reapply(states);
        self.undo.push(applied);
        Some(applied)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }
}

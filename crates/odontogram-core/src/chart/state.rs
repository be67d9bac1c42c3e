//! Canonical tooth state map and its transitions.

use std::collections::BTreeMap;

use crate::models::{Condition, Surface, ToothCondition, ToothState};
use crate::taxonomy::ToothNumber;

/// Per-tooth state for one chart.
///
/// Teeth without an entry read as the default state. Every transition is
/// total and replaces a complete entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToothStates {
    teeth: BTreeMap<ToothNumber, ToothState>,
}

impl ToothStates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state of a tooth (default when never charted).
    pub fn get(&self, tooth: ToothNumber) -> ToothState {
        self.teeth.get(&tooth).copied().unwrap_or_default()
    }

    /// Advance one surface through the click cycle. Returns the new condition.
    pub fn cycle(&mut self, tooth: ToothNumber, surface: Surface) -> Condition {
        let current = self.get(tooth);
        let next = current.surface(surface).next();
        self.replace(tooth, current.with_surface(surface, next));
        next
    }

    /// Set one surface directly, bypassing the cycle.
    pub fn set_surface(&mut self, tooth: ToothNumber, surface: Surface, condition: Condition) {
        let next = self.get(tooth).with_surface(surface, condition);
        self.replace(tooth, next);
    }

    /// Apply a whole-tooth action; surface findings are cleared.
    pub fn set_tooth_condition(&mut self, tooth: ToothNumber, condition: ToothCondition) {
        self.replace(tooth, ToothState::with_tooth_condition(condition));
    }

    /// Clear all surfaces and the tooth-level override.
    pub fn reset(&mut self, tooth: ToothNumber) {
        self.teeth.remove(&tooth);
    }

    /// Replace the whole entry for a tooth.
    pub fn replace(&mut self, tooth: ToothNumber, state: ToothState) {
        if state.is_default() {
            self.teeth.remove(&tooth);
        } else {
            self.teeth.insert(tooth, state);
        }
    }

    /// Teeth with a non-default state, in ascending tooth order.
    pub fn iter(&self) -> impl Iterator<Item = (ToothNumber, &ToothState)> {
        self.teeth.iter().map(|(t, s)| (*t, s))
    }

    /// Number of teeth with a non-default state.
    pub fn len(&self) -> usize {
        self.teeth.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teeth.is_empty()
    }
}

impl FromIterator<(ToothNumber, ToothState)> for ToothStates {
    fn from_iter<I: IntoIterator<Item = (ToothNumber, ToothState)>>(iter: I) -> Self {
        let mut states = ToothStates::new();
        for (tooth, state) in iter {
            states.replace(tooth, state);
        }
        states
    }
}

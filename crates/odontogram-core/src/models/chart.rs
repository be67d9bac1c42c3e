//! Per-tooth chart state: surfaces, conditions and the tooth-level override.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the five clinically distinct faces of a tooth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Surface {
    Occlusal,
    Vestibular,
    Lingual,
    Mesial,
    Distal,
}

impl Surface {
    /// All surfaces in chart order (O, V, L, M, D).
    pub const ALL: [Surface; 5] = [
        Surface::Occlusal,
        Surface::Vestibular,
        Surface::Lingual,
        Surface::Mesial,
        Surface::Distal,
    ];

    pub fn index(self) -> usize {
        match self {
            Surface::Occlusal => 0,
            Surface::Vestibular => 1,
            Surface::Lingual => 2,
            Surface::Mesial => 3,
            Surface::Distal => 4,
        }
    }

    /// Single-letter shorthand used by the compact chart representation.
    pub fn letter(self) -> char {
        match self {
            Surface::Occlusal => 'O',
            Surface::Vestibular => 'V',
            Surface::Lingual => 'L',
            Surface::Mesial => 'M',
            Surface::Distal => 'D',
        }
    }

    pub fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'O' => Some(Surface::Occlusal),
            'V' => Some(Surface::Vestibular),
            'L' => Some(Surface::Lingual),
            'M' => Some(Surface::Mesial),
            'D' => Some(Surface::Distal),
            _ => None,
        }
    }

    /// Surface name as persisted by the backend (note the `oclusal` spelling).
    pub fn wire_name(self) -> &'static str {
        match self {
            Surface::Occlusal => "oclusal",
            Surface::Vestibular => "vestibular",
            Surface::Lingual => "lingual",
            Surface::Mesial => "mesial",
            Surface::Distal => "distal",
        }
    }
}

impl fmt::Display for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// Condition of a single surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    /// No finding (`none` in the legacy shorthand).
    #[default]
    Healthy,
    Caries,
    Restored,
    Completed,
}

impl Condition {
    /// All conditions in cycle order.
    pub const ALL: [Condition; 4] = [
        Condition::Healthy,
        Condition::Caries,
        Condition::Restored,
        Condition::Completed,
    ];

    /// Next condition in the click cycle: Healthy → Caries → Restored → Completed → Healthy.
    pub fn next(self) -> Self {
        match self {
            Condition::Healthy => Condition::Caries,
            Condition::Caries => Condition::Restored,
            Condition::Restored => Condition::Completed,
            Condition::Completed => Condition::Healthy,
        }
    }

    /// Name used by the legacy shorthand format.
    pub fn legacy_name(self) -> &'static str {
        match self {
            Condition::Healthy => "none",
            Condition::Caries => "caries",
            Condition::Restored => "restored",
            Condition::Completed => "completed",
        }
    }

    pub fn from_legacy_name(name: &str) -> Option<Self> {
        match name {
            "none" => Some(Condition::Healthy),
            "caries" => Some(Condition::Caries),
            "restored" => Some(Condition::Restored),
            "completed" => Some(Condition::Completed),
            _ => None,
        }
    }
}

/// Whole-tooth action that supersedes the individual surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToothCondition {
    Healthy,
    Extracted,
}

impl ToothCondition {
    pub fn as_str(self) -> &'static str {
        match self {
            ToothCondition::Healthy => "healthy",
            ToothCondition::Extracted => "extracted",
        }
    }
}

/// Complete state of one tooth.
///
/// Mutations always produce a whole new value; callers replace the entry
/// rather than patching fields in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ToothState {
    surfaces: [Condition; 5],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tooth_condition: Option<ToothCondition>,
}

impl ToothState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn surface(&self, surface: Surface) -> Condition {
        self.surfaces[surface.index()]
    }

    pub fn tooth_condition(&self) -> Option<ToothCondition> {
        self.tooth_condition
    }

    /// Surfaces paired with their conditions, in chart order.
    pub fn surfaces(&self) -> impl Iterator<Item = (Surface, Condition)> + '_ {
        Surface::ALL.iter().map(move |&s| (s, self.surface(s)))
    }

    /// Copy of this state with one surface replaced.
    ///
    /// Editing a surface clears an `Extracted` override: the tooth is
    /// being charted again, so it is present.
    pub fn with_surface(&self, surface: Surface, condition: Condition) -> Self {
        let mut next = *self;
        next.surfaces[surface.index()] = condition;
        if next.tooth_condition == Some(ToothCondition::Extracted) {
            next.tooth_condition = None;
        }
        next
    }

    /// State after a whole-tooth action; surface findings are superseded.
    pub fn with_tooth_condition(condition: ToothCondition) -> Self {
        Self {
            surfaces: [Condition::Healthy; 5],
            tooth_condition: Some(condition),
        }
    }

    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    pub fn has_surface_findings(&self) -> bool {
        self.surfaces.iter().any(|c| *c != Condition::Healthy)
    }

    pub fn is_present(&self) -> bool {
        self.tooth_condition != Some(ToothCondition::Extracted)
    }
}

//! Tooth taxonomy.
//!
//! Classifies FDI tooth numbers into dentition, jaw, side and anatomical kind.
//! Only the 32 permanent codes (11–18, 21–28, 31–38, 41–48) and the 20 primary
//! codes (51–55, 61–65, 71–75, 81–85) are valid; anything else is rejected.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Taxonomy errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaxonomyError {
    #[error("Unknown tooth identifier: {0}")]
    UnknownTooth(u32),

    #[error("Tooth {number} is not part of the {expected} dentition")]
    DentitionMismatch { number: u32, expected: Dentition },
}

pub type TaxonomyResult<T> = Result<T, TaxonomyError>;

/// Permanent (adult) or primary (deciduous) dentition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dentition {
    Permanent,
    Primary,
}

impl fmt::Display for Dentition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dentition::Permanent => write!(f, "permanent"),
            Dentition::Primary => write!(f, "primary"),
        }
    }
}

/// Upper (maxillary) or lower (mandibular) jaw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Jaw {
    Upper,
    Lower,
}

impl Jaw {
    /// Vertical direction the crowns of this jaw point to (+1 up, -1 down).
    pub fn crown_direction(self) -> f32 {
        match self {
            Jaw::Upper => -1.0,
            Jaw::Lower => 1.0,
        }
    }
}

/// Patient side of the mouth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Right,
    Left,
}

/// Anatomical tooth kind, derived from the FDI position digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToothKind {
    CentralIncisor,
    LateralIncisor,
    Canine,
    Premolar,
    Molar,
}

impl ToothKind {
    /// All kinds, midline outward.
    pub const ALL: [ToothKind; 5] = [
        ToothKind::CentralIncisor,
        ToothKind::LateralIncisor,
        ToothKind::Canine,
        ToothKind::Premolar,
        ToothKind::Molar,
    ];

    /// Incisors and canines.
    pub fn is_anterior(self) -> bool {
        matches!(
            self,
            ToothKind::CentralIncisor | ToothKind::LateralIncisor | ToothKind::Canine
        )
    }

    /// Stable kebab-case name (e.g. `central-incisor`).
    pub fn as_str(self) -> &'static str {
        match self {
            ToothKind::CentralIncisor => "central-incisor",
            ToothKind::LateralIncisor => "lateral-incisor",
            ToothKind::Canine => "canine",
            ToothKind::Premolar => "premolar",
            ToothKind::Molar => "molar",
        }
    }
}

impl fmt::Display for ToothKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated FDI tooth number.
///
/// Serializes as the bare integer code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct ToothNumber(u8);

impl ToothNumber {
    /// Validate an FDI code.
    pub fn new(code: u32) -> TaxonomyResult<Self> {
        let quadrant = code / 10;
        let position = code % 10;
        let max_position = match quadrant {
            1..=4 => 8,
            5..=8 => 5,
            _ => return Err(TaxonomyError::UnknownTooth(code)),
        };
        if position == 0 || position > max_position {
            return Err(TaxonomyError::UnknownTooth(code));
        }
        Ok(Self(code as u8))
    }

    /// The raw two-digit code.
    pub fn code(self) -> u32 {
        u32::from(self.0)
    }

    /// Quadrant digit (1–4 permanent, 5–8 primary).
    pub fn quadrant(self) -> u8 {
        self.0 / 10
    }

    /// Position digit counted from the midline.
    pub fn position(self) -> u8 {
        self.0 % 10
    }

    pub fn dentition(self) -> Dentition {
        if self.quadrant() <= 4 {
            Dentition::Permanent
        } else {
            Dentition::Primary
        }
    }

    pub fn jaw(self) -> Jaw {
        match self.quadrant() {
            1 | 2 | 5 | 6 => Jaw::Upper,
            _ => Jaw::Lower,
        }
    }

    pub fn side(self) -> Side {
        match self.quadrant() {
            1 | 4 | 5 | 8 => Side::Right,
            _ => Side::Left,
        }
    }

    pub fn kind(self) -> ToothKind {
        kind_for_position(self.position(), self.dentition())
    }

    /// Every valid tooth number, permanent first, in ascending code order.
    pub fn all() -> impl Iterator<Item = ToothNumber> {
        PERMANENT_QUADRANTS
            .iter()
            .flat_map(|&q| (1..=8).map(move |p| q * 10 + p))
            .chain(
                PRIMARY_QUADRANTS
                    .iter()
                    .flat_map(|&q| (1..=5).map(move |p| q * 10 + p)),
            )
            .map(|code| ToothNumber(code as u8))
    }
}

impl TryFrom<u32> for ToothNumber {
    type Error = TaxonomyError;

    fn try_from(code: u32) -> Result<Self, Self::Error> {
        ToothNumber::new(code)
    }
}

impl From<ToothNumber> for u32 {
    fn from(tooth: ToothNumber) -> Self {
        tooth.code()
    }
}

impl fmt::Display for ToothNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

const PERMANENT_QUADRANTS: [u32; 4] = [1, 2, 3, 4];
const PRIMARY_QUADRANTS: [u32; 4] = [5, 6, 7, 8];

/// Classify a raw tooth code.
///
/// `is_primary` must agree with the code's quadrant; a primary flag on a
/// permanent code (or vice versa) is rejected rather than guessed.
pub fn classify(number: u32, is_primary: bool) -> TaxonomyResult<ToothKind> {
    let tooth = ToothNumber::new(number)?;
    let expected = if is_primary {
        Dentition::Primary
    } else {
        Dentition::Permanent
    };
    if tooth.dentition() != expected {
        return Err(TaxonomyError::DentitionMismatch { number, expected });
    }
    Ok(tooth.kind())
}

fn kind_for_position(position: u8, dentition: Dentition) -> ToothKind {
    match (position, dentition) {
        (1, _) => ToothKind::CentralIncisor,
        (2, _) => ToothKind::LateralIncisor,
        (3, _) => ToothKind::Canine,
        // Primary dentition has no premolars.
        (4 | 5, Dentition::Permanent) => ToothKind::Premolar,
        _ => ToothKind::Molar,
    }
}

/// Teeth of one chart row, ordered left to right as the chart is viewed
/// (patient's right on the viewer's left).
pub fn chart_row(jaw: Jaw, dentition: Dentition) -> Vec<ToothNumber> {
    let (right_quadrant, left_quadrant, count) = match (jaw, dentition) {
        (Jaw::Upper, Dentition::Permanent) => (1, 2, 8),
        (Jaw::Lower, Dentition::Permanent) => (4, 3, 8),
        (Jaw::Upper, Dentition::Primary) => (5, 6, 5),
        (Jaw::Lower, Dentition::Primary) => (8, 7, 5),
    };
    let right = (1..=count).rev().map(|p| right_quadrant * 10 + p);
    let left = (1..=count).map(|p| left_quadrant * 10 + p);
    right
        .chain(left)
        .map(|code| ToothNumber(code as u8))
        .collect()
}

//! Wire format for persisted tooth records.
//!
//! The backend stores one record per charted tooth:
//!
//! ```json
//! { "toothNumber": 16, "isPresent": true,
//!   "surfaces": [{ "surface": "oclusal", "condition": "caries", "severity": 1, "notes": "" }],
//!   "generalNotes": "" }
//! ```
//!
//! Writing goes through a [`ToothStateSerializer`] ([`CanonicalSerializer`] or
//! [`LegacySerializer`]); reading always uses [`read_record`]. The condition
//! mapping is lossy: `completed` is written as `filled` and `filled` always
//! reads back as `restored`.

mod canonical;
mod legacy;

pub use canonical::*;
pub use legacy::*;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::models::{Condition, Surface, ToothCondition, ToothState};
use crate::taxonomy::{TaxonomyError, ToothNumber};

/// Wire conversion errors.
#[derive(Error, Debug)]
pub enum WireError {
    #[error("Taxonomy error: {0}")]
    Taxonomy(#[from] TaxonomyError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown surface key: {0}")]
    UnknownSurface(String),
}

pub type WireResult<T> = Result<T, WireError>;

pub const WIRE_HEALTHY: &str = "healthy";
pub const WIRE_CARIES: &str = "caries";
pub const WIRE_FILLED: &str = "filled";

/// Persisted record for one tooth.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ToothRecord {
    pub tooth_number: ToothNumber,
    pub is_present: bool,
    #[serde(default)]
    pub surfaces: Vec<SurfaceRecord>,
    #[serde(default)]
    pub general_notes: String,
    /// Stored alongside the record, never part of the JSON shape
    #[serde(skip)]
    pub last_updated: Option<String>,
}

/// Persisted condition of one surface.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SurfaceRecord {
    /// `oclusal`, `vestibular`, `lingual`, `mesial` or `distal`
    pub surface: String,
    /// `healthy`, `caries` or `filled`
    pub condition: String,
    /// 1-5; always written as 1
    #[serde(default = "default_severity")]
    pub severity: u8,
    #[serde(default)]
    pub notes: String,
}

fn default_severity() -> u8 {
    1
}

impl SurfaceRecord {
    pub fn new(surface: Surface, condition: &str) -> Self {
        Self {
            surface: surface.wire_name().to_string(),
            condition: condition.to_string(),
            severity: 1,
            notes: String::new(),
        }
    }
}

/// Converts a tooth's canonical state into its wire record.
pub trait ToothStateSerializer: Send + Sync {
    /// Build the record for one tooth, or `None` when nothing needs persisting.
    fn serialize_tooth(
        &self,
        tooth: ToothNumber,
        state: &ToothState,
        notes: &str,
    ) -> Option<ToothRecord>;
}

/// Serialize a set of teeth, skipping those the serializer omits.
pub fn serialize_teeth<'a, I>(teeth: I, serializer: &dyn ToothStateSerializer) -> Vec<ToothRecord>
where
    I: IntoIterator<Item = (ToothNumber, ToothState, &'a str)>,
{
    teeth
        .into_iter()
        .filter_map(|(tooth, state, notes)| serializer.serialize_tooth(tooth, &state, notes))
        .collect()
}

/// Recover the shorthand surface from a wire surface name (first letter, uppercased).
pub fn read_surface_key(wire: &str) -> Option<Surface> {
    wire.chars()
        .next()
        .and_then(|c| Surface::from_letter(c.to_ascii_uppercase()))
}

/// Map a wire condition back to a chart condition.
pub fn read_condition(wire: &str) -> Condition {
    match wire {
        WIRE_CARIES => Condition::Caries,
        WIRE_FILLED => Condition::Restored,
        _ => Condition::Healthy,
    }
}

/// Read path: wire record → canonical tooth state.
pub fn read_record(record: &ToothRecord) -> ToothState {
    if !record.is_present {
        return ToothState::with_tooth_condition(ToothCondition::Extracted);
    }

    let mut state = ToothState::new();
    for surface_record in &record.surfaces {
        match read_surface_key(&surface_record.surface) {
            Some(surface) => {
                state = state.with_surface(surface, read_condition(&surface_record.condition));
            }
            None => warn!(
                tooth = record.tooth_number.code(),
                surface = %surface_record.surface,
                "dropping unrecognised surface on read"
            ),
        }
    }
    state
}

/// Parse a JSON array of wire records.
pub fn parse_records(json: &str) -> WireResult<Vec<ToothRecord>> {
    Ok(serde_json::from_str(json)?)
}

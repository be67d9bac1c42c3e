//! Odontogram aggregate and treatment history.

use serde::{Deserialize, Serialize};

use super::chart::{Condition, Surface, ToothState};
use crate::taxonomy::ToothNumber;
use crate::wire::ToothRecord;

/// The per-patient dental chart.
///
/// At most one exists per patient; that uniqueness is enforced by the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Odontogram {
    /// Unique odontogram ID
    pub id: String,
    /// Patient this chart belongs to
    pub patient_id: String,
    /// Doctor who owns the chart
    pub doctor_id: String,
    /// Persisted tooth records (wire shape)
    pub teeth: Vec<ToothRecord>,
    /// Last clinical examination date
    pub last_exam_date: Option<String>,
    /// Creation timestamp
    pub created_at: String,
    /// Last update timestamp
    pub updated_at: String,
}

impl Odontogram {
    /// Create an empty chart for a patient.
    pub fn new(patient_id: String, doctor_id: String) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            patient_id,
            doctor_id,
            teeth: Vec::new(),
            last_exam_date: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Find the record for a tooth.
    pub fn tooth(&self, tooth: ToothNumber) -> Option<&ToothRecord> {
        self.teeth.iter().find(|r| r.tooth_number == tooth)
    }

    /// Touch the updated_at timestamp.
    pub fn touch(&mut self) {
        self.updated_at = chrono::Utc::now().to_rfc3339();
    }
}

/// What kind of edit a treatment entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreatmentKind {
    /// A single surface changed condition
    Surface,
    /// A whole-tooth action (healthy, extracted)
    Tooth,
    /// The tooth was cleared back to its default state
    Reset,
}

impl TreatmentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TreatmentKind::Surface => "surface",
            TreatmentKind::Tooth => "tooth",
            TreatmentKind::Reset => "reset",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "surface" => Some(TreatmentKind::Surface),
            "tooth" => Some(TreatmentKind::Tooth),
            "reset" => Some(TreatmentKind::Reset),
            _ => None,
        }
    }
}

/// One entry of the append-only treatment log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Treatment {
    /// Unique treatment ID
    pub id: String,
    /// Odontogram the edit was applied to
    pub odontogram_id: String,
    pub kind: TreatmentKind,
    pub tooth_number: ToothNumber,
    /// Edited surface (surface edits only)
    pub surface: Option<Surface>,
    /// Complete tooth state before the edit
    pub before: ToothState,
    /// Complete tooth state after the edit
    pub after: ToothState,
    /// When the clinician made the edit
    pub performed_at: String,
}

impl Treatment {
    pub fn new(
        odontogram_id: String,
        kind: TreatmentKind,
        tooth_number: ToothNumber,
        surface: Option<Surface>,
        before: ToothState,
        after: ToothState,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            odontogram_id,
            kind,
            tooth_number,
            surface,
            before,
            after,
            performed_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Surface condition before the edit (surface edits only).
    pub fn condition_before(&self) -> Option<Condition> {
        self.surface.map(|s| self.before.surface(s))
    }

    /// Surface condition after the edit (surface edits only).
    pub fn condition_after(&self) -> Option<Condition> {
        self.surface.map(|s| self.after.surface(s))
    }
}

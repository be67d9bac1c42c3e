//! Per-kind shape parameters.

use serde::{Deserialize, Serialize};

use crate::taxonomy::ToothKind;

/// How the top of the crown is sculpted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "form")]
pub enum OcclusalForm {
    /// Gently curved incisal edge
    IncisalEdge { rise: f32 },
    /// One central cusp tip
    SingleCusp { rise: f32 },
    /// Cusp bumps around a central fossa crossed by grooves
    Cusps {
        centers: CuspLayout,
        rise: f32,
        fossa_depth: f32,
        groove_depth: f32,
    },
}

/// Cusp arrangement on the occlusal table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CuspLayout {
    /// Buccal and lingual cusp
    Two,
    /// Four cusps in a square
    Four,
}

impl CuspLayout {
    /// Cusp centers in footprint coordinates (x mesio-distal, z labio-lingual).
    pub fn centers(self) -> &'static [(f32, f32)] {
        match self {
            CuspLayout::Two => &[(0.0, 0.48), (0.0, -0.48)],
            CuspLayout::Four => &[(0.45, 0.45), (-0.45, 0.45), (0.45, -0.45), (-0.45, -0.45)],
        }
    }

    /// Whether grooves cross the table in both directions.
    pub fn crossing_grooves(self) -> bool {
        matches!(self, CuspLayout::Four)
    }
}

/// Deformation parameters for one tooth kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToothProfile {
    /// Superellipse exponent of the cross-section (2 = ellipse)
    pub section_exponent: f32,
    /// How much the mesial/distal contact faces are flattened
    pub contact_flattening: f32,
    /// Cross-section scale at the very base
    pub neck_scale: f32,
    /// Power of the neck taper curve (< 1 narrows sharply near the base)
    pub neck_power: f32,
    /// Labio-lingual reduction at the top of the crown
    pub sagittal_reduction: f32,
    /// Depth of the concave lingual shovel (0 for none)
    pub shovel_depth: f32,
    /// Labial bulge amplitude
    pub labial_bulge: f32,
    pub occlusal: OcclusalForm,
}

impl ToothProfile {
    pub fn for_kind(kind: ToothKind) -> Self {
        match kind {
            ToothKind::CentralIncisor | ToothKind::LateralIncisor => Self {
                section_exponent: 2.6,
                contact_flattening: 0.18,
                neck_scale: 0.55,
                neck_power: 0.45,
                sagittal_reduction: 0.9,
                shovel_depth: 0.22,
                labial_bulge: 0.12,
                occlusal: OcclusalForm::IncisalEdge { rise: 0.04 },
            },
            ToothKind::Canine => Self {
                section_exponent: 2.6,
                contact_flattening: 0.14,
                neck_scale: 0.55,
                neck_power: 0.45,
                sagittal_reduction: 0.88,
                shovel_depth: 0.14,
                labial_bulge: 0.14,
                occlusal: OcclusalForm::SingleCusp { rise: 0.16 },
            },
            ToothKind::Premolar => Self {
                section_exponent: 4.5,
                contact_flattening: 0.12,
                neck_scale: 0.6,
                neck_power: 0.4,
                sagittal_reduction: 0.18,
                shovel_depth: 0.0,
                labial_bulge: 0.08,
                occlusal: OcclusalForm::Cusps {
                    centers: CuspLayout::Two,
                    rise: 0.1,
                    fossa_depth: 0.07,
                    groove_depth: 0.04,
                },
            },
            ToothKind::Molar => Self {
                section_exponent: 5.0,
                contact_flattening: 0.1,
                neck_scale: 0.62,
                neck_power: 0.35,
                sagittal_reduction: 0.12,
                shovel_depth: 0.0,
                labial_bulge: 0.07,
                occlusal: OcclusalForm::Cusps {
                    centers: CuspLayout::Four,
                    rise: 0.11,
                    fossa_depth: 0.08,
                    groove_depth: 0.05,
                },
            },
        }
    }
}

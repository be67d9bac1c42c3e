//! Nominal tooth dimensions per kind.
//!
//! Shared by the arch layout (tooth widths drive angular spacing) and the mesh
//! generator (width/depth/crown height of each tooth). Values are in
//! millimetres for the permanent dentition; primary teeth use the same table
//! scaled by `primary_scale`.

use serde::{Deserialize, Serialize};

use crate::taxonomy::{Dentition, ToothKind, ToothNumber};

/// Nominal crown size of one tooth.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToothDimensions {
    /// Mesio-distal width
    pub width: f32,
    /// Labio-lingual depth
    pub depth: f32,
    /// Crown height
    pub crown_height: f32,
}

impl ToothDimensions {
    pub const fn new(width: f32, depth: f32, crown_height: f32) -> Self {
        Self {
            width,
            depth,
            crown_height,
        }
    }

    pub fn scaled(self, factor: f32) -> Self {
        Self {
            width: self.width * factor,
            depth: self.depth * factor,
            crown_height: self.crown_height * factor,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.width > 0.0 && self.depth > 0.0 && self.crown_height > 0.0
    }
}

/// Dimension table for every tooth kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnatomyConfig {
    pub central_incisor: ToothDimensions,
    pub lateral_incisor: ToothDimensions,
    pub canine: ToothDimensions,
    pub premolar: ToothDimensions,
    pub molar: ToothDimensions,
    /// Uniform size factor applied to primary teeth (< 1)
    pub primary_scale: f32,
}

impl Default for AnatomyConfig {
    fn default() -> Self {
        Self {
            central_incisor: ToothDimensions::new(8.5, 7.0, 10.5),
            lateral_incisor: ToothDimensions::new(6.5, 6.0, 9.0),
            canine: ToothDimensions::new(7.5, 8.0, 10.0),
            premolar: ToothDimensions::new(7.0, 9.0, 8.0),
            molar: ToothDimensions::new(10.0, 11.0, 7.5),
            primary_scale: 0.72,
        }
    }
}

impl AnatomyConfig {
    /// Permanent-size dimensions of a kind.
    pub fn for_kind(&self, kind: ToothKind) -> ToothDimensions {
        match kind {
            ToothKind::CentralIncisor => self.central_incisor,
            ToothKind::LateralIncisor => self.lateral_incisor,
            ToothKind::Canine => self.canine,
            ToothKind::Premolar => self.premolar,
            ToothKind::Molar => self.molar,
        }
    }

    /// Dimensions of a kind in the given dentition.
    pub fn dimensions(&self, kind: ToothKind, dentition: Dentition) -> ToothDimensions {
        let base = self.for_kind(kind);
        match dentition {
            Dentition::Permanent => base,
            Dentition::Primary => base.scaled(self.primary_scale),
        }
    }

    /// Dimensions of a specific tooth.
    pub fn for_tooth(&self, tooth: ToothNumber) -> ToothDimensions {
        self.dimensions(tooth.kind(), tooth.dentition())
    }
}

//! Procedural tooth mesh generation.
//!
//! A tooth is produced by deforming a revolved cylinder through a fixed
//! sequence of passes:
//!
//! ```text
//! ToothBlank::revolve
//!     → SuperellipseSection   (kind-specific cross-section)
//!     → ContactFlattening     (flat mesial/distal facets)
//!     → NeckTaper             (narrow cervical third)
//!     → SagittalTaper         (incisal thinning + lingual shovel)
//!     → LabialBulge           (convex vestibular face)
//!     → OcclusalSculpt        (edge, cusp, or cusps + fossa + grooves)
//!     → MicroNoise            (seeded organic perturbation)
//!     → WholeToothJitter      (seeded footprint scale/twist)
//!     → scale to dimensions, gingival burial offset, smooth normals
//! ```
//!
//! Output is bit-identical for the same (kind, dimensions, seed, config).

mod cache;
mod gingiva;
mod modifiers;
mod noise;
mod normals;
mod primitive;
mod profile;

pub use cache::*;
pub use gingiva::*;
pub use modifiers::*;
pub use noise::*;
pub use normals::smooth_normals;
pub use primitive::*;
pub use profile::*;

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::anatomy::ToothDimensions;
use crate::models::Surface;
use crate::taxonomy::ToothKind;

/// Mesh errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeshError {
    #[error("Invalid tooth dimensions: width {width}, depth {depth}, crown height {crown_height}")]
    InvalidDimensions {
        width: f32,
        depth: f32,
        crown_height: f32,
    },
}

pub type MeshResult<T> = Result<T, MeshError>;

/// Mesh resolution and shaping constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshConfig {
    pub radial_segments: u32,
    pub height_segments: u32,
    pub cap_rings: u32,
    /// Fraction of crown height placed below the gum plane
    pub burial_fraction: f32,
    /// Micro-noise amplitude, relative to the footprint
    pub noise_amplitude: f32,
    /// Seeded footprint scale variation
    pub jitter_scale: f32,
    /// Seeded twist about the long axis, in radians
    pub jitter_twist: f32,
    /// Cap rings with rho at or below this are tagged occlusal
    pub occlusal_rho: f32,
    /// Labio-lingual thickness of the gingiva ribbon
    pub gingiva_thickness: f32,
    /// How far the gingiva extends away from the crowns
    pub gingiva_depth: f32,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            radial_segments: 48,
            height_segments: 24,
            cap_rings: 8,
            burial_fraction: 0.48,
            noise_amplitude: 0.012,
            jitter_scale: 0.03,
            jitter_twist: 0.035,
            occlusal_rho: 0.7,
            gingiva_thickness: 9.0,
            gingiva_depth: 6.0,
        }
    }
}

/// Vertex/normal/index buffers for one tooth, with the surface each
/// vertex belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToothMesh {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
    /// Surface tag per vertex. Mesial is the local -x side.
    pub surfaces: Vec<Surface>,
}

impl ToothMesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Axis-aligned bounds (min, max). Zero for an empty mesh.
    pub fn bounds(&self) -> (Vec3, Vec3) {
        if self.positions.is_empty() {
            return (Vec3::ZERO, Vec3::ZERO);
        }
        self.positions.iter().map(|&p| Vec3::from(p)).fold(
            (Vec3::splat(f32::INFINITY), Vec3::splat(f32::NEG_INFINITY)),
            |(lo, hi), p| (lo.min(p), hi.max(p)),
        )
    }

    /// SHA-256 over the vertex, normal, index and tag buffers.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for p in &self.positions {
            for c in p {
                hasher.update(c.to_le_bytes());
            }
        }
        for n in &self.normals {
            for c in n {
                hasher.update(c.to_le_bytes());
            }
        }
        for i in &self.indices {
            hasher.update(i.to_le_bytes());
        }
        for s in &self.surfaces {
            hasher.update([s.index() as u8]);
        }
        hex::encode(hasher.finalize())
    }

    /// Copy of the mesh under an affine transform. A mirroring transform
    /// flips triangle winding so faces keep pointing outward.
    pub fn transformed(&self, transform: &Mat4) -> ToothMesh {
        let normal_matrix = transform.inverse().transpose();
        let positions = self
            .positions
            .iter()
            .map(|&p| transform.transform_point3(Vec3::from(p)).to_array())
            .collect();
        let normals = self
            .normals
            .iter()
            .map(|&n| {
                normal_matrix
                    .transform_vector3(Vec3::from(n))
                    .normalize_or_zero()
                    .to_array()
            })
            .collect();
        let mut indices = self.indices.clone();
        if transform.determinant() < 0.0 {
            for tri in indices.chunks_exact_mut(3) {
                tri.swap(1, 2);
            }
        }
        ToothMesh {
            positions,
            normals,
            indices,
            surfaces: self.surfaces.clone(),
        }
    }
}

/// Generate one anatomical tooth.
///
/// The crown grows along +y from the gum plane; `burial_fraction` of the
/// crown height sits below y = 0. `seed` drives micro-noise and whole-tooth
/// jitter only.
pub fn generate_tooth(
    kind: ToothKind,
    dimensions: ToothDimensions,
    seed: u32,
    config: &MeshConfig,
) -> MeshResult<ToothMesh> {
    if !dimensions.is_valid() {
        return Err(MeshError::InvalidDimensions {
            width: dimensions.width,
            depth: dimensions.depth,
            crown_height: dimensions.crown_height,
        });
    }

    let profile = ToothProfile::for_kind(kind);
    let mut blank =
        ToothBlank::revolve(config.radial_segments, config.height_segments, config.cap_rings);

    blank
        .apply(SuperellipseSection {
            exponent: profile.section_exponent,
        })
        .apply(ContactFlattening {
            strength: profile.contact_flattening,
        })
        .apply(NeckTaper {
            base_scale: profile.neck_scale,
            power: profile.neck_power,
        })
        .apply(SagittalTaper {
            reduction: profile.sagittal_reduction,
            shovel_depth: profile.shovel_depth,
        })
        .apply(LabialBulge {
            amount: profile.labial_bulge,
        })
        .apply(OcclusalSculpt {
            form: profile.occlusal,
        })
        .apply(MicroNoise {
            amplitude: config.noise_amplitude,
            noise: SurfaceNoise::new(seed),
        })
        .apply(WholeToothJitter {
            seed,
            scale: config.jitter_scale,
            twist: config.jitter_twist,
        });

    let scale = Vec3::new(
        dimensions.width * 0.5,
        dimensions.crown_height,
        dimensions.depth * 0.5,
    );
    let burial = Vec3::new(0.0, config.burial_fraction * dimensions.crown_height, 0.0);
    let positions: Vec<Vec3> = blank.positions.iter().map(|&p| p * scale - burial).collect();
    let normals = smooth_normals(&positions, &blank.indices);
    let surfaces = blank
        .params
        .iter()
        .map(|param| tag_surface(param, config.occlusal_rho))
        .collect();

    Ok(ToothMesh {
        positions: positions.iter().map(|p| p.to_array()).collect(),
        normals: normals.iter().map(|n| n.to_array()).collect(),
        indices: blank.indices,
        surfaces,
    })
}

/// Surface a vertex belongs to, in the tooth's local frame.
///
/// Inner cap rings are occlusal; everything else is split into four
/// sectors around the axis: +z vestibular, -z lingual, -x mesial, +x distal.
pub fn tag_surface(param: &VertexParam, occlusal_rho: f32) -> Surface {
    if param.region == Region::Cap && param.rho <= occlusal_rho {
        return Surface::Occlusal;
    }
    let (c, s) = (param.angle.cos(), param.angle.sin());
    if s >= c.abs() {
        Surface::Vestibular
    } else if -s >= c.abs() {
        Surface::Lingual
    } else if c < 0.0 {
        Surface::Mesial
    } else {
        Surface::Distal
    }
}

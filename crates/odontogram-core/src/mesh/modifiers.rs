//! Deformation passes applied to the tooth blank.
//!
//! Each pass implements [`ShapeModifier`] and works in the normalized blank
//! frame (footprint in [-1, 1], height in [0, 1]). Passes read the generation
//! parameters of each vertex rather than its current position wherever they
//! need "where on the tooth is this", so the pass order only matters for the
//! positions themselves.
//!
//! ```ignore
//! blank
//!     .apply(SuperellipseSection { exponent: 2.6 })
//!     .apply(ContactFlattening { strength: 0.18 })
//!     .apply(NeckTaper { base_scale: 0.55, power: 0.45 });
//! ```

use glam::{Quat, Vec3};

use super::noise::{SeedStream, SurfaceNoise};
use super::primitive::{Region, ToothBlank, VertexParam};
use super::profile::{CuspLayout, OcclusalForm};

/// A single deformation of the blank.
pub trait ShapeModifier {
    /// Apply this modifier in place
    fn apply(&self, blank: &mut ToothBlank);
}

/// Fluent application of modifiers.
pub trait ShapeApply {
    fn apply<M: ShapeModifier>(&mut self, modifier: M) -> &mut Self;
}

impl ShapeApply for ToothBlank {
    fn apply<M: ShapeModifier>(&mut self, modifier: M) -> &mut Self {
        modifier.apply(self);
        self
    }
}

fn for_each_vertex(blank: &mut ToothBlank, mut f: impl FnMut(&VertexParam, &mut Vec3)) {
    for (param, position) in blank.params.iter().zip(blank.positions.iter_mut()) {
        f(param, position);
    }
}

/// Radius of a unit superellipse `|x|^n + |z|^n = 1` in direction `angle`.
pub fn superellipse_radius(angle: f32, exponent: f32) -> f32 {
    let c = angle.cos().abs();
    let s = angle.sin().abs();
    (c.powf(exponent) + s.powf(exponent)).powf(-1.0 / exponent)
}

/// Replace circular cross-sections with superellipses.
///
/// Higher exponents give squarer sections (posterior teeth), lower ones
/// oval sections (anterior teeth). The section is normalized so its extent
/// along the axes stays 1.
pub struct SuperellipseSection {
    pub exponent: f32,
}

impl ShapeModifier for SuperellipseSection {
    fn apply(&self, blank: &mut ToothBlank) {
        for_each_vertex(blank, |param, p| {
            if param.rho == 0.0 {
                return;
            }
            let r = param.rho * superellipse_radius(param.angle, self.exponent);
            p.x = r * param.angle.cos();
            p.z = r * param.angle.sin();
        });
    }
}

/// Compress the section near the mesial and distal directions, producing
/// flat contact facets.
pub struct ContactFlattening {
    pub strength: f32,
}

impl ShapeModifier for ContactFlattening {
    fn apply(&self, blank: &mut ToothBlank) {
        for_each_vertex(blank, |param, p| {
            let alignment = param.angle.cos().abs().powi(6);
            p.x *= 1.0 - self.strength * alignment;
        });
    }
}

/// Narrow the tooth towards its base (cervical third).
pub struct NeckTaper {
    /// Section scale at height 0
    pub base_scale: f32,
    pub power: f32,
}

impl ShapeModifier for NeckTaper {
    fn apply(&self, blank: &mut ToothBlank) {
        for_each_vertex(blank, |param, p| {
            let s = self.base_scale + (1.0 - self.base_scale) * param.height.powf(self.power);
            p.x *= s;
            p.z *= s;
        });
    }
}

/// Labio-lingual taper towards the crown tip, with an optional concave
/// lingual shovel in the upper two thirds.
pub struct SagittalTaper {
    pub reduction: f32,
    pub shovel_depth: f32,
}

impl ShapeModifier for SagittalTaper {
    fn apply(&self, blank: &mut ToothBlank) {
        for_each_vertex(blank, |param, p| {
            let h = param.height;
            p.z *= 1.0 - self.reduction * h * h;

            if self.shovel_depth > 0.0 && p.z < 0.0 && h > 1.0 / 3.0 {
                let t = (h - 1.0 / 3.0) * 1.5;
                let (u, _) = param.footprint();
                let across = (1.0 - u * u).max(0.0);
                let w = (std::f32::consts::PI * t).sin() * across;
                p.z *= 1.0 - self.shovel_depth * w;
            }
        });
    }
}

/// Convex bulge on the vestibular side, peaking mid-crown.
pub struct LabialBulge {
    pub amount: f32,
}

impl ShapeModifier for LabialBulge {
    fn apply(&self, blank: &mut ToothBlank) {
        for_each_vertex(blank, |param, p| {
            let facing = param.angle.sin();
            if facing <= 0.0 {
                return;
            }
            let peak = (std::f32::consts::PI * param.height).sin();
            p.z *= 1.0 + self.amount * peak * facing;
        });
    }
}

/// Height where occlusal sculpting starts.
pub const OCCLUSAL_START: f32 = 0.6;

/// Sculpt the top of the crown.
pub struct OcclusalSculpt {
    pub form: OcclusalForm,
}

impl OcclusalSculpt {
    /// Vertical offset at a footprint point, before weighting.
    pub fn relief(&self, u: f32, v: f32) -> f32 {
        match self.form {
            OcclusalForm::IncisalEdge { rise } => rise * (1.0 - u * u),
            OcclusalForm::SingleCusp { rise } => rise * (1.0 - u.abs()).max(0.0).powf(1.5),
            OcclusalForm::Cusps {
                centers,
                rise,
                fossa_depth,
                groove_depth,
            } => {
                let cusps = cusp_field(centers, u, v);
                let pit = inverse_distance((u * u + v * v).sqrt(), 0.25);
                let mut groove = inverse_distance(v.abs(), 0.12);
                if centers.crossing_grooves() {
                    groove = groove.max(inverse_distance(u.abs(), 0.12));
                }
                rise * cusps - fossa_depth * pit - groove_depth * groove
            }
        }
    }
}

impl ShapeModifier for OcclusalSculpt {
    fn apply(&self, blank: &mut ToothBlank) {
        for_each_vertex(blank, |param, p| {
            if param.height < OCCLUSAL_START || param.region == Region::Base {
                return;
            }
            let t = (param.height - OCCLUSAL_START) / (1.0 - OCCLUSAL_START);
            let weight = t * t * (3.0 - 2.0 * t);
            let (u, v) = param.footprint();
            p.y += weight * self.relief(u, v);
        });
    }
}

/// `1 / (1 + (d / falloff)^2)`: 1 on the feature, fading with distance.
fn inverse_distance(distance: f32, falloff: f32) -> f32 {
    let q = distance / falloff;
    1.0 / (1.0 + q * q)
}

fn cusp_field(layout: CuspLayout, u: f32, v: f32) -> f32 {
    layout
        .centers()
        .iter()
        .map(|&(cx, cz)| {
            let d = ((u - cx).powi(2) + (v - cz).powi(2)).sqrt();
            inverse_distance(d, 0.3)
        })
        .sum::<f32>()
        .min(1.0)
}

/// Small organic perturbation: radial on the walls, vertical on the cap.
pub struct MicroNoise {
    pub amplitude: f32,
    pub noise: SurfaceNoise,
}

impl ShapeModifier for MicroNoise {
    fn apply(&self, blank: &mut ToothBlank) {
        if self.amplitude == 0.0 {
            return;
        }
        for_each_vertex(blank, |param, p| {
            let (u, v) = param.footprint();
            let n = self.noise.sample(u, v, param.height) * self.amplitude;
            match param.region {
                Region::Side => {
                    p.x *= 1.0 + n;
                    p.z *= 1.0 + n;
                }
                Region::Cap => p.y += n * 0.5,
                Region::Base => {}
            }
        });
    }
}

/// Seeded whole-tooth variation: footprint scale and a small twist about
/// the long axis. Never touches height.
pub struct WholeToothJitter {
    pub seed: u32,
    pub scale: f32,
    pub twist: f32,
}

impl ShapeModifier for WholeToothJitter {
    fn apply(&self, blank: &mut ToothBlank) {
        let mut stream = SeedStream::new(self.seed);
        let sx = 1.0 + self.scale * stream.next_signed();
        let sz = 1.0 + self.scale * stream.next_signed();
        let rotation = Quat::from_rotation_y(self.twist * stream.next_signed());
        for p in blank.positions.iter_mut() {
            let y = p.y;
            let mut q = rotation * Vec3::new(p.x * sx, 0.0, p.z * sz);
            q.y = y;
            *p = q;
        }
    }
}

//! Arch layout engine.
//!
//! Places teeth along a parametric dental arch
//!
//! ```text
//! point(θ) = (sin θ · rx, 0, −|sin θ|^p · rz)
//! ```
//!
//! which is flat at the front and curves sharply towards the molars. Angles
//! are assigned by accumulated tooth width rather than evenly, so narrow
//! incisors cluster at the midline and wide molars spread out posteriorly:
//!
//! ```text
//! θᵢ = (cumulativeWidthCenterᵢ / totalWidth − 0.5) · span
//! ```
//!
//! Permanent and primary teeth of the same jaw are laid out on separate arches.

mod grid;
mod gum;

pub use grid::*;
pub use gum::*;

use std::collections::BTreeMap;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::anatomy::AnatomyConfig;
use crate::taxonomy::{Dentition, Jaw, TaxonomyResult, ToothKind, ToothNumber};

/// Shape of one arch curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArchDimensions {
    /// Half-width of the arch (x)
    pub radius_x: f32,
    /// Depth of the arch (z)
    pub radius_z: f32,
    /// Curve exponent `p`
    pub exponent: f32,
    /// Total angular span in radians (< π)
    pub angular_span: f32,
}

impl ArchDimensions {
    /// Point on the arch curve at `theta`, in the jaw plane (y = 0).
    pub fn point(&self, theta: f32) -> Vec3 {
        let s = theta.sin();
        Vec3::new(
            s * self.radius_x,
            0.0,
            -s.abs().powf(self.exponent) * self.radius_z,
        )
    }

    /// Derivative of [`point`](Self::point) with respect to `theta`.
    pub fn tangent(&self, theta: f32) -> Vec3 {
        let s = theta.sin();
        let c = theta.cos();
        let dz = if s == 0.0 {
            0.0
        } else {
            -self.exponent * s.abs().powf(self.exponent - 1.0) * s.signum() * c * self.radius_z
        };
        Vec3::new(c * self.radius_x, 0.0, dz)
    }

    /// Horizontal outward normal (labial direction) at `theta`.
    pub fn outward_normal(&self, theta: f32) -> Vec3 {
        let t = self.tangent(theta);
        Vec3::new(-t.z, 0.0, t.x).normalize_or_zero()
    }
}

/// Layout constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub permanent: ArchDimensions,
    pub primary: ArchDimensions,
    /// Vertical distance between the upper and lower gum planes
    pub jaw_gap: f32,
    /// Height of the interdental papillae wave on the gum line
    pub gum_wave_amplitude: f32,
    /// Samples along each gum line
    pub gum_samples: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            permanent: ArchDimensions {
                radius_x: 28.0,
                radius_z: 42.0,
                exponent: 2.0,
                angular_span: 0.9 * std::f32::consts::PI,
            },
            primary: ArchDimensions {
                radius_x: 20.0,
                radius_z: 27.0,
                exponent: 2.0,
                angular_span: 0.85 * std::f32::consts::PI,
            },
            jaw_gap: 4.0,
            gum_wave_amplitude: 1.2,
            gum_samples: 96,
        }
    }
}

impl LayoutConfig {
    pub fn arch(&self, dentition: Dentition) -> &ArchDimensions {
        match dentition {
            Dentition::Permanent => &self.permanent,
            Dentition::Primary => &self.primary,
        }
    }

    /// Height of a jaw's gum plane.
    pub fn jaw_height(&self, jaw: Jaw) -> f32 {
        match jaw {
            Jaw::Upper => self.jaw_gap * 0.5,
            Jaw::Lower => -self.jaw_gap * 0.5,
        }
    }
}

/// Placement of one tooth on its arch. Recomputed whenever the visible set
/// changes; never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArchPosition {
    pub tooth: ToothNumber,
    pub kind: ToothKind,
    pub jaw: Jaw,
    pub dentition: Dentition,
    /// Angle along the arch curve
    pub theta: f32,
    /// Angle occupied by this tooth's width
    pub angular_width: f32,
    /// Center of the tooth on the gum plane
    pub anchor: Vec3,
    /// Rotation about +y that turns local +z (labial) to the arch normal
    pub yaw: f32,
    /// Mesio-distal width used for spacing
    pub width: f32,
}

/// Layout of a visible tooth set, in input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArchLayout {
    pub positions: Vec<ArchPosition>,
}

impl ArchLayout {
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn get(&self, tooth: ToothNumber) -> Option<&ArchPosition> {
        self.positions.iter().find(|p| p.tooth == tooth)
    }

    /// Positions grouped per arch (jaw + dentition), each in input order.
    pub fn arches(&self) -> BTreeMap<(Jaw, Dentition), Vec<&ArchPosition>> {
        let mut groups: BTreeMap<(Jaw, Dentition), Vec<&ArchPosition>> = BTreeMap::new();
        for position in &self.positions {
            groups
                .entry((position.jaw, position.dentition))
                .or_default()
                .push(position);
        }
        groups
    }
}

/// Lay out an ordered list of visible teeth.
///
/// Teeth are grouped per jaw and dentition; within each group the angular
/// order follows the input order exactly. An empty list yields an empty layout.
pub fn layout_arch(
    teeth: &[ToothNumber],
    config: &LayoutConfig,
    anatomy: &AnatomyConfig,
) -> ArchLayout {
    let mut groups: BTreeMap<(Jaw, Dentition), Vec<usize>> = BTreeMap::new();
    for (index, tooth) in teeth.iter().enumerate() {
        groups
            .entry((tooth.jaw(), tooth.dentition()))
            .or_default()
            .push(index);
    }

    let mut slots: Vec<Option<ArchPosition>> = vec![None; teeth.len()];
    for ((jaw, dentition), indices) in groups {
        let arch = config.arch(dentition);
        let jaw_y = config.jaw_height(jaw);
        let widths: Vec<f32> = indices
            .iter()
            .map(|&i| anatomy.for_tooth(teeth[i]).width)
            .collect();
        let total: f32 = widths.iter().sum();

        let mut cumulative = 0.0;
        for (&index, &width) in indices.iter().zip(&widths) {
            let center = cumulative + width * 0.5;
            cumulative += width;

            let theta = (center / total - 0.5) * arch.angular_span;
            let normal = arch.outward_normal(theta);
            let mut anchor = arch.point(theta);
            anchor.y = jaw_y;

            let tooth = teeth[index];
            slots[index] = Some(ArchPosition {
                tooth,
                kind: tooth.kind(),
                jaw,
                dentition,
                theta,
                angular_width: width / total * arch.angular_span,
                anchor,
                yaw: normal.x.atan2(normal.z),
                width,
            });
        }
    }

    let positions: Vec<ArchPosition> = slots.into_iter().flatten().collect();
    debug!(teeth = positions.len(), "arch layout computed");
    ArchLayout { positions }
}

/// Lay out raw tooth codes, rejecting unknown identifiers.
pub fn layout_codes(
    codes: &[u32],
    config: &LayoutConfig,
    anatomy: &AnatomyConfig,
) -> TaxonomyResult<ArchLayout> {
    let teeth = codes
        .iter()
        .map(|&code| ToothNumber::new(code))
        .collect::<TaxonomyResult<Vec<_>>>()?;
    Ok(layout_arch(&teeth, config, anatomy))
}

/// Teeth visible in the 3D chart: every permanent tooth, plus the primary
/// dentition when requested. Row order per jaw (viewer's left to right).
pub fn visible_teeth(show_primary: bool) -> Vec<ToothNumber> {
    use crate::taxonomy::chart_row;

    let mut teeth = Vec::new();
    for jaw in [Jaw::Upper, Jaw::Lower] {
        teeth.extend(chart_row(jaw, Dentition::Permanent));
        if show_primary {
            teeth.extend(chart_row(jaw, Dentition::Primary));
        }
    }
    teeth
}

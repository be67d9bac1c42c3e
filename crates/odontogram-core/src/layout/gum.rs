//! Gum-line curves.
//!
//! Each arch gets a sampled curve following the same arch formula as the
//! teeth, displaced vertically by a papilla wave:
//!
//! ```text
//! wave(θ) = cos((distanceToNearestToothCenter / averageToothGap) · π)
//! ```
//!
//! The gum recedes over each tooth center (wave = 1) and rises between teeth,
//! forming the interdental papillae. The gingiva mesh is built from these
//! curves, not from the tooth anchors.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::{ArchLayout, ArchPosition, LayoutConfig};
use crate::taxonomy::{Dentition, Jaw};

/// One sample of a gum line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GumPoint {
    pub theta: f32,
    pub position: Vec3,
    /// Papilla wave value in [-1, 1], 1 over a tooth center. Between teeth
    /// wider than average (molars) it drops below 0.
    pub wave: f32,
}

/// Sampled gum line for one arch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GumLine {
    pub jaw: Jaw,
    pub dentition: Dentition,
    pub points: Vec<GumPoint>,
}

impl GumLine {
    /// Build the gum line for one arch from its tooth positions.
    ///
    /// Returns `None` for an empty arch.
    pub fn for_arch(positions: &[&ArchPosition], config: &LayoutConfig) -> Option<Self> {
        let first = positions.first()?;
        let last = positions.last()?;
        let arch = config.arch(first.dentition);
        let jaw_y = config.jaw_height(first.jaw);
        let direction = first.jaw.crown_direction();

        let centers: Vec<f32> = positions.iter().map(|p| p.theta).collect();
        let average_gap = if centers.len() > 1 {
            (last.theta - first.theta) / (centers.len() - 1) as f32
        } else {
            first.angular_width
        };

        let start = first.theta - first.angular_width * 0.5;
        let end = last.theta + last.angular_width * 0.5;
        let samples = config.gum_samples.max(2);

        let points = (0..samples)
            .map(|i| {
                let t = i as f32 / (samples - 1) as f32;
                let theta = start + (end - start) * t;
                let distance = nearest_distance(&centers, theta);
                let wave = papilla_wave(distance, average_gap);
                let mut position = arch.point(theta);
                position.y = jaw_y - direction * config.gum_wave_amplitude * wave;
                GumPoint {
                    theta,
                    position,
                    wave,
                }
            })
            .collect();

        Some(Self {
            jaw: first.jaw,
            dentition: first.dentition,
            points,
        })
    }

    /// Gum lines for every non-empty arch in a layout.
    pub fn for_layout(layout: &ArchLayout, config: &LayoutConfig) -> Vec<GumLine> {
        layout
            .arches()
            .values()
            .filter_map(|positions| GumLine::for_arch(positions, config))
            .collect()
    }
}

/// Papilla wave for a given angular distance to the nearest tooth center.
pub fn papilla_wave(distance: f32, average_gap: f32) -> f32 {
    if average_gap <= 0.0 {
        return 1.0;
    }
    (distance / average_gap * std::f32::consts::PI).cos()
}

fn nearest_distance(centers: &[f32], theta: f32) -> f32 {
    centers
        .iter()
        .map(|c| (theta - c).abs())
        .fold(f32::INFINITY, f32::min)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anatomy::AnatomyConfig;
    use crate::layout::layout_arch;
    use crate::taxonomy::chart_row;

    #[test]
    fn test_wave_peaks_at_center() {
        assert!((papilla_wave(0.0, 0.2) - 1.0).abs() < 1e-6);
        assert!(papilla_wave(0.1, 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_gum_line_spans_arch() {
        let config = LayoutConfig::default();
        let layout = layout_arch(
            &chart_row(Jaw::Upper, Dentition::Permanent),
            &config,
            &AnatomyConfig::default(),
        );
        let lines = GumLine::for_layout(&layout, &config);
        assert_eq!(lines.len(), 1);
        let line = &lines[0];
        assert_eq!(line.points.len(), config.gum_samples);
        let half_span = config.permanent.angular_span * 0.5;
        assert!((line.points[0].theta + half_span).abs() < 1e-4);
        assert!((line.points.last().unwrap().theta - half_span).abs() < 1e-4);
    }

    #[test]
    fn test_gum_recedes_over_tooth_centers() {
        let config = LayoutConfig::default();
        let layout = layout_arch(
            &chart_row(Jaw::Lower, Dentition::Permanent),
            &config,
            &AnatomyConfig::default(),
        );
        let lines = GumLine::for_layout(&layout, &config);
        let line = &lines[0];
        let jaw_y = config.jaw_height(Jaw::Lower);
        let lowest = line
            .points
            .iter()
            .map(|p| p.position.y)
            .fold(f32::INFINITY, f32::min);
        // lower crowns point up, so full recession sits below the plane
        assert!(lowest < jaw_y);
        assert!(lowest >= jaw_y - config.gum_wave_amplitude - 1e-4);
    }

    #[test]
    fn test_wave_dips_below_zero_between_molars() {
        let config = LayoutConfig::default();
        let layout = layout_arch(
            &chart_row(Jaw::Upper, Dentition::Permanent),
            &config,
            &AnatomyConfig::default(),
        );
        let positions = &layout.positions;
        let n = positions.len();
        let average_gap = (positions[n - 1].theta - positions[0].theta) / (n - 1) as f32;
        // 18 and 17 are both molars, wider than the average tooth
        let half_molar_gap = (positions[1].theta - positions[0].theta) * 0.5;

        let wave = papilla_wave(half_molar_gap, average_gap);
        assert!(wave < 0.0);
        assert!(wave >= -1.0);
    }

    #[test]
    fn test_empty_arch_has_no_gum() {
        assert!(GumLine::for_arch(&[], &LayoutConfig::default()).is_none());
    }
}

//! Gingiva mesh built from a gum line.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::{smooth_normals, MeshConfig};
use crate::layout::{GumLine, LayoutConfig};
use crate::taxonomy::{Dentition, Jaw};

/// A closed-profile ribbon following one gum line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GingivaMesh {
    pub jaw: Jaw,
    pub dentition: Dentition,
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

/// Profile rows around the ribbon: labial base, labial margin, lingual
/// margin, lingual base.
const ROWS: u32 = 4;

impl GingivaMesh {
    pub fn from_gum_line(line: &GumLine, layout: &LayoutConfig, config: &MeshConfig) -> Self {
        let arch = layout.arch(line.dentition);
        let direction = line.jaw.crown_direction();
        let half = config.gingiva_thickness * 0.5;
        let drop = Vec3::new(0.0, -direction * config.gingiva_depth, 0.0);

        let mut positions = Vec::with_capacity(line.points.len() * ROWS as usize);
        for point in &line.points {
            let outward = arch.outward_normal(point.theta) * half;
            let margin_labial = point.position + outward;
            let margin_lingual = point.position - outward;
            positions.push(margin_labial + drop);
            positions.push(margin_labial);
            positions.push(margin_lingual);
            positions.push(margin_lingual + drop);
        }

        let mut indices = Vec::new();
        let samples = line.points.len() as u32;
        for i in 0..samples.saturating_sub(1) {
            for row in 0..ROWS {
                let next_row = (row + 1) % ROWS;
                let a = i * ROWS + row;
                let b = (i + 1) * ROWS + row;
                let c = (i + 1) * ROWS + next_row;
                let d = i * ROWS + next_row;
                // the upper jaw hangs upside down
                if direction > 0.0 {
                    indices.extend_from_slice(&[a, b, c, a, c, d]);
                } else {
                    indices.extend_from_slice(&[a, c, b, a, d, c]);
                }
            }
        }

        let normals = smooth_normals(&positions, &indices);
        Self {
            jaw: line.jaw,
            dentition: line.dentition,
            positions: positions.iter().map(|p| p.to_array()).collect(),
            normals: normals.iter().map(|n| n.to_array()).collect(),
            indices,
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

//! Five-region click targets on the 2D chart.
//!
//! Each tooth box is split into a central square (occlusal) and four
//! trapezoids along the edges:
//!
//! ```text
//! +-----------+
//! |\   top   /|
//! | +-------+ |
//! | |   O   | |
//! | +-------+ |
//! |/ bottom  \|
//! +-----------+
//! ```
//!
//! The top edge is vestibular for upper teeth and lingual for lower teeth.
//! The mesial edge is the one facing the chart midline.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::layout::{ChartGrid, ToothBox};
use crate::models::Surface;
use crate::taxonomy::{Jaw, Side, ToothNumber};

/// Side length of the occlusal square relative to the box.
pub const OCCLUSAL_FRACTION: f32 = 0.4;

/// A surface under the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurfaceHit {
    pub tooth: ToothNumber,
    pub surface: Surface,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edge {
    Top,
    Bottom,
    Left,
    Right,
}

fn edge_surface(tooth: ToothNumber, edge: Edge) -> Surface {
    let upper = tooth.jaw() == Jaw::Upper;
    // patient's right is drawn on the viewer's left, so its midline is to the right
    let mesial_right = tooth.side() == Side::Right;
    match edge {
        Edge::Top if upper => Surface::Vestibular,
        Edge::Top => Surface::Lingual,
        Edge::Bottom if upper => Surface::Lingual,
        Edge::Bottom => Surface::Vestibular,
        Edge::Right if mesial_right => Surface::Mesial,
        Edge::Right => Surface::Distal,
        Edge::Left if mesial_right => Surface::Distal,
        Edge::Left => Surface::Mesial,
    }
}

fn surface_edge(tooth: ToothNumber, surface: Surface) -> Option<Edge> {
    [Edge::Top, Edge::Bottom, Edge::Left, Edge::Right]
        .into_iter()
        .find(|&edge| edge_surface(tooth, edge) == surface)
}

/// Surface of a point inside a tooth box.
pub fn surface_in_box(tooth_box: &ToothBox, point: Vec2) -> Option<Surface> {
    if !tooth_box.contains(point) {
        return None;
    }
    let local = tooth_box.local(point);
    let half = OCCLUSAL_FRACTION * 0.5;
    if (local.x - 0.5).abs() <= half && (local.y - 0.5).abs() <= half {
        return Some(Surface::Occlusal);
    }

    let (u, v) = (local.x, local.y);
    let edge = if v <= u && v <= 1.0 - u {
        Edge::Top
    } else if v >= u && v >= 1.0 - u {
        Edge::Bottom
    } else if u < 0.5 {
        Edge::Left
    } else {
        Edge::Right
    };
    Some(edge_surface(tooth_box.tooth, edge))
}

/// Tooth surface under a screen point.
pub fn hit_test(grid: &ChartGrid, point: Vec2) -> Option<SurfaceHit> {
    let tooth_box = grid.box_at(point)?;
    let surface = surface_in_box(tooth_box, point)?;
    Some(SurfaceHit {
        tooth: tooth_box.tooth,
        surface,
    })
}

/// Outline of a surface region, clockwise in screen space.
pub fn surface_polygon(tooth_box: &ToothBox, surface: Surface) -> Vec<Vec2> {
    let o = tooth_box.origin;
    let s = tooth_box.size;
    let lo = (0.5 - OCCLUSAL_FRACTION * 0.5) * s;
    let hi = (0.5 + OCCLUSAL_FRACTION * 0.5) * s;
    let at = |x: f32, y: f32| o + Vec2::new(x, y);

    let Some(edge) = surface_edge(tooth_box.tooth, surface) else {
        return vec![at(lo, lo), at(hi, lo), at(hi, hi), at(lo, hi)];
    };
    match edge {
        Edge::Top => vec![at(0.0, 0.0), at(s, 0.0), at(hi, lo), at(lo, lo)],
        Edge::Right => vec![at(s, 0.0), at(s, s), at(hi, hi), at(hi, lo)],
        Edge::Bottom => vec![at(s, s), at(0.0, s), at(lo, hi), at(hi, hi)],
        Edge::Left => vec![at(0.0, s), at(0.0, 0.0), at(lo, lo), at(lo, hi)],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::GridConfig;

    fn tooth(code: u32) -> ToothNumber {
        ToothNumber::new(code).unwrap()
    }

    fn point_in(grid: &ChartGrid, code: u32, u: f32, v: f32) -> Vec2 {
        let b = grid.tooth_box(tooth(code)).unwrap();
        b.origin + Vec2::new(u, v) * b.size
    }

    #[test]
    fn test_center_is_occlusal() {
        let grid = ChartGrid::new(GridConfig::default(), false);
        let hit = hit_test(&grid, point_in(&grid, 16, 0.5, 0.5)).unwrap();
        assert_eq!(hit.tooth, tooth(16));
        assert_eq!(hit.surface, Surface::Occlusal);
    }

    #[test]
    fn test_vestibular_faces_outside_of_chart() {
        let grid = ChartGrid::new(GridConfig::default(), false);
        let upper = hit_test(&grid, point_in(&grid, 16, 0.5, 0.05)).unwrap();
        assert_eq!(upper.surface, Surface::Vestibular);
        let lower = hit_test(&grid, point_in(&grid, 46, 0.5, 0.95)).unwrap();
        assert_eq!(lower.surface, Surface::Vestibular);
        let lower_top = hit_test(&grid, point_in(&grid, 46, 0.5, 0.05)).unwrap();
        assert_eq!(lower_top.surface, Surface::Lingual);
    }

    #[test]
    fn test_mesial_faces_midline() {
        let grid = ChartGrid::new(GridConfig::default(), false);
        let right_side = hit_test(&grid, point_in(&grid, 11, 0.95, 0.5)).unwrap();
        assert_eq!(right_side.surface, Surface::Mesial);
        let left_side = hit_test(&grid, point_in(&grid, 21, 0.05, 0.5)).unwrap();
        assert_eq!(left_side.surface, Surface::Mesial);
        let distal = hit_test(&grid, point_in(&grid, 21, 0.95, 0.5)).unwrap();
        assert_eq!(distal.surface, Surface::Distal);
    }

    #[test]
    fn test_miss_outside_boxes() {
        let grid = ChartGrid::new(GridConfig::default(), false);
        assert!(hit_test(&grid, Vec2::new(-5.0, -5.0)).is_none());
    }

    #[test]
    fn test_polygons_contain_their_hits() {
        let grid = ChartGrid::new(GridConfig::default(), false);
        let b = grid.tooth_box(tooth(36)).unwrap();
        for surface in Surface::ALL {
            let polygon = surface_polygon(b, surface);
            let centroid = polygon.iter().copied().sum::<Vec2>() / polygon.len() as f32;
            assert_eq!(surface_in_box(b, centroid), Some(surface));
        }
    }
}

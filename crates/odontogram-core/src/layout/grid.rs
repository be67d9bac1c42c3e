//! Flat 2D clinical chart layout.
//!
//! Four rows of square tooth boxes (upper permanent, upper primary, lower
//! primary, lower permanent), each split at the midline by `midline_gap`.
//! Primary rows are omitted when the primary dentition is hidden and are
//! centered under the permanent rows otherwise.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::taxonomy::{chart_row, Dentition, Jaw, Side, ToothNumber};

/// 2D chart geometry, in screen units (y grows downwards).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub box_size: f32,
    /// Horizontal space between neighbouring boxes
    pub gap: f32,
    /// Extra horizontal space between the two halves of a row
    pub midline_gap: f32,
    /// Vertical space between rows
    pub row_gap: f32,
    pub origin: Vec2,
    /// Radial menu radius
    pub menu_radius: f32,
    /// Radial menu dead zone around the anchor
    pub menu_inner_radius: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            box_size: 40.0,
            gap: 4.0,
            midline_gap: 16.0,
            row_gap: 24.0,
            origin: Vec2::ZERO,
            menu_radius: 90.0,
            menu_inner_radius: 22.0,
        }
    }
}

/// A tooth's clickable box in the 2D chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToothBox {
    pub tooth: ToothNumber,
    /// Top-left corner
    pub origin: Vec2,
    pub size: f32,
}

impl ToothBox {
    pub fn contains(&self, point: Vec2) -> bool {
        let local = point - self.origin;
        local.x >= 0.0 && local.y >= 0.0 && local.x <= self.size && local.y <= self.size
    }

    /// Normalized coordinates of a point inside the box, each in [0, 1].
    pub fn local(&self, point: Vec2) -> Vec2 {
        (point - self.origin) / self.size
    }

    pub fn center(&self) -> Vec2 {
        self.origin + Vec2::splat(self.size * 0.5)
    }
}

/// The laid-out 2D chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartGrid {
    pub config: GridConfig,
    pub show_primary: bool,
    pub boxes: Vec<ToothBox>,
}

impl ChartGrid {
    pub fn new(config: GridConfig, show_primary: bool) -> Self {
        let mut rows = vec![(Jaw::Upper, Dentition::Permanent)];
        if show_primary {
            rows.push((Jaw::Upper, Dentition::Primary));
            rows.push((Jaw::Lower, Dentition::Primary));
        }
        rows.push((Jaw::Lower, Dentition::Permanent));

        let full_width = row_width(&config, 8);
        let mut boxes = Vec::new();
        for (row_index, (jaw, dentition)) in rows.into_iter().enumerate() {
            let teeth = chart_row(jaw, dentition);
            let half = teeth.len() / 2;
            let indent = (full_width - row_width(&config, half)) * 0.5;
            let y = config.origin.y + row_index as f32 * (config.box_size + config.row_gap);

            for (column, tooth) in teeth.into_iter().enumerate() {
                let mut x = config.origin.x + indent + column as f32 * (config.box_size + config.gap);
                if tooth.side() == Side::Left {
                    x += config.midline_gap - config.gap;
                }
                boxes.push(ToothBox {
                    tooth,
                    origin: Vec2::new(x, y),
                    size: config.box_size,
                });
            }
        }

        Self {
            config,
            show_primary,
            boxes,
        }
    }

    pub fn tooth_box(&self, tooth: ToothNumber) -> Option<&ToothBox> {
        self.boxes.iter().find(|b| b.tooth == tooth)
    }

    /// Box under a screen point, if any.
    pub fn box_at(&self, point: Vec2) -> Option<&ToothBox> {
        self.boxes.iter().find(|b| b.contains(point))
    }

    pub fn width(&self) -> f32 {
        row_width(&self.config, 8)
    }
}

/// Width of a full row with `half` teeth on each side of the midline.
fn row_width(config: &GridConfig, half: usize) -> f32 {
    let count = (half * 2) as f32;
    count * config.box_size + (count - 2.0) * config.gap + config.midline_gap
}

//! Revolved cylinder primitive every tooth starts from.
//!
//! The blank lives in a normalized frame: the footprint spans [-1, 1] on x
//! (mesio-distal) and z (labio-lingual, +z labial) and the crown spans
//! [0, 1] on y. Each vertex keeps the parameters it was generated from so
//! deformation passes can work in parameter space regardless of what earlier
//! passes did to the position.

use glam::Vec3;

/// Part of the primitive a vertex belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    /// Lateral wall (rho = 1)
    Side,
    /// Concentric rings of the top (occlusal) cap
    Cap,
    /// Bottom cap center, buried in the gum
    Base,
}

/// Generation parameters of one vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexParam {
    /// Angle around the y axis; 0 points to +x, π/2 to +z (labial)
    pub angle: f32,
    /// Normalized height in [0, 1]
    pub height: f32,
    /// Normalized distance from the axis in [0, 1]
    pub rho: f32,
    pub region: Region,
}

impl VertexParam {
    /// Footprint coordinates (x, z) before any deformation.
    pub fn footprint(&self) -> (f32, f32) {
        (self.rho * self.angle.cos(), self.rho * self.angle.sin())
    }
}

/// A mesh under construction.
#[derive(Debug, Clone)]
pub struct ToothBlank {
    pub positions: Vec<Vec3>,
    pub params: Vec<VertexParam>,
    pub indices: Vec<u32>,
}

impl ToothBlank {
    /// Build the revolved cylinder.
    ///
    /// `radial` segments around the axis, `height_segments` rings on the wall
    /// and `cap_rings` concentric rings closing the top. The top ring of the
    /// wall is shared with the outer ring of the cap.
    pub fn revolve(radial: u32, height_segments: u32, cap_rings: u32) -> Self {
        let radial = radial.max(3);
        let height_segments = height_segments.max(1);
        let cap_rings = cap_rings.max(1);

        let mut blank = Self {
            positions: Vec::new(),
            params: Vec::new(),
            indices: Vec::new(),
        };

        let step = std::f32::consts::TAU / radial as f32;
        let ring = |blank: &mut Self, height: f32, rho: f32, region: Region| -> u32 {
            let start = blank.positions.len() as u32;
            for i in 0..radial {
                let angle = i as f32 * step;
                blank.push(VertexParam {
                    angle,
                    height,
                    rho,
                    region,
                });
            }
            start
        };

        let mut rings = Vec::with_capacity((height_segments + cap_rings) as usize);
        for j in 0..=height_segments {
            let h = j as f32 / height_segments as f32;
            rings.push(ring(&mut blank, h, 1.0, Region::Side));
        }
        for k in 1..cap_rings {
            let rho = 1.0 - k as f32 / cap_rings as f32;
            rings.push(ring(&mut blank, 1.0, rho, Region::Cap));
        }

        // Wall quads plus cap rings, all wound counter-clockwise seen from outside.
        for pair in rings.windows(2) {
            let (lower, upper) = (pair[0], pair[1]);
            for i in 0..radial {
                let next = (i + 1) % radial;
                let a = lower + i;
                let b = lower + next;
                let c = upper + next;
                let d = upper + i;
                blank.indices.extend_from_slice(&[a, d, c, a, c, b]);
            }
        }

        let top_ring = *rings.last().unwrap_or(&0);
        let top = blank.push(VertexParam {
            angle: 0.0,
            height: 1.0,
            rho: 0.0,
            region: Region::Cap,
        });
        for i in 0..radial {
            let next = (i + 1) % radial;
            blank
                .indices
                .extend_from_slice(&[top_ring + i, top, top_ring + next]);
        }

        let bottom = blank.push(VertexParam {
            angle: 0.0,
            height: 0.0,
            rho: 0.0,
            region: Region::Base,
        });
        for i in 0..radial {
            let next = (i + 1) % radial;
            blank.indices.extend_from_slice(&[bottom, i, next]);
        }

        blank
    }

    fn push(&mut self, param: VertexParam) -> u32 {
        let index = self.positions.len() as u32;
        let (x, z) = param.footprint();
        self.positions.push(Vec3::new(x, param.height, z));
        self.params.push(param);
        index
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }
}

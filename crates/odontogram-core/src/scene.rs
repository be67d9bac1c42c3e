//! 3D chart scene assembly.
//!
//! Combines the arch layout, cached tooth meshes and per-surface materials
//! into everything a renderer needs for the visible tooth set. The renderer
//! itself lives outside this crate.

use std::sync::Arc;

use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::chart::ToothStates;
use crate::config::ChartConfig;
use crate::layout::{layout_arch, visible_teeth, ArchPosition, GumLine};
use crate::mesh::{GingivaMesh, MeshCache, MeshRequest, MeshResult, ToothMesh};
use crate::models::{Condition, Surface, ToothCondition, ToothState};
use crate::taxonomy::{Side, ToothNumber};

/// Render parameters for one surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceMaterial {
    /// Linear RGB
    pub color: [f32; 3],
    pub opacity: f32,
}

pub const ENAMEL: [f32; 3] = [0.95, 0.93, 0.87];
pub const CARIES: [f32; 3] = [0.86, 0.16, 0.14];
pub const RESTORED: [f32; 3] = [0.18, 0.42, 0.92];
pub const COMPLETED: [f32; 3] = [0.16, 0.68, 0.32];
pub const GINGIVA: [f32; 3] = [0.86, 0.45, 0.47];

/// Opacity of extracted teeth.
pub const GHOST_OPACITY: f32 = 0.2;

impl SurfaceMaterial {
    pub fn for_condition(condition: Condition) -> Self {
        let color = match condition {
            Condition::Healthy => ENAMEL,
            Condition::Caries => CARIES,
            Condition::Restored => RESTORED,
            Condition::Completed => COMPLETED,
        };
        Self {
            color,
            opacity: 1.0,
        }
    }

    pub fn gingiva() -> Self {
        Self {
            color: GINGIVA,
            opacity: 1.0,
        }
    }

    /// Materials of all five surfaces, indexed by [`Surface::index`].
    pub fn for_state(state: &ToothState) -> [SurfaceMaterial; 5] {
        let mut materials = [Self::for_condition(Condition::Healthy); 5];
        for (surface, condition) in state.surfaces() {
            materials[surface.index()] = Self::for_condition(condition);
        }
        if state.tooth_condition() == Some(ToothCondition::Extracted) {
            for material in &mut materials {
                material.opacity = GHOST_OPACITY;
            }
        }
        materials
    }
}

/// One placed tooth.
#[derive(Debug, Clone)]
pub struct SceneTooth {
    pub position: ArchPosition,
    /// Local mesh frame to world
    pub transform: Mat4,
    pub mesh: Arc<ToothMesh>,
    pub state: ToothState,
    pub materials: [SurfaceMaterial; 5],
}

impl SceneTooth {
    pub fn tooth(&self) -> ToothNumber {
        self.position.tooth
    }

    pub fn material(&self, surface: Surface) -> SurfaceMaterial {
        self.materials[surface.index()]
    }

    /// Clinical surface of a mesh vertex tag. Meshes are generated with
    /// mesial on local -x, which faces the midline only for left-side teeth.
    pub fn resolve_surface(&self, tag: Surface) -> Surface {
        match (self.position.tooth.side(), tag) {
            (Side::Right, Surface::Mesial) => Surface::Distal,
            (Side::Right, Surface::Distal) => Surface::Mesial,
            _ => tag,
        }
    }

    /// Per-vertex RGBA following each vertex's surface condition.
    pub fn vertex_colors(&self) -> Vec<[f32; 4]> {
        self.mesh
            .surfaces
            .iter()
            .map(|&tag| {
                let m = self.material(self.resolve_surface(tag));
                [m.color[0], m.color[1], m.color[2], m.opacity]
            })
            .collect()
    }

    /// Mesh in world space.
    pub fn world_mesh(&self) -> ToothMesh {
        self.mesh.transformed(&self.transform)
    }
}

/// Everything visible in the 3D chart.
#[derive(Debug, Clone, Default)]
pub struct ChartScene {
    pub teeth: Vec<SceneTooth>,
    pub gingiva: Vec<GingivaMesh>,
}

impl ChartScene {
    /// Lay out the visible teeth, fetch their meshes and attach materials
    /// from the current chart state.
    pub fn build(
        states: &ToothStates,
        config: &ChartConfig,
        show_primary: bool,
        cache: &mut MeshCache,
    ) -> MeshResult<Self> {
        let visible = visible_teeth(show_primary);
        let layout = layout_arch(&visible, &config.layout, &config.anatomy);

        let requests: Vec<MeshRequest> = layout
            .positions
            .iter()
            .map(|p| MeshRequest {
                kind: p.kind,
                dimensions: config.anatomy.for_tooth(p.tooth),
                seed: p.tooth.code(),
            })
            .collect();
        let meshes = cache.get_many(&requests)?;

        let teeth: Vec<SceneTooth> = layout
            .positions
            .iter()
            .zip(meshes)
            .map(|(position, mesh)| {
                let state = states.get(position.tooth);
                SceneTooth {
                    position: *position,
                    transform: placement(position),
                    mesh,
                    state,
                    materials: SurfaceMaterial::for_state(&state),
                }
            })
            .collect();

        let gingiva = GumLine::for_layout(&layout, &config.layout)
            .iter()
            .map(|line| GingivaMesh::from_gum_line(line, &config.layout, &config.mesh))
            .collect();

        debug!(teeth = teeth.len(), show_primary, "chart scene built");
        Ok(Self { teeth, gingiva })
    }

    pub fn tooth(&self, tooth: ToothNumber) -> Option<&SceneTooth> {
        self.teeth.iter().find(|t| t.tooth() == tooth)
    }

    /// Refresh materials after a state change without touching geometry.
    pub fn refresh(&mut self, states: &ToothStates) {
        for tooth in &mut self.teeth {
            tooth.state = states.get(tooth.tooth());
            tooth.materials = SurfaceMaterial::for_state(&tooth.state);
        }
    }
}

/// World transform of a tooth: crown pointing away from its gum plane,
/// labial face turned to the arch normal.
pub fn placement(position: &ArchPosition) -> Mat4 {
    Mat4::from_scale_rotation_translation(
        Vec3::new(1.0, position.jaw.crown_direction(), 1.0),
        Quat::from_rotation_y(position.yaw),
        position.anchor,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::MeshConfig;

    fn tooth(code: u32) -> ToothNumber {
        ToothNumber::new(code).unwrap()
    }

    fn small_config() -> ChartConfig {
        ChartConfig {
            mesh: MeshConfig {
                radial_segments: 12,
                height_segments: 4,
                cap_rings: 3,
                ..MeshConfig::default()
            },
            ..ChartConfig::default()
        }
    }

    #[test]
    fn test_scene_colors_follow_state() {
        let config = small_config();
        let mut cache = MeshCache::new(config.mesh.clone());
        let mut states = ToothStates::new();
        states.set_surface(tooth(16), Surface::Occlusal, Condition::Caries);

        let scene = ChartScene::build(&states, &config, false, &mut cache).unwrap();
        assert_eq!(scene.teeth.len(), 32);
        assert_eq!(scene.gingiva.len(), 2);
        let molar = scene.tooth(tooth(16)).unwrap();
        assert_eq!(molar.material(Surface::Occlusal).color, CARIES);
        assert_eq!(molar.material(Surface::Mesial).color, ENAMEL);
        assert!(molar.vertex_colors().iter().any(|c| c[..3] == CARIES));
    }

    #[test]
    fn test_primary_toggle() {
        let config = small_config();
        let mut cache = MeshCache::new(config.mesh.clone());
        let states = ToothStates::new();
        let scene = ChartScene::build(&states, &config, true, &mut cache).unwrap();
        assert_eq!(scene.teeth.len(), 52);
        assert_eq!(scene.gingiva.len(), 4);
        assert!(scene.tooth(tooth(75)).is_some());
    }

    #[test]
    fn test_extracted_is_ghosted() {
        let mut states = ToothStates::new();
        states.set_tooth_condition(tooth(36), ToothCondition::Extracted);
        let materials = SurfaceMaterial::for_state(&states.get(tooth(36)));
        assert!(materials.iter().all(|m| m.opacity == GHOST_OPACITY));
    }

    #[test]
    fn test_upper_crowns_point_down() {
        let config = small_config();
        let mut cache = MeshCache::new(config.mesh.clone());
        let scene = ChartScene::build(&ToothStates::new(), &config, false, &mut cache).unwrap();
        let upper = scene.tooth(tooth(11)).unwrap().world_mesh();
        let lower = scene.tooth(tooth(41)).unwrap().world_mesh();
        let anchor_upper = scene.tooth(tooth(11)).unwrap().position.anchor.y;
        let anchor_lower = scene.tooth(tooth(41)).unwrap().position.anchor.y;
        assert!(upper.bounds().0.y < anchor_upper - 1.0);
        assert!(lower.bounds().1.y > anchor_lower + 1.0);
    }

    #[test]
    fn test_mesial_faces_midline() {
        let config = small_config();
        let mut cache = MeshCache::new(config.mesh.clone());
        let scene = ChartScene::build(&ToothStates::new(), &config, false, &mut cache).unwrap();
        for code in [14, 24] {
            let placed = scene.tooth(tooth(code)).unwrap();
            let world = placed.world_mesh();
            let (sum, count) = world
                .positions
                .iter()
                .zip(&placed.mesh.surfaces)
                .filter(|(_, tag)| placed.resolve_surface(**tag) == Surface::Mesial)
                .fold((0.0, 0), |(s, n), (p, _)| (s + p[0], n + 1));
            let mesial_x = sum / count as f32;
            // mesial side is closer to the midline (x = 0) than the anchor
            assert!(mesial_x.abs() < placed.position.anchor.x.abs());
        }
    }
}

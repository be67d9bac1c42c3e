//! Chart configuration.
//!
//! All geometry constants live here and can be loaded from a JSON file.
//! Missing sections or fields fall back to their defaults.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::anatomy::{AnatomyConfig, ToothDimensions};
use crate::layout::{ArchDimensions, GridConfig, LayoutConfig};
use crate::mesh::MeshConfig;
use crate::taxonomy::ToothKind;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid config value for {field}: {reason}")]
    Invalid { field: String, reason: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Complete engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub anatomy: AnatomyConfig,
    pub layout: LayoutConfig,
    pub mesh: MeshConfig,
    pub grid: GridConfig,
}

impl ChartConfig {
    /// Parse and validate a JSON config.
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let config: ChartConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn to_json(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the geometry cannot work with.
    pub fn validate(&self) -> ConfigResult<()> {
        for kind in ToothKind::ALL {
            check_dimensions(kind.as_str(), &self.anatomy.for_kind(kind))?;
        }
        let scale = self.anatomy.primary_scale;
        if !(scale > 0.0 && scale < 1.0) {
            return Err(invalid("anatomy.primary_scale", "must be in (0, 1)"));
        }

        check_arch("layout.permanent", &self.layout.permanent)?;
        check_arch("layout.primary", &self.layout.primary)?;
        if self.layout.jaw_gap < 0.0 {
            return Err(invalid("layout.jaw_gap", "must not be negative"));
        }
        if self.layout.gum_samples < 2 {
            return Err(invalid("layout.gum_samples", "must be at least 2"));
        }

        let mesh = &self.mesh;
        if mesh.radial_segments < 3 {
            return Err(invalid("mesh.radial_segments", "must be at least 3"));
        }
        if mesh.height_segments == 0 || mesh.cap_rings == 0 {
            return Err(invalid("mesh.height_segments", "segments must be positive"));
        }
        if !(0.0..=1.0).contains(&mesh.burial_fraction) {
            return Err(invalid("mesh.burial_fraction", "must be in [0, 1]"));
        }

        let grid = &self.grid;
        if grid.box_size <= 0.0 {
            return Err(invalid("grid.box_size", "must be positive"));
        }
        if grid.menu_inner_radius < 0.0 || grid.menu_inner_radius >= grid.menu_radius {
            return Err(invalid(
                "grid.menu_inner_radius",
                "must be non-negative and smaller than grid.menu_radius",
            ));
        }
        Ok(())
    }
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

fn check_dimensions(name: &str, dims: &ToothDimensions) -> ConfigResult<()> {
    if dims.is_valid() {
        Ok(())
    } else {
        Err(invalid(
            &format!("anatomy.{}", name.replace('-', "_")),
            "dimensions must be positive",
        ))
    }
}

fn check_arch(name: &str, arch: &ArchDimensions) -> ConfigResult<()> {
    if arch.radius_x <= 0.0 || arch.radius_z <= 0.0 {
        return Err(invalid(name, "arch radii must be positive"));
    }
    if arch.exponent <= 0.0 {
        return Err(invalid(name, "arch exponent must be positive"));
    }
    if !(arch.angular_span > 0.0 && arch.angular_span < std::f32::consts::PI) {
        return Err(invalid(name, "angular span must be in (0, π)"));
    }
    Ok(())
}

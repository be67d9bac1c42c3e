//! Odontogram Core Library
//!
//! Interactive dental chart engine: FDI tooth taxonomy, anatomical arch
//! layout, procedural tooth meshes and the per-surface condition state
//! machine, with local SQLite persistence.
//!
//! # Architecture
//!
//! ```text
//!   Pointer events ──► InteractionController ──► ChartCommand
//!                       (grid hit test, radial menu)      │
//!                                                         ▼
//!                                                   ChartSession
//!                                          (ToothStates, undo/redo, treatments)
//!                                                         │
//!                           ┌─────────────────────────────┼─────────────────────┐
//!                           │                             │                     │
//!                           ▼                             ▼                     ▼
//!                    ChartScene::build             snapshot() → wire      SaveQueue
//!            layout → MeshCache → materials         ToothRecord JSON   (spawn_blocking)
//!                           │                                                   │
//!                           ▼                                                   ▼
//!                      Renderer (host)                               OdontogramStore
//!                                                                  (SQLite Database)
//! ```
//!
//! # Core Principle
//!
//! **Edits are local and immediate; saves are separate.** A failed save never
//! rolls back chart state, so the user can retry without re-entering data.
//!
//! # Modules
//!
//! - [`taxonomy`]: FDI tooth numbers and their classification
//! - [`models`]: Domain types (Surface, Condition, ToothState, Odontogram, Treatment)
//! - [`wire`]: Backend tooth record format, canonical and legacy serializers
//! - [`chart`]: Condition state machine, commands, undo/redo and chart sessions
//! - [`anatomy`]: Per-kind tooth dimensions
//! - [`layout`]: Dental arch layout, gum line and the 2D chart grid
//! - [`mesh`]: Procedural tooth and gingiva meshes with a memoizing cache
//! - [`scene`]: 3D scene assembly and surface materials
//! - [`interaction`]: Hit testing, radial menu and pointer handling
//! - [`config`]: JSON-loadable engine configuration
//! - [`db`]: SQLite database layer
//! - [`store`]: Persistence collaborator and background saves

pub mod anatomy;
pub mod chart;
pub mod config;
pub mod db;
pub mod interaction;
pub mod layout;
pub mod mesh;
pub mod models;
pub mod scene;
pub mod store;
pub mod taxonomy;
pub mod wire;

// Re-export commonly used types
pub use chart::{ChartCommand, ChartSession, SaveReceipt, SaveRequest, ToothStates};
pub use config::ChartConfig;
pub use db::Database;
pub use models::{
    Condition, Odontogram, Surface, ToothCondition, ToothState, Treatment, TreatmentKind,
};
pub use store::{OdontogramStore, SaveHandle, SaveQueue};
pub use taxonomy::{Dentition, Jaw, ToothKind, ToothNumber};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex};

use mesh::MeshCache;
use scene::{ChartScene, SurfaceMaterial};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum OdontogramError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Geometry error: {0}")]
    GeometryError(String),

    #[error("Save error: {0}")]
    SaveError(String),
}

impl From<db::DbError> for OdontogramError {
    fn from(e: db::DbError) -> Self {
        OdontogramError::DatabaseError(e.to_string())
    }
}

impl From<store::StoreError> for OdontogramError {
    fn from(e: store::StoreError) -> Self {
        match e {
            store::StoreError::NotFound(id) => OdontogramError::NotFound(id),
            store::StoreError::Db(e) => e.into(),
            other => OdontogramError::SaveError(other.to_string()),
        }
    }
}

impl From<taxonomy::TaxonomyError> for OdontogramError {
    fn from(e: taxonomy::TaxonomyError) -> Self {
        OdontogramError::InvalidInput(e.to_string())
    }
}

impl From<wire::WireError> for OdontogramError {
    fn from(e: wire::WireError) -> Self {
        OdontogramError::SerializationError(e.to_string())
    }
}

impl From<config::ConfigError> for OdontogramError {
    fn from(e: config::ConfigError) -> Self {
        OdontogramError::InvalidInput(e.to_string())
    }
}

impl From<mesh::MeshError> for OdontogramError {
    fn from(e: mesh::MeshError) -> Self {
        OdontogramError::GeometryError(e.to_string())
    }
}

impl From<serde_json::Error> for OdontogramError {
    fn from(e: serde_json::Error) -> Self {
        OdontogramError::SerializationError(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for OdontogramError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        OdontogramError::DatabaseError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create a database at the given path.
#[uniffi::export]
pub fn open_database(path: String) -> Result<Arc<OdontogramCore>, OdontogramError> {
    let db = Database::open(&path)?;
    Ok(OdontogramCore::new(db, ChartConfig::default()))
}

/// Open or create a database, with engine configuration given as JSON.
#[uniffi::export]
pub fn open_database_with_config(
    path: String,
    config_json: String,
) -> Result<Arc<OdontogramCore>, OdontogramError> {
    let config = ChartConfig::from_json_str(&config_json)?;
    let db = Database::open(&path)?;
    Ok(OdontogramCore::new(db, config))
}

/// Create an in-memory database (for testing).
#[uniffi::export]
pub fn open_database_in_memory() -> Result<Arc<OdontogramCore>, OdontogramError> {
    let db = Database::open_in_memory()?;
    Ok(OdontogramCore::new(db, ChartConfig::default()))
}

/// Classify a raw tooth code.
#[uniffi::export]
pub fn classify_tooth(number: u32, is_primary: bool) -> Result<FfiToothKind, OdontogramError> {
    Ok(taxonomy::classify(number, is_primary)?.into())
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe engine handle for FFI.
#[derive(uniffi::Object)]
pub struct OdontogramCore {
    db: Arc<Mutex<Database>>,
    config: ChartConfig,
    meshes: Mutex<MeshCache>,
}

impl OdontogramCore {
    fn new(db: Database, config: ChartConfig) -> Arc<Self> {
        Arc::new(Self {
            db: Arc::new(Mutex::new(db)),
            meshes: Mutex::new(MeshCache::new(config.mesh.clone())),
            config,
        })
    }
}

#[uniffi::export]
impl OdontogramCore {
    // =========================================================================
    // Geometry Operations
    // =========================================================================

    /// Place teeth on their arches. Input order is preserved.
    pub fn layout_arch(&self, codes: Vec<u32>) -> Result<Vec<FfiArchPosition>, OdontogramError> {
        let layout = layout::layout_codes(&codes, &self.config.layout, &self.config.anatomy)?;
        Ok(layout.positions.iter().map(FfiArchPosition::from).collect())
    }

    /// Generate (or fetch from cache) the mesh of one tooth, in its local frame.
    pub fn generate_tooth_mesh(
        &self,
        tooth_number: u32,
        seed: u32,
    ) -> Result<FfiToothMesh, OdontogramError> {
        let tooth = ToothNumber::new(tooth_number)?;
        let request = mesh::MeshRequest {
            kind: tooth.kind(),
            dimensions: self.config.anatomy.for_tooth(tooth),
            seed,
        };
        let mesh = self.meshes.lock()?.get(request)?;
        Ok(FfiToothMesh::from(mesh.as_ref()))
    }

    // =========================================================================
    // Chart Operations
    // =========================================================================

    /// Open the patient's chart, or start a new one.
    pub fn open_chart(
        &self,
        patient_id: String,
        doctor_id: String,
    ) -> Result<Arc<ChartHandle>, OdontogramError> {
        let db = self.db.lock()?;
        let session = store::open_session(&*db, &patient_id, &doctor_id)?;
        Ok(Arc::new(ChartHandle {
            session: Mutex::new(session),
            db: Arc::clone(&self.db),
        }))
    }

    /// Most recent treatments for a patient, newest first.
    pub fn treatment_history(
        &self,
        patient_id: String,
        limit: u32,
    ) -> Result<Vec<FfiTreatment>, OdontogramError> {
        let db = self.db.lock()?;
        let treatments = db.get_treatment_history(&patient_id, limit)?;
        Ok(treatments.into_iter().map(|t| t.into()).collect())
    }

    /// Assemble the 3D scene for a chart: world-space meshes with per-vertex colors.
    pub fn build_scene(
        &self,
        chart: Arc<ChartHandle>,
        show_primary: bool,
    ) -> Result<FfiScene, OdontogramError> {
        let states = chart.session.lock()?.states().clone();
        let mut meshes = self.meshes.lock()?;
        let scene = ChartScene::build(&states, &self.config, show_primary, &mut meshes)?;
        Ok(FfiScene::from(&scene))
    }
}

/// An open chart. Edits apply immediately; `save` persists them.
#[derive(uniffi::Object)]
pub struct ChartHandle {
    session: Mutex<ChartSession>,
    db: Arc<Mutex<Database>>,
}

#[uniffi::export]
impl ChartHandle {
    pub fn odontogram_id(&self) -> Result<String, OdontogramError> {
        Ok(self.session.lock()?.id().to_string())
    }

    /// Cycle one surface to its next condition. Returns whether anything changed.
    pub fn cycle(&self, tooth_number: u32, surface: FfiSurface) -> Result<bool, OdontogramError> {
        let tooth = ToothNumber::new(tooth_number)?;
        Ok(self.session.lock()?.cycle(tooth, surface.into()).is_some())
    }

    pub fn set_surface(
        &self,
        tooth_number: u32,
        surface: FfiSurface,
        condition: FfiCondition,
    ) -> Result<bool, OdontogramError> {
        let tooth = ToothNumber::new(tooth_number)?;
        let mut session = self.session.lock()?;
        Ok(session
            .set_surface(tooth, surface.into(), condition.into())
            .is_some())
    }

    pub fn set_tooth(
        &self,
        tooth_number: u32,
        condition: FfiToothCondition,
    ) -> Result<bool, OdontogramError> {
        let tooth = ToothNumber::new(tooth_number)?;
        let mut session = self.session.lock()?;
        Ok(session.set_tooth_condition(tooth, condition.into()).is_some())
    }

    pub fn reset(&self, tooth_number: u32) -> Result<bool, OdontogramError> {
        let tooth = ToothNumber::new(tooth_number)?;
        Ok(self.session.lock()?.reset(tooth).is_some())
    }

    pub fn set_notes(&self, tooth_number: u32, notes: String) -> Result<(), OdontogramError> {
        let tooth = ToothNumber::new(tooth_number)?;
        self.session.lock()?.set_notes(tooth, notes);
        Ok(())
    }

    pub fn undo(&self) -> Result<bool, OdontogramError> {
        Ok(self.session.lock()?.undo().is_some())
    }

    pub fn redo(&self) -> Result<bool, OdontogramError> {
        Ok(self.session.lock()?.redo().is_some())
    }

    pub fn is_dirty(&self) -> Result<bool, OdontogramError> {
        Ok(self.session.lock()?.is_dirty())
    }

    /// Persist the chart. On failure local edits are kept for a retry.
    pub fn save(&self) -> Result<FfiSaveReceipt, OdontogramError> {
        let request = self.session.lock()?.snapshot();
        let receipt = {
            let db = self.db.lock()?;
            store::persist(&*db, &request)?
        };
        self.session.lock()?.mark_saved(&receipt);
        Ok(receipt.into())
    }

    /// Current state of one tooth.
    pub fn tooth_state(&self, tooth_number: u32) -> Result<FfiToothState, OdontogramError> {
        let tooth = ToothNumber::new(tooth_number)?;
        let state = self.session.lock()?.state(tooth);
        Ok(FfiToothState::new(tooth, &state))
    }

    /// States of every tooth that differs from the default.
    pub fn states(&self) -> Result<Vec<FfiToothState>, OdontogramError> {
        let session = self.session.lock()?;
        Ok(session
            .states()
            .iter()
            .map(|(tooth, state)| FfiToothState::new(tooth, state))
            .collect())
    }

    /// Current tooth records in the backend wire format, as JSON.
    pub fn records_json(&self) -> Result<String, OdontogramError> {
        let request = self.session.lock()?.snapshot();
        Ok(serde_json::to_string(&request.odontogram.teeth)?)
    }
}

// =========================================================================
// FFI Types
// =========================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum FfiToothKind {
    CentralIncisor,
    LateralIncisor,
    Canine,
    Premolar,
    Molar,
}

impl From<ToothKind> for FfiToothKind {
    fn from(kind: ToothKind) -> Self {
        match kind {
            ToothKind::CentralIncisor => FfiToothKind::CentralIncisor,
            ToothKind::LateralIncisor => FfiToothKind::LateralIncisor,
            ToothKind::Canine => FfiToothKind::Canine,
            ToothKind::Premolar => FfiToothKind::Premolar,
            ToothKind::Molar => FfiToothKind::Molar,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum FfiSurface {
    Occlusal,
    Vestibular,
    Lingual,
    Mesial,
    Distal,
}

impl From<FfiSurface> for Surface {
    fn from(surface: FfiSurface) -> Self {
        match surface {
            FfiSurface::Occlusal => Surface::Occlusal,
            FfiSurface::Vestibular => Surface::Vestibular,
            FfiSurface::Lingual => Surface::Lingual,
            FfiSurface::Mesial => Surface::Mesial,
            FfiSurface::Distal => Surface::Distal,
        }
    }
}

impl From<Surface> for FfiSurface {
    fn from(surface: Surface) -> Self {
        match surface {
            Surface::Occlusal => FfiSurface::Occlusal,
            Surface::Vestibular => FfiSurface::Vestibular,
            Surface::Lingual => FfiSurface::Lingual,
            Surface::Mesial => FfiSurface::Mesial,
            Surface::Distal => FfiSurface::Distal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum FfiCondition {
    Healthy,
    Caries,
    Restored,
    Completed,
}

impl From<FfiCondition> for Condition {
    fn from(condition: FfiCondition) -> Self {
        match condition {
            FfiCondition::Healthy => Condition::Healthy,
            FfiCondition::Caries => Condition::Caries,
            FfiCondition::Restored => Condition::Restored,
            FfiCondition::Completed => Condition::Completed,
        }
    }
}

impl From<Condition> for FfiCondition {
    fn from(condition: Condition) -> Self {
        match condition {
            Condition::Healthy => FfiCondition::Healthy,
            Condition::Caries => FfiCondition::Caries,
            Condition::Restored => FfiCondition::Restored,
            Condition::Completed => FfiCondition::Completed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum FfiToothCondition {
    Healthy,
    Extracted,
}

impl From<FfiToothCondition> for ToothCondition {
    fn from(condition: FfiToothCondition) -> Self {
        match condition {
            FfiToothCondition::Healthy => ToothCondition::Healthy,
            FfiToothCondition::Extracted => ToothCondition::Extracted,
        }
    }
}

impl From<ToothCondition> for FfiToothCondition {
    fn from(condition: ToothCondition) -> Self {
        match condition {
            ToothCondition::Healthy => FfiToothCondition::Healthy,
            ToothCondition::Extracted => FfiToothCondition::Extracted,
        }
    }
}

/// FFI-safe tooth state.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiToothState {
    pub tooth_number: u32,
    /// Indexed O, V, L, M, D
    pub surfaces: Vec<FfiCondition>,
    pub tooth_condition: Option<FfiToothCondition>,
    pub is_present: bool,
}

impl FfiToothState {
    fn new(tooth: ToothNumber, state: &ToothState) -> Self {
        Self {
            tooth_number: tooth.code(),
            surfaces: state.surfaces().map(|(_, c)| c.into()).collect(),
            tooth_condition: state.tooth_condition().map(|c| c.into()),
            is_present: state.is_present(),
        }
    }
}

/// FFI-safe arch placement.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiArchPosition {
    pub tooth_number: u32,
    pub kind: FfiToothKind,
    pub theta: f32,
    pub anchor: Vec<f32>,
    pub yaw: f32,
    pub width: f32,
}

impl From<&layout::ArchPosition> for FfiArchPosition {
    fn from(position: &layout::ArchPosition) -> Self {
        Self {
            tooth_number: position.tooth.code(),
            kind: position.kind.into(),
            theta: position.theta,
            anchor: position.anchor.to_array().to_vec(),
            yaw: position.yaw,
            width: position.width,
        }
    }
}

/// FFI-safe mesh buffers; positions and normals are flattened xyz triples.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiToothMesh {
    pub positions: Vec<f32>,
    pub normals: Vec<f32>,
    pub indices: Vec<u32>,
    pub surfaces: Vec<FfiSurface>,
    pub fingerprint: String,
}

impl From<&mesh::ToothMesh> for FfiToothMesh {
    fn from(mesh: &mesh::ToothMesh) -> Self {
        Self {
            positions: mesh.positions.iter().flatten().copied().collect(),
            normals: mesh.normals.iter().flatten().copied().collect(),
            indices: mesh.indices.clone(),
            surfaces: mesh.surfaces.iter().map(|&s| s.into()).collect(),
            fingerprint: mesh.fingerprint(),
        }
    }
}

/// FFI-safe colored mesh in world space; colors are flattened rgba.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiColoredMesh {
    pub tooth_number: Option<u32>,
    pub positions: Vec<f32>,
    pub normals: Vec<f32>,
    pub indices: Vec<u32>,
    pub colors: Vec<f32>,
}

/// FFI-safe scene.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiScene {
    pub teeth: Vec<FfiColoredMesh>,
    pub gingiva: Vec<FfiColoredMesh>,
}

impl From<&ChartScene> for FfiScene {
    fn from(scene: &ChartScene) -> Self {
        let teeth = scene
            .teeth
            .iter()
            .map(|tooth| {
                let world = tooth.world_mesh();
                FfiColoredMesh {
                    tooth_number: Some(tooth.tooth().code()),
                    positions: world.positions.iter().flatten().copied().collect(),
                    normals: world.normals.iter().flatten().copied().collect(),
                    indices: world.indices,
                    colors: tooth.vertex_colors().iter().flatten().copied().collect(),
                }
            })
            .collect();

        let gum = SurfaceMaterial::gingiva();
        let gingiva = scene
            .gingiva
            .iter()
            .map(|g| FfiColoredMesh {
                tooth_number: None,
                positions: g.positions.iter().flatten().copied().collect(),
                normals: g.normals.iter().flatten().copied().collect(),
                indices: g.indices.clone(),
                colors: g
                    .positions
                    .iter()
                    .flat_map(|_| [gum.color[0], gum.color[1], gum.color[2], gum.opacity])
                    .collect(),
            })
            .collect();

        Self { teeth, gingiva }
    }
}

/// FFI-safe treatment entry.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiTreatment {
    pub id: String,
    pub odontogram_id: String,
    pub kind: String,
    pub tooth_number: u32,
    pub surface: Option<FfiSurface>,
    pub before: FfiToothState,
    pub after: FfiToothState,
    pub performed_at: String,
}

impl From<Treatment> for FfiTreatment {
    fn from(t: Treatment) -> Self {
        Self {
            before: FfiToothState::new(t.tooth_number, &t.before),
            after: FfiToothState::new(t.tooth_number, &t.after),
            id: t.id,
            odontogram_id: t.odontogram_id,
            kind: t.kind.as_str().to_string(),
            tooth_number: t.tooth_number.code(),
            surface: t.surface.map(|s| s.into()),
            performed_at: t.performed_at,
        }
    }
}

/// FFI-safe save acknowledgement.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiSaveReceipt {
    pub odontogram_id: String,
    pub revision: u64,
    pub treatments_saved: u32,
}

impl From<SaveReceipt> for FfiSaveReceipt {
    fn from(receipt: SaveReceipt) -> Self {
        Self {
            odontogram_id: receipt.odontogram_id,
            revision: receipt.revision,
            treatments_saved: receipt.treatments_saved as u32,
        }
    }
}

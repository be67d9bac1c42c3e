//! End-to-end chart tests: edit, save, reload, render.

use std::sync::{Arc, Mutex};

use odontogram_core::chart::ChartSession;
use odontogram_core::config::ChartConfig;
use odontogram_core::db::Database;
use odontogram_core::interaction::{InteractionController, PointerEvent};
use odontogram_core::mesh::MeshCache;
use odontogram_core::models::{Condition, Surface, ToothCondition};
use odontogram_core::scene::{ChartScene, CARIES, ENAMEL, GHOST_OPACITY};
use odontogram_core::store::{self, OdontogramStore, SaveQueue, StoreError};
use odontogram_core::taxonomy::ToothNumber;
use odontogram_core::wire::LegacySerializer;

fn tooth(code: u32) -> ToothNumber {
    ToothNumber::new(code).unwrap()
}

#[test]
fn test_caries_survives_save_and_reload() {
    let db = Database::open_in_memory().unwrap();
    let mut session = store::open_session(&db, "pat_1", "doc_1").unwrap();

    let applied = session.cycle(tooth(16), Surface::Occlusal).unwrap();
    assert_eq!(applied.after.surface(Surface::Occlusal), Condition::Caries);

    let receipt = store::persist(&db, &session.snapshot()).unwrap();
    session.mark_saved(&receipt);

    let stored = db.get_by_patient_id("pat_1").unwrap().unwrap();
    let record = stored.tooth(tooth(16)).unwrap();
    let occlusal = record
        .surfaces
        .iter()
        .find(|s| s.surface == "oclusal")
        .unwrap();
    assert_eq!(occlusal.condition, "caries");
    assert_eq!(record.surfaces.len(), 5);

    let reopened = store::open_session(&db, "pat_1", "doc_1").unwrap();
    assert_eq!(
        reopened.state(tooth(16)).surface(Surface::Occlusal),
        Condition::Caries
    );

    let config = ChartConfig::default();
    let mut cache = MeshCache::new(config.mesh.clone());
    let scene = ChartScene::build(reopened.states(), &config, false, &mut cache).unwrap();
    let placed = scene.tooth(tooth(16)).unwrap();
    assert_eq!(placed.material(Surface::Occlusal).color, CARIES);
    assert_eq!(placed.material(Surface::Vestibular).color, ENAMEL);
}

#[test]
fn test_extracted_tooth_round_trip() {
    let db = Database::open_in_memory().unwrap();
    let mut session = store::open_session(&db, "pat_1", "doc_1").unwrap();
    session.set_surface(tooth(46), Surface::Distal, Condition::Caries);
    session.set_tooth_condition(tooth(46), ToothCondition::Extracted);
    store::persist(&db, &session.snapshot()).unwrap();

    let stored = db.get_by_patient_id("pat_1").unwrap().unwrap();
    let record = stored.tooth(tooth(46)).unwrap();
    assert!(!record.is_present);
    assert!(record.surfaces.is_empty());

    let reopened = store::open_session(&db, "pat_1", "doc_1").unwrap();
    let state = reopened.state(tooth(46));
    assert_eq!(state.tooth_condition(), Some(ToothCondition::Extracted));
    assert_eq!(state.surface(Surface::Distal), Condition::Healthy);

    let config = ChartConfig::default();
    let mut cache = MeshCache::new(config.mesh.clone());
    let scene = ChartScene::build(reopened.states(), &config, false, &mut cache).unwrap();
    let placed = scene.tooth(tooth(46)).unwrap();
    assert_eq!(placed.material(Surface::Occlusal).opacity, GHOST_OPACITY);
}

#[test]
fn test_legacy_serializer_drops_healthy_surfaces() {
    let db = Database::open_in_memory().unwrap();
    let mut session =
        ChartSession::new("pat_1".into(), "doc_1".into()).with_serializer(Box::new(LegacySerializer));
    session.set_surface(tooth(24), Surface::Mesial, Condition::Completed);
    store::persist(&db, &session.snapshot()).unwrap();

    let stored = db.get_by_patient_id("pat_1").unwrap().unwrap();
    let record = stored.tooth(tooth(24)).unwrap();
    assert_eq!(record.surfaces.len(), 1);
    assert_eq!(record.surfaces[0].surface, "mesial");
    assert_eq!(record.surfaces[0].condition, "filled");

    let reopened = store::open_session(&db, "pat_1", "doc_1").unwrap();
    assert_eq!(
        reopened.state(tooth(24)).surface(Surface::Mesial),
        Condition::Restored
    );
}

#[test]
fn test_undo_is_logged_and_persisted() {
    let db = Database::open_in_memory().unwrap();
    let mut session = store::open_session(&db, "pat_1", "doc_1").unwrap();
    session.cycle(tooth(11), Surface::Vestibular);
    session.cycle(tooth(11), Surface::Vestibular);
    session.undo();
    assert_eq!(
        session.state(tooth(11)).surface(Surface::Vestibular),
        Condition::Caries
    );

    store::persist(&db, &session.snapshot()).unwrap();
    let history = db.get_treatment_history("pat_1", 10).unwrap();
    assert_eq!(history.len(), 3);
    // newest first: the undo restores caries
    assert_eq!(history[0].condition_after(), Some(Condition::Caries));
}

#[test]
fn test_clicks_drive_the_saved_chart() {
    let db = Database::open_in_memory().unwrap();
    let config = ChartConfig::default();
    let mut session = store::open_session(&db, "pat_1", "doc_1").unwrap();
    let mut controller = InteractionController::new(config.grid.clone(), false);

    let center = controller.grid().tooth_box(tooth(36)).unwrap().center();
    controller.apply(&mut session, PointerEvent::primary(center.x, center.y));
    store::persist(&db, &session.snapshot()).unwrap();

    let reopened = store::open_session(&db, "pat_1", "doc_1").unwrap();
    assert_eq!(
        reopened.state(tooth(36)).surface(Surface::Occlusal),
        Condition::Caries
    );
}

#[test]
fn test_file_database_persists_across_opens() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("charts.db");

    let chart_id = {
        let db = Database::open(&path).unwrap();
        let mut session = store::open_session(&db, "pat_1", "doc_1").unwrap();
        session.set_surface(tooth(55), Surface::Lingual, Condition::Caries);
        store::persist(&db, &session.snapshot()).unwrap();
        session.id().to_string()
    };

    let db = Database::open(&path).unwrap();
    let stored = db.get_by_id(&chart_id).unwrap().unwrap();
    assert_eq!(stored.patient_id, "pat_1");
    assert!(stored.tooth(tooth(55)).is_some());
}

#[tokio::test]
async fn test_background_save_then_edit_keeps_dirty() {
    let db = Database::open_in_memory().unwrap();
    let queue = SaveQueue::current(Arc::new(Mutex::new(db))).unwrap();

    let mut session = ChartSession::new("pat_1".into(), "doc_1".into());
    session.cycle(tooth(16), Surface::Occlusal);
    let handle = queue.submit(session.snapshot());

    // edit while the save is in flight
    session.cycle(tooth(17), Surface::Occlusal);

    let receipt = handle.outcome().await.unwrap();
    session.mark_saved(&receipt);
    assert!(session.is_dirty());
    assert_eq!(session.pending_treatments().len(), 1);

    let receipt = queue.submit(session.snapshot()).outcome().await.unwrap();
    session.mark_saved(&receipt);
    assert!(!session.is_dirty());
}

#[tokio::test]
async fn test_cancelled_save_writes_nothing() {
    let db = Database::open_in_memory().unwrap();
    let queue = SaveQueue::current(Arc::new(Mutex::new(db))).unwrap();
    let mut session = ChartSession::new("pat_1".into(), "doc_1".into());
    session.cycle(tooth(16), Surface::Occlusal);

    let handle = {
        let _held = queue.store().lock().unwrap();
        let handle = queue.submit(session.snapshot());
        handle.cancel();
        handle
    };

    assert!(matches!(handle.outcome().await, Err(StoreError::Cancelled)));
    assert!(session.is_dirty());
    let db = queue.store().lock().unwrap();
    assert!(db.get_by_patient_id("pat_1").unwrap().is_none());
}

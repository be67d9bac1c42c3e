//! Persistence collaborator for odontograms.
//!
//! [`OdontogramStore`] is the contract the chart core saves through. The
//! SQLite [`Database`] implements it; hosts syncing to a backend can supply
//! their own. Saves run off the interaction thread through [`SaveQueue`].

mod queue;

pub use queue::*;

use thiserror::Error;
use tracing::{debug, info};

use crate::chart::{ChartSession, SaveReceipt, SaveRequest};
use crate::db::{Database, DbError};
use crate::models::{Odontogram, Treatment};
use crate::taxonomy::ToothNumber;
use crate::wire::{SurfaceRecord, ToothRecord};

/// Store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Db(#[from] DbError),

    #[error("Odontogram not found: {0}")]
    NotFound(String),

    #[error("Save cancelled")]
    Cancelled,

    #[error("Store lock poisoned: {0}")]
    Lock(String),

    #[error("Save task failed: {0}")]
    Join(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Operations the chart core needs from whatever persists odontograms.
///
/// Callers assume nothing stronger than last-write-wins per odontogram.
pub trait OdontogramStore: Send {
    /// Store a new chart. Fails if the patient already has one.
    fn create(&self, odontogram: &Odontogram) -> StoreResult<()>;

    fn get_by_patient_id(&self, patient_id: &str) -> StoreResult<Option<Odontogram>>;

    fn get_by_id(&self, id: &str) -> StoreResult<Option<Odontogram>>;

    /// Replace a stored chart's header and tooth records.
    fn update(&self, odontogram: &Odontogram) -> StoreResult<()>;

    /// Append a treatment to a chart's history.
    fn add_treatment(&self, odontogram_id: &str, treatment: &Treatment) -> StoreResult<()>;

    /// Replace the surfaces recorded for one tooth. Non-empty surfaces clear
    /// an extraction.
    fn update_tooth_condition(
        &self,
        odontogram_id: &str,
        tooth: ToothNumber,
        surfaces: Vec<SurfaceRecord>,
    ) -> StoreResult<()>;

    /// Most recent treatments for a patient, newest first.
    fn get_treatment_history(&self, patient_id: &str, limit: u32) -> StoreResult<Vec<Treatment>>;
}

impl OdontogramStore for Database {
    fn create(&self, odontogram: &Odontogram) -> StoreResult<()> {
        self.insert_odontogram(odontogram)?;
        Ok(())
    }

    fn get_by_patient_id(&self, patient_id: &str) -> StoreResult<Option<Odontogram>> {
        Ok(self.get_odontogram_by_patient(patient_id)?)
    }

    fn get_by_id(&self, id: &str) -> StoreResult<Option<Odontogram>> {
        Ok(self.get_odontogram(id)?)
    }

    fn update(&self, odontogram: &Odontogram) -> StoreResult<()> {
        if !self.update_odontogram(odontogram)? {
            return Err(StoreError::NotFound(odontogram.id.clone()));
        }
        Ok(())
    }

    fn add_treatment(&self, odontogram_id: &str, treatment: &Treatment) -> StoreResult<()> {
        if treatment.odontogram_id == odontogram_id {
            self.insert_treatment(treatment)?;
        } else {
            let mut treatment = treatment.clone();
            treatment.odontogram_id = odontogram_id.to_string();
            self.insert_treatment(&treatment)?;
        }
        Ok(())
    }

    fn update_tooth_condition(
        &self,
        odontogram_id: &str,
        tooth: ToothNumber,
        surfaces: Vec<SurfaceRecord>,
    ) -> StoreResult<()> {
        let existing = self
            .list_tooth_records(odontogram_id)?
            .into_iter()
            .find(|r| r.tooth_number == tooth);
        let mut record = existing.unwrap_or_else(|| ToothRecord {
            tooth_number: tooth,
            is_present: true,
            surfaces: Vec::new(),
            general_notes: String::new(),
            last_updated: None,
        });
        // charted surfaces mean the tooth is there again
        if !surfaces.is_empty() {
            record.is_present = true;
        }
        record.surfaces = surfaces;
        record.last_updated = Some(chrono::Utc::now().to_rfc3339());

        match self.upsert_tooth_record(odontogram_id, &record) {
            Err(DbError::NotFound(_)) => Err(StoreError::NotFound(odontogram_id.to_string())),
            other => Ok(other?),
        }
    }

    fn get_treatment_history(&self, patient_id: &str, limit: u32) -> StoreResult<Vec<Treatment>> {
        Ok(self.list_treatments_for_patient(patient_id, limit)?)
    }
}

/// Write a session snapshot: create or update the chart, then append its
/// pending treatments.
///
/// A retried save after a partial failure is safe: an already created chart
/// is updated instead, and treatments already stored are skipped.
pub fn persist<S: OdontogramStore + ?Sized>(
    store: &S,
    request: &SaveRequest,
) -> StoreResult<SaveReceipt> {
    let odontogram = &request.odontogram;
    info!(
        odontogram = %odontogram.id,
        revision = request.revision,
        treatments = request.treatments.len(),
        "saving chart"
    );

    if request.is_new && store.get_by_id(&odontogram.id)?.is_none() {
        store.create(odontogram)?;
    } else {
        store.update(odontogram)?;
    }

    for treatment in &request.treatments {
        store.add_treatment(&odontogram.id, treatment)?;
    }

    info!(odontogram = %odontogram.id, revision = request.revision, "chart saved");
    Ok(SaveReceipt {
        odontogram_id: odontogram.id.clone(),
        revision: request.revision,
        treatments_saved: request.treatments.len(),
        treatment_ids: request.treatments.iter().map(|t| t.id.clone()).collect(),
    })
}

/// Open the patient's stored chart, or start a new one if none exists.
pub fn open_session<S: OdontogramStore + ?Sized>(
    store: &S,
    patient_id: &str,
    doctor_id: &str,
) -> StoreResult<ChartSession> {
    match store.get_by_patient_id(patient_id)? {
        Some(odontogram) => {
            debug!(patient = patient_id, odontogram = %odontogram.id, "opened stored chart");
            Ok(ChartSession::from_odontogram(odontogram))
        }
        None => {
            debug!(patient = patient_id, "starting new chart");
            Ok(ChartSession::new(patient_id.to_string(), doctor_id.to_string()))
        }
    }
}

//! Chart session: the single owner of one patient's chart while it is open.
//!
//! Edits are applied locally and immediately. Saving is a separate step: the
//! session hands out a [`SaveRequest`] snapshot, the caller persists it, and a
//! [`SaveReceipt`] is fed back through [`ChartSession::mark_saved`]. A failed
//! save leaves the local state untouched so the user can retry.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use super::{AppliedCommand, ChartCommand, CommandHistory, ToothStates};
use crate::models::{Condition, Odontogram, Surface, ToothCondition, ToothState, Treatment};
use crate::taxonomy::ToothNumber;
use crate::wire::{self, CanonicalSerializer, ToothStateSerializer};

/// Snapshot of a session ready to be persisted.
#[derive(Debug, Clone)]
pub struct SaveRequest {
    /// Chart with freshly serialized tooth records
    pub odontogram: Odontogram,
    /// Treatments not yet persisted, oldest first
    pub treatments: Vec<Treatment>,
    /// Session revision the snapshot was taken at
    pub revision: u64,
    /// Whether the chart has never been stored
    pub is_new: bool,
}

/// Acknowledgement of a successful save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveReceipt {
    pub odontogram_id: String,
    pub revision: u64,
    pub treatments_saved: usize,
    /// IDs of the treatments written by this save
    pub treatment_ids: Vec<String>,
}

/// An open chart.
pub struct ChartSession {
    odontogram: Odontogram,
    states: ToothStates,
    notes: BTreeMap<ToothNumber, String>,
    tooth_updated: BTreeMap<ToothNumber, String>,
    history: CommandHistory,
    pending: Vec<Treatment>,
    serializer: Box<dyn ToothStateSerializer>,
    revision: u64,
    saved_revision: u64,
    persisted: bool,
}

impl ChartSession {
    /// Start a brand-new chart for a patient.
    pub fn new(patient_id: String, doctor_id: String) -> Self {
        Self::with_parts(Odontogram::new(patient_id, doctor_id), false)
    }

    /// Open a stored chart, reading its tooth records back into canonical state.
    pub fn from_odontogram(odontogram: Odontogram) -> Self {
        Self::with_parts(odontogram, true)
    }

    fn with_parts(odontogram: Odontogram, persisted: bool) -> Self {
        let states = odontogram
            .teeth
            .iter()
            .map(|record| (record.tooth_number, wire::read_record(record)))
            .collect();
        let notes = odontogram
            .teeth
            .iter()
            .filter(|r| !r.general_notes.is_empty())
            .map(|r| (r.tooth_number, r.general_notes.clone()))
            .collect();
        let tooth_updated = odontogram
            .teeth
            .iter()
            .filter_map(|r| r.last_updated.clone().map(|ts| (r.tooth_number, ts)))
            .collect();

        Self {
            odontogram,
            states,
            notes,
            tooth_updated,
            history: CommandHistory::default(),
            pending: Vec::new(),
            serializer: Box::new(CanonicalSerializer),
            revision: 0,
            saved_revision: 0,
            persisted,
        }
    }

    /// Use a different wire serializer (e.g. the legacy `none` filter).
    pub fn with_serializer(mut self, serializer: Box<dyn ToothStateSerializer>) -> Self {
        self.serializer = serializer;
        self
    }

    /// Use a history with a custom undo depth.
    pub fn with_history(mut self, history: CommandHistory) -> Self {
        self.history = history;
        self
    }

    pub fn id(&self) -> &str {
        &self.odontogram.id
    }

    pub fn patient_id(&self) -> &str {
        &self.odontogram.patient_id
    }

    /// Chart metadata; tooth records reflect the last load, use
    /// [`snapshot`](Self::snapshot) for the current ones.
    pub fn odontogram(&self) -> &Odontogram {
        &self.odontogram
    }

    pub fn state(&self, tooth: ToothNumber) -> ToothState {
        self.states.get(tooth)
    }

    pub fn states(&self) -> &ToothStates {
        &self.states
    }

    pub fn notes(&self, tooth: ToothNumber) -> &str {
        self.notes.get(&tooth).map(String::as_str).unwrap_or("")
    }

    /// Treatments recorded since the last successful save.
    pub fn pending_treatments(&self) -> &[Treatment] {
        &self.pending
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Unsaved edits exist.
    pub fn is_dirty(&self) -> bool {
        self.revision != self.saved_revision || !self.pending.is_empty()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Apply a command. Returns `None` when it changed nothing.
    pub fn dispatch(&mut self, command: ChartCommand) -> Option<AppliedCommand> {
        let applied = command.apply(&mut self.states);
        if !applied.changed() {
            debug!(tooth = command.tooth().code(), ?command, "command left chart unchanged");
            return None;
        }
        debug!(tooth = command.tooth().code(), ?command, "command applied");
        self.history.push(applied);
        self.record(&applied, applied.before, applied.after);
        Some(applied)
    }

    pub fn cycle(&mut self, tooth: ToothNumber, surface: Surface) -> Option<AppliedCommand> {
        self.dispatch(ChartCommand::cycle(tooth, surface))
    }

    pub fn set_surface(
        &mut self,
        tooth: ToothNumber,
        surface: Surface,
        condition: Condition,
    ) -> Option<AppliedCommand> {
        self.dispatch(ChartCommand::set_surface(tooth, surface, condition))
    }

    pub fn set_tooth_condition(
        &mut self,
        tooth: ToothNumber,
        condition: ToothCondition,
    ) -> Option<AppliedCommand> {
        self.dispatch(ChartCommand::ToothEdit { tooth, condition })
    }

    pub fn reset(&mut self, tooth: ToothNumber) -> Option<AppliedCommand> {
        self.dispatch(ChartCommand::Reset { tooth })
    }

    /// Undo the most recent command; the reversal is logged as a treatment too.
    pub fn undo(&mut self) -> Option<AppliedCommand> {
        let applied = self.history.undo(&mut self.states)?;
        self.record(&applied, applied.after, applied.before);
        Some(applied)
    }

    pub fn redo(&mut self) -> Option<AppliedCommand> {
        let applied = self.history.redo(&mut self.states)?;
        self.record(&applied, applied.before, applied.after);
        Some(applied)
    }

    /// Replace the free-text notes for a tooth.
    pub fn set_notes(&mut self, tooth: ToothNumber, notes: impl Into<String>) {
        let notes = notes.into();
        if notes.is_empty() {
            self.notes.remove(&tooth);
        } else {
            self.notes.insert(tooth, notes);
        }
        self.touch_tooth(tooth);
        self.revision += 1;
    }

    pub fn set_last_exam_date(&mut self, date: impl Into<String>) {
        self.odontogram.last_exam_date = Some(date.into());
        self.revision += 1;
    }

    fn record(&mut self, applied: &AppliedCommand, before: ToothState, after: ToothState) {
        let tooth = applied.tooth();
        self.pending.push(Treatment::new(
            self.odontogram.id.clone(),
            applied.command.treatment_kind(),
            tooth,
            applied.command.surface(),
            before,
            after,
        ));
        self.touch_tooth(tooth);
        self.revision += 1;
    }

    fn touch_tooth(&mut self, tooth: ToothNumber) {
        self.tooth_updated
            .insert(tooth, chrono::Utc::now().to_rfc3339());
    }

    /// Serialize the current chart for saving.
    pub fn snapshot(&self) -> SaveRequest {
        let teeth: BTreeSet<ToothNumber> = self
            .states
            .iter()
            .map(|(tooth, _)| tooth)
            .chain(self.notes.keys().copied())
            .collect();

        let mut records = wire::serialize_teeth(
            teeth
                .iter()
                .map(|&tooth| (tooth, self.states.get(tooth), self.notes(tooth))),
            self.serializer.as_ref(),
        );
        for record in &mut records {
            record.last_updated = self.tooth_updated.get(&record.tooth_number).cloned();
        }

        let mut odontogram = self.odontogram.clone();
        odontogram.teeth = records;
        odontogram.touch();

        SaveRequest {
            odontogram,
            treatments: self.pending.clone(),
            revision: self.revision,
            is_new: !self.persisted,
        }
    }

    /// Acknowledge a successful save.
    ///
    /// Saved treatments are dropped from the pending log by ID, so receipts of
    /// overlapping saves may arrive in any order. The session only becomes
    /// clean if nothing changed after the snapshot was taken.
    pub fn mark_saved(&mut self, receipt: &SaveReceipt) {
        if receipt.odontogram_id != self.odontogram.id {
            return;
        }
        self.persisted = true;
        self.pending
            .retain(|t| !receipt.treatment_ids.iter().any(|id| *id == t.id));
        if receipt.revision > self.saved_revision {
            self.saved_revision = receipt.revision;
        }
        debug!(
            odontogram = %self.odontogram.id,
            revision = receipt.revision,
            dirty = self.is_dirty(),
            "save acknowledged"
        );
    }
}

impl std::fmt::Debug for ChartSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChartSession")
            .field("id", &self.odontogram.id)
            .field("patient_id", &self.odontogram.patient_id)
            .field("teeth", &self.states.len())
            .field("revision", &self.revision)
            .field("saved_revision", &self.saved_revision)
            .finish()
    }
}

//! Treatment log database operations.
//!
//! Treatments are append-only; the schema rejects updates and deletes.

use rusqlite::params;

use super::odontograms::tooth_from_column;
use super::{Database, DbError, DbResult};
use crate::models::{Surface, Treatment, TreatmentKind};

impl Database {
    /// Append a treatment to the log. Re-inserting a known ID is a no-op.
    pub fn insert_treatment(&self, treatment: &Treatment) -> DbResult<()> {
        let before_json = serde_json::to_string(&treatment.before)?;
        let after_json = serde_json::to_string(&treatment.after)?;

        self.conn.execute(
            r#"
            INSERT OR IGNORE INTO treatments (
                id, odontogram_id, kind, tooth_number, surface,
                before_state, after_state, performed_at, recorded_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                treatment.id,
                treatment.odontogram_id,
                treatment.kind.as_str(),
                treatment.tooth_number.code(),
                treatment.surface.map(surface_to_string),
                before_json,
                after_json,
                treatment.performed_at,
                chrono::Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Most recent treatments for a patient's chart, newest first.
    pub fn list_treatments_for_patient(
        &self,
        patient_id: &str,
        limit: u32,
    ) -> DbResult<Vec<Treatment>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT t.id, t.odontogram_id, t.kind, t.tooth_number, t.surface,
                   t.before_state, t.after_state, t.performed_at
            FROM treatments t
            JOIN odontograms o ON o.id = t.odontogram_id
            WHERE o.patient_id = ?1
            ORDER BY t.performed_at DESC, t.rowid DESC
            LIMIT ?2
            "#,
        )?;

        let rows = stmt.query_map(params![patient_id, limit], |row| {
            Ok(TreatmentRow {
                id: row.get(0)?,
                odontogram_id: row.get(1)?,
                kind: row.get(2)?,
                tooth_number: row.get(3)?,
                surface: row.get(4)?,
                before_state: row.get(5)?,
                after_state: row.get(6)?,
                performed_at: row.get(7)?,
            })
        })?;

        let mut treatments = Vec::new();
        for row in rows {
            treatments.push(row?.try_into()?);
        }
        Ok(treatments)
    }

    /// Number of treatments logged against an odontogram.
    pub fn count_treatments(&self, odontogram_id: &str) -> DbResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM treatments WHERE odontogram_id = ?",
            [odontogram_id],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}

/// Internal row type for treatments.
struct TreatmentRow {
    id: String,
    odontogram_id: String,
    kind: String,
    tooth_number: u32,
    surface: Option<String>,
    before_state: String,
    after_state: String,
    performed_at: String,
}

impl TryFrom<TreatmentRow> for Treatment {
    type Error = DbError;

    fn try_from(row: TreatmentRow) -> Result<Self, Self::Error> {
        let kind = TreatmentKind::parse(&row.kind)
            .ok_or_else(|| DbError::Constraint(format!("Unknown treatment kind: {}", row.kind)))?;
        let surface = row.surface.as_deref().map(string_to_surface).transpose()?;

        Ok(Treatment {
            id: row.id,
            odontogram_id: row.odontogram_id,
            kind,
            tooth_number: tooth_from_column(row.tooth_number)?,
            surface,
            before: serde_json::from_str(&row.before_state)?,
            after: serde_json::from_str(&row.after_state)?,
            performed_at: row.performed_at,
        })
    }
}

fn surface_to_string(surface: Surface) -> String {
    surface.letter().to_string()
}

fn string_to_surface(s: &str) -> DbResult<Surface> {
    let mut chars = s.chars();
    match (chars.next().and_then(Surface::from_letter), chars.next()) {
        (Some(surface), None) => Ok(surface),
        _ => Err(DbError::Constraint(format!("Unknown surface: {}", s))),
    }
}

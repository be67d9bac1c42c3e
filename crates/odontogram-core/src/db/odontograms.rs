//! Odontogram and tooth record database operations.

use rusqlite::{params, Connection, OptionalExtension};

use super::{constraint_context, Database, DbError, DbResult};
use crate::models::Odontogram;
use crate::taxonomy::ToothNumber;
use crate::wire::ToothRecord;

impl Database {
    /// Insert a new odontogram with its tooth records.
    ///
    /// Fails with [`DbError::Constraint`] if the patient already has a chart.
    pub fn insert_odontogram(&self, odontogram: &Odontogram) -> DbResult<()> {
        let tx = self.conn.unchecked_transaction()?;

        tx.execute(
            r#"
            INSERT INTO odontograms (
                id, patient_id, doctor_id, last_exam_date, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                odontogram.id,
                odontogram.patient_id,
                odontogram.doctor_id,
                odontogram.last_exam_date,
                odontogram.created_at,
                odontogram.updated_at,
            ],
        )
        .map_err(|e| {
            constraint_context(e, || {
                format!("Patient {} already has an odontogram", odontogram.patient_id)
            })
        })?;

        for record in &odontogram.teeth {
            write_tooth_record(&tx, &odontogram.id, record)?;
        }

        tx.commit()?;
        Ok(())
    }

    /// Replace an odontogram's header and tooth records. Last write wins.
    pub fn update_odontogram(&self, odontogram: &Odontogram) -> DbResult<bool> {
        let tx = self.conn.unchecked_transaction()?;

        let rows_affected = tx.execute(
            r#"
            UPDATE odontograms SET
                doctor_id = ?2,
                last_exam_date = ?3,
                updated_at = ?4
            WHERE id = ?1
            "#,
            params![
                odontogram.id,
                odontogram.doctor_id,
                odontogram.last_exam_date,
                odontogram.updated_at,
            ],
        )?;
        if rows_affected == 0 {
            return Ok(false);
        }

        tx.execute(
            "DELETE FROM tooth_records WHERE odontogram_id = ?",
            [&odontogram.id],
        )?;
        for record in &odontogram.teeth {
            write_tooth_record(&tx, &odontogram.id, record)?;
        }

        tx.commit()?;
        Ok(true)
    }

    /// Get an odontogram by ID.
    pub fn get_odontogram(&self, id: &str) -> DbResult<Option<Odontogram>> {
        let row = self
            .conn
            .query_row(
                r#"
                SELECT id, patient_id, doctor_id, last_exam_date, created_at, updated_at
                FROM odontograms
                WHERE id = ?
                "#,
                [id],
                OdontogramRow::from_row,
            )
            .optional()?;
        row.map(|row| self.assemble(row)).transpose()
    }

    /// Get the odontogram belonging to a patient.
    pub fn get_odontogram_by_patient(&self, patient_id: &str) -> DbResult<Option<Odontogram>> {
        let row = self
            .conn
            .query_row(
                r#"
                SELECT id, patient_id, doctor_id, last_exam_date, created_at, updated_at
                FROM odontograms
                WHERE patient_id = ?
                "#,
                [patient_id],
                OdontogramRow::from_row,
            )
            .optional()?;
        row.map(|row| self.assemble(row)).transpose()
    }

    /// Insert or replace a single tooth record and bump the chart's timestamp.
    pub fn upsert_tooth_record(&self, odontogram_id: &str, record: &ToothRecord) -> DbResult<()> {
        let tx = self.conn.unchecked_transaction()?;

        let rows_affected = tx.execute(
            "UPDATE odontograms SET updated_at = ?2 WHERE id = ?1",
            params![odontogram_id, now()],
        )?;
        if rows_affected == 0 {
            return Err(DbError::NotFound(format!("Odontogram {}", odontogram_id)));
        }
        write_tooth_record(&tx, odontogram_id, record)?;

        tx.commit()?;
        Ok(())
    }

    /// List tooth records of an odontogram, in tooth number order.
    pub fn list_tooth_records(&self, odontogram_id: &str) -> DbResult<Vec<ToothRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT tooth_number, record, updated_at
            FROM tooth_records
            WHERE odontogram_id = ?
            ORDER BY tooth_number
            "#,
        )?;

        let rows = stmt.query_map([odontogram_id], |row| {
            Ok(ToothRecordRow {
                tooth_number: row.get(0)?,
                record: row.get(1)?,
                updated_at: row.get(2)?,
            })
        })?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?.try_into()?);
        }
        Ok(records)
    }

    fn assemble(&self, row: OdontogramRow) -> DbResult<Odontogram> {
        let teeth = self.list_tooth_records(&row.id)?;
        Ok(Odontogram {
            id: row.id,
            patient_id: row.patient_id,
            doctor_id: row.doctor_id,
            teeth,
            last_exam_date: row.last_exam_date,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn write_tooth_record(conn: &Connection, odontogram_id: &str, record: &ToothRecord) -> DbResult<()> {
    let record_json = serde_json::to_string(record)?;
    conn.execute(
        r#"
        INSERT OR REPLACE INTO tooth_records (
            odontogram_id, tooth_number, record, updated_at
        ) VALUES (?1, ?2, ?3, ?4)
        "#,
        params![
            odontogram_id,
            record.tooth_number.code(),
            record_json,
            record.last_updated.clone().unwrap_or_else(now),
        ],
    )?;
    Ok(())
}

/// Timestamps are stored as RFC 3339, matching the model's.
fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Internal row type for odontogram headers.
struct OdontogramRow {
    id: String,
    patient_id: String,
    doctor_id: String,
    last_exam_date: Option<String>,
    created_at: String,
    updated_at: String,
}

impl OdontogramRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            patient_id: row.get(1)?,
            doctor_id: row.get(2)?,
            last_exam_date: row.get(3)?,
            created_at: row.get(4)?,
            updated_at: row.get(5)?,
        })
    }
}

/// Internal row type for tooth records.
struct ToothRecordRow {
    tooth_number: u32,
    record: String,
    updated_at: Option<String>,
}

impl TryFrom<ToothRecordRow> for ToothRecord {
    type Error = DbError;

    fn try_from(row: ToothRecordRow) -> Result<Self, Self::Error> {
        let mut record: ToothRecord = serde_json::from_str(&row.record)?;
        if record.tooth_number.code() != row.tooth_number {
            return Err(DbError::Constraint(format!(
                "Tooth record {} stored under tooth {}",
                record.tooth_number, row.tooth_number
            )));
        }
        record.last_updated = row.updated_at;
        Ok(record)
    }
}

/// Validate a tooth number read back from the database.
pub(super) fn tooth_from_column(code: u32) -> DbResult<ToothNumber> {
    ToothNumber::new(code).map_err(|_| DbError::Constraint(format!("Unknown tooth number: {}", code)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Surface;
    use crate::wire::SurfaceRecord;

    fn setup_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    fn record(code: u32) -> ToothRecord {
        ToothRecord {
            tooth_number: ToothNumber::new(code).unwrap(),
            is_present: true,
            surfaces: vec![SurfaceRecord::new(Surface::Occlusal, "caries")],
            general_notes: String::new(),
            last_updated: None,
        }
    }

    #[test]
    fn test_insert_and_get_odontogram() {
        let db = setup_db();
        let mut chart = Odontogram::new("pat_1".into(), "doc_1".into());
        chart.teeth.push(record(16));
        db.insert_odontogram(&chart).unwrap();

        let retrieved = db.get_odontogram(&chart.id).unwrap().unwrap();
        assert_eq!(retrieved.patient_id, "pat_1");
        assert_eq!(retrieved.teeth.len(), 1);
        assert_eq!(retrieved.teeth[0].surfaces, chart.teeth[0].surfaces);
        assert!(retrieved.teeth[0].last_updated.is_some());

        let by_patient = db.get_odontogram_by_patient("pat_1").unwrap().unwrap();
        assert_eq!(by_patient.id, chart.id);
    }

    #[test]
    fn test_get_missing_odontogram() {
        let db = setup_db();
        assert!(db.get_odontogram("nope").unwrap().is_none());
        assert!(db.get_odontogram_by_patient("nobody").unwrap().is_none());
    }

    #[test]
    fn test_second_chart_for_patient_rejected() {
        let db = setup_db();
        db.insert_odontogram(&Odontogram::new("pat_1".into(), "doc_1".into()))
            .unwrap();
        let result = db.insert_odontogram(&Odontogram::new("pat_1".into(), "doc_2".into()));
        assert!(matches!(result, Err(DbError::Constraint(_))));
    }

    #[test]
    fn test_update_replaces_records() {
        let db = setup_db();
        let mut chart = Odontogram::new("pat_1".into(), "doc_1".into());
        chart.teeth = vec![record(16), record(21)];
        db.insert_odontogram(&chart).unwrap();

        chart.teeth = vec![record(36)];
        chart.last_exam_date = Some("2024-03-01".into());
        assert!(db.update_odontogram(&chart).unwrap());

        let retrieved = db.get_odontogram(&chart.id).unwrap().unwrap();
        let codes: Vec<u32> = retrieved.teeth.iter().map(|r| r.tooth_number.code()).collect();
        assert_eq!(codes, vec![36]);
        assert_eq!(retrieved.last_exam_date.as_deref(), Some("2024-03-01"));
    }

    #[test]
    fn test_update_unknown_odontogram() {
        let db = setup_db();
        let chart = Odontogram::new("pat_1".into(), "doc_1".into());
        assert!(!db.update_odontogram(&chart).unwrap());
    }

    #[test]
    fn test_upsert_tooth_record() {
        let db = setup_db();
        let chart = Odontogram::new("pat_1".into(), "doc_1".into());
        db.insert_odontogram(&chart).unwrap();

        db.upsert_tooth_record(&chart.id, &record(11)).unwrap();
        let mut extracted = record(11);
        extracted.is_present = false;
        extracted.surfaces.clear();
        db.upsert_tooth_record(&chart.id, &extracted).unwrap();

        let records = db.list_tooth_records(&chart.id).unwrap();
        assert_eq!(records.len(), 1);
        assert!(!records[0].is_present);

        let missing = db.upsert_tooth_record("nope", &record(11));
        assert!(matches!(missing, Err(DbError::NotFound(_))));
    }

    #[test]
    fn test_records_listed_in_tooth_order() {
        let db = setup_db();
        let mut chart = Odontogram::new("pat_1".into(), "doc_1".into());
        chart.teeth = vec![record(48), record(11), record(85)];
        db.insert_odontogram(&chart).unwrap();

        let codes: Vec<u32> = db
            .list_tooth_records(&chart.id)
            .unwrap()
            .iter()
            .map(|r| r.tooth_number.code())
            .collect();
        assert_eq!(codes, vec![11, 48, 85]);
    }

    #[test]
    fn test_timestamps_are_rfc3339() {
        let db = setup_db();
        let mut chart = Odontogram::new("pat_1".into(), "doc_1".into());
        chart.teeth.push(record(16));
        db.insert_odontogram(&chart).unwrap();

        chart.touch();
        db.update_odontogram(&chart).unwrap();
        db.upsert_tooth_record(&chart.id, &record(21)).unwrap();

        let stored = db.get_odontogram(&chart.id).unwrap().unwrap();
        let mut stamps = vec![stored.created_at.clone(), stored.updated_at.clone()];
        stamps.extend(stored.teeth.iter().filter_map(|r| r.last_updated.clone()));
        assert_eq!(stamps.len(), 4);
        for stamp in stamps {
            assert!(
                chrono::DateTime::parse_from_rfc3339(&stamp).is_ok(),
                "not RFC 3339: {}",
                stamp
            );
        }
    }
}

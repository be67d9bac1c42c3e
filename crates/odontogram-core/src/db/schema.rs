//! SQLite schema definition.

/// Complete database schema for the odontogram store.
pub const SCHEMA: &str = r#"
-- Enable foreign keys
PRAGMA foreign_keys = ON;

-- ============================================================================
-- Odontograms (one per patient)
-- ============================================================================

CREATE TABLE IF NOT EXISTS odontograms (
    id TEXT PRIMARY KEY,
    patient_id TEXT NOT NULL,
    doctor_id TEXT NOT NULL,
    last_exam_date TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- At most one chart per patient
CREATE UNIQUE INDEX IF NOT EXISTS idx_odontograms_patient ON odontograms(patient_id);

-- ============================================================================
-- Tooth Records (wire-shaped JSON, one row per charted tooth)
-- ============================================================================

CREATE TABLE IF NOT EXISTS tooth_records (
    odontogram_id TEXT NOT NULL REFERENCES odontograms(id),
    tooth_number INTEGER NOT NULL CHECK (
        (tooth_number / 10 BETWEEN 1 AND 4 AND tooth_number % 10 BETWEEN 1 AND 8)
        OR (tooth_number / 10 BETWEEN 5 AND 8 AND tooth_number % 10 BETWEEN 1 AND 5)
    ),
    record TEXT NOT NULL,                        -- JSON ToothRecord
    updated_at TEXT,
    PRIMARY KEY (odontogram_id, tooth_number)
);

-- ============================================================================
-- Treatments (Append-Only - Immutable after creation)
-- ============================================================================

CREATE TABLE IF NOT EXISTS treatments (
    id TEXT PRIMARY KEY,
    odontogram_id TEXT NOT NULL REFERENCES odontograms(id),
    kind TEXT NOT NULL CHECK (kind IN ('surface', 'tooth', 'reset')),
    tooth_number INTEGER NOT NULL,
    surface TEXT,                                -- surface edits only
    before_state TEXT NOT NULL,                  -- JSON ToothState
    after_state TEXT NOT NULL,                   -- JSON ToothState
    performed_at TEXT NOT NULL,
    recorded_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_treatments_odontogram ON treatments(odontogram_id, performed_at);

CREATE TRIGGER IF NOT EXISTS treatments_no_update BEFORE UPDATE ON treatments
BEGIN
    SELECT RAISE(ABORT, 'Treatments are append-only');
END;

CREATE TRIGGER IF NOT EXISTS treatments_no_delete BEFORE DELETE ON treatments
BEGIN
    SELECT RAISE(ABORT, 'Treatments are append-only');
END;
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();
        conn.execute(
            "INSERT INTO odontograms (id, patient_id, doctor_id) VALUES ('o1', 'pat_1', 'doc_1')",
            [],
        )
        .unwrap();
        conn
    }

    #[test]
    fn test_schema_valid() {
        let conn = Connection::open_in_memory().unwrap();
        let result = conn.execute_batch(SCHEMA);
        assert!(result.is_ok(), "Schema should be valid SQL: {:?}", result);
    }

    #[test]
    fn test_one_odontogram_per_patient() {
        let conn = setup();
        let result = conn.execute(
            "INSERT INTO odontograms (id, patient_id, doctor_id) VALUES ('o2', 'pat_1', 'doc_2')",
            [],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_tooth_number_check() {
        let conn = setup();
        let ok = conn.execute(
            "INSERT INTO tooth_records (odontogram_id, tooth_number, record) VALUES ('o1', 85, '{}')",
            [],
        );
        assert!(ok.is_ok());
        for bad in [19, 56, 90, 10] {
            let result = conn.execute(
                "INSERT INTO tooth_records (odontogram_id, tooth_number, record) VALUES ('o1', ?, '{}')",
                [bad],
            );
            assert!(result.is_err(), "tooth {bad} should be rejected");
        }
    }

    #[test]
    fn test_treatments_append_only() {
        let conn = setup();
        conn.execute(
            r#"INSERT INTO treatments (id, odontogram_id, kind, tooth_number, before_state, after_state, performed_at)
               VALUES ('t1', 'o1', 'reset', 16, '{}', '{}', '2024-01-01T00:00:00Z')"#,
            [],
        )
        .unwrap();

        let update = conn.execute("UPDATE treatments SET kind = 'tooth' WHERE id = 't1'", []);
        assert!(update.is_err());

        let delete = conn.execute("DELETE FROM treatments WHERE id = 't1'", []);
        assert!(delete.is_err());
    }
}

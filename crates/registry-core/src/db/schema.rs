//! SQLite schema definition.

/// Complete database schema for the practice registry.
pub const SCHEMA: &str = r#"
-- Enable foreign keys
PRAGMA foreign_keys = ON;

-- ============================================================================
-- Practices (tenants)
-- ============================================================================

CREATE TABLE IF NOT EXISTS practices (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL DEFAULT '',
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- ============================================================================
-- Users (principal allow-lists)
-- ============================================================================

CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    allowed_practices TEXT NOT NULL DEFAULT '[]',  -- JSON array of practice ids
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- ============================================================================
-- Patients
-- ============================================================================

CREATE TABLE IF NOT EXISTS patients (
    id TEXT PRIMARY KEY,
    practice_id TEXT REFERENCES practices(id),   -- NULL on pre-tenancy legacy rows
    first_name TEXT NOT NULL,                    -- display case
    last_name TEXT NOT NULL,
    first_name_lc TEXT NOT NULL,                 -- lowercase shadow for matching
    last_name_lc TEXT NOT NULL,
    dob TEXT NOT NULL DEFAULT '',                -- YYYY-MM-DD, unvalidated
    phone TEXT,                                  -- digits only
    email TEXT,                                  -- lowercased
    address TEXT,
    notes TEXT,
    visit_type TEXT NOT NULL DEFAULT 'new'
        CHECK (visit_type IN ('new', 'returning')),
    payer TEXT NOT NULL DEFAULT 'private'
        CHECK (payer IN ('private', 'medical_aid')),
    medical_aid TEXT,                            -- JSON object, NULL for private payers
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- One index per duplicate probe, plus the scoped list order
CREATE INDEX IF NOT EXISTS idx_patients_name_dob
    ON patients(practice_id, first_name_lc, last_name_lc, dob);
CREATE INDEX IF NOT EXISTS idx_patients_phone ON patients(practice_id, phone);
CREATE INDEX IF NOT EXISTS idx_patients_email ON patients(practice_id, email);
CREATE INDEX IF NOT EXISTS idx_patients_created
    ON patients(practice_id, created_at DESC);
CREATE INDEX IF NOT EXISTS idx_patients_surname
    ON patients(last_name_lc, first_name_lc);
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_schema_valid() {
        let conn = Connection::open_in_memory().unwrap();
        let result = conn.execute_batch(SCHEMA);
        assert!(result.is_ok(), "Schema should be valid SQL: {:?}", result);
    }

    #[test]
    fn test_visit_type_constraint() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();

        let result = conn.execute(
            r#"
            INSERT INTO patients (id, first_name, last_name, first_name_lc, last_name_lc, visit_type)
            VALUES ('x', 'Jane', 'Doe', 'jane', 'doe', 'walk_in')
            "#,
            [],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_legacy_row_allows_null_practice() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();

        let result = conn.execute(
            r#"
            INSERT INTO patients (id, practice_id, first_name, last_name, first_name_lc, last_name_lc)
            VALUES ('legacy-1', NULL, 'Old', 'Record', 'old', 'record')
            "#,
            [],
        );
        assert!(result.is_ok());
    }
}

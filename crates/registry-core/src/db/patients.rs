//! Patient storage operations.
//!
//! Names are written twice: display-cased in `first_name`/`last_name` and
//! lowercased in the `_lc` shadow columns the duplicate probes match against.

use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DbError, DbResult};
use crate::models::{MedicalAid, Patient, Payer, VisitType};

impl Database {
    /// Insert a new patient. The record must already be normalized.
    pub fn insert_patient(&self, patient: &Patient) -> DbResult<()> {
        let medical_aid_json = patient
            .medical_aid
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        self.conn.execute(
            r#"
            INSERT INTO patients (
                id, practice_id, first_name, last_name, first_name_lc, last_name_lc,
                dob, phone, email, address, notes, visit_type, payer, medical_aid,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
            "#,
            params![
                patient.id,
                patient.practice_id,
                patient.first_name,
                patient.last_name,
                patient.first_name.to_lowercase(),
                patient.last_name.to_lowercase(),
                patient.dob,
                patient.phone,
                patient.email,
                patient.address,
                patient.notes,
                patient.visit_type.as_str(),
                patient.payer.as_str(),
                medical_aid_json,
                patient.created_at,
            ],
        )?;
        Ok(())
    }

    /// Rewrite an existing patient in place. `created_at` is never touched.
    pub fn update_patient(&self, patient: &Patient) -> DbResult<bool> {
        let medical_aid_json = patient
            .medical_aid
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        let rows_affected = self.conn.execute(
            r#"
            UPDATE patients SET
                first_name = ?3,
                last_name = ?4,
                first_name_lc = ?5,
                last_name_lc = ?6,
                dob = ?7,
                phone = ?8,
                email = ?9,
                address = ?10,
                notes = ?11,
                visit_type = ?12,
                payer = ?13,
                medical_aid = ?14
            WHERE id = ?1 AND practice_id = ?2
            "#,
            params![
                patient.id,
                patient.practice_id,
                patient.first_name,
                patient.last_name,
                patient.first_name.to_lowercase(),
                patient.last_name.to_lowercase(),
                patient.dob,
                patient.phone,
                patient.email,
                patient.address,
                patient.notes,
                patient.visit_type.as_str(),
                patient.payer.as_str(),
                medical_aid_json,
            ],
        )?;
        Ok(rows_affected > 0)
    }

    /// Get a patient by id within one practice.
    pub fn get_patient(&self, practice_id: &str, id: &str) -> DbResult<Option<Patient>> {
        let result = self
            .conn
            .query_row(
                &format!(
                    "SELECT {PATIENT_COLUMNS} FROM patients WHERE id = ?1 AND practice_id = ?2"
                ),
                params![id, practice_id],
                map_patient_row,
            )
            .optional()?;

        result.map(|row| row.try_into()).transpose()
    }

    /// List patients for one practice, newest first.
    pub fn list_patients_for_practice(
        &self,
        practice_id: &str,
        limit: usize,
    ) -> DbResult<Vec<Patient>> {
        let mut stmt = self.conn.prepare(&format!(
            r#"
            SELECT {PATIENT_COLUMNS}
            FROM patients
            WHERE practice_id = ?1
            ORDER BY created_at DESC, rowid DESC
            LIMIT ?2
            "#
        ))?;

        let rows = stmt.query_map(params![practice_id, limit as i64], map_patient_row)?;

        let mut patients = Vec::new();
        for row in rows {
            patients.push(row?.try_into()?);
        }
        Ok(patients)
    }

    /// List patients across every practice, legacy rows included,
    /// ordered by surname then first name.
    pub fn list_patients_all_practices(&self, limit: usize) -> DbResult<Vec<Patient>> {
        let mut stmt = self.conn.prepare(&format!(
            r#"
            SELECT {PATIENT_COLUMNS}
            FROM patients
            ORDER BY last_name_lc, first_name_lc
            LIMIT ?1
            "#
        ))?;

        let rows = stmt.query_map(params![limit as i64], map_patient_row)?;

        let mut patients = Vec::new();
        for row in rows {
            patients.push(row?.try_into()?);
        }
        Ok(patients)
    }

    /// Probe: same first name, last name and date of birth.
    /// Inputs must be in comparison form (lowercase names, trimmed dob).
    pub fn probe_name_dob(
        &self,
        practice_id: &str,
        first_name_lc: &str,
        last_name_lc: &str,
        dob: &str,
        limit: usize,
    ) -> DbResult<Vec<Patient>> {
        let mut stmt = self.conn.prepare(&format!(
            r#"
            SELECT {PATIENT_COLUMNS}
            FROM patients
            WHERE practice_id = ?1 AND first_name_lc = ?2 AND last_name_lc = ?3 AND dob = ?4
            LIMIT ?5
            "#
        ))?;

        let rows = stmt.query_map(
            params![practice_id, first_name_lc, last_name_lc, dob, limit as i64],
            map_patient_row,
        )?;

        let mut patients = Vec::new();
        for row in rows {
            patients.push(row?.try_into()?);
        }
        Ok(patients)
    }

    /// Probe: same digits-only phone number.
    pub fn probe_phone(
        &self,
        practice_id: &str,
        phone: &str,
        limit: usize,
    ) -> DbResult<Vec<Patient>> {
        let mut stmt = self.conn.prepare(&format!(
            r#"
            SELECT {PATIENT_COLUMNS}
            FROM patients
            WHERE practice_id = ?1 AND phone = ?2
            LIMIT ?3
            "#
        ))?;

        let rows = stmt.query_map(params![practice_id, phone, limit as i64], map_patient_row)?;

        let mut patients = Vec::new();
        for row in rows {
            patients.push(row?.try_into()?);
        }
        Ok(patients)
    }

    /// Probe: same email with the same full name.
    pub fn probe_email_name(
        &self,
        practice_id: &str,
        email: &str,
        first_name_lc: &str,
        last_name_lc: &str,
        limit: usize,
    ) -> DbResult<Vec<Patient>> {
        let mut stmt = self.conn.prepare(&format!(
            r#"
            SELECT {PATIENT_COLUMNS}
            FROM patients
            WHERE practice_id = ?1 AND email = ?2 AND first_name_lc = ?3 AND last_name_lc = ?4
            LIMIT ?5
            "#
        ))?;

        let rows = stmt.query_map(
            params![practice_id, email, first_name_lc, last_name_lc, limit as i64],
            map_patient_row,
        )?;

        let mut patients = Vec::new();
        for row in rows {
            patients.push(row?.try_into()?);
        }
        Ok(patients)
    }
}

const PATIENT_COLUMNS: &str = "id, practice_id, first_name, last_name, dob, phone, email, \
                               address, notes, visit_type, payer, medical_aid, created_at";

fn map_patient_row(row: &Row<'_>) -> rusqlite::Result<PatientRow> {
    Ok(PatientRow {
        id: row.get(0)?,
        practice_id: row.get(1)?,
        first_name: row.get(2)?,
        last_name: row.get(3)?,
        dob: row.get(4)?,
        phone: row.get(5)?,
        email: row.get(6)?,
        address: row.get(7)?,
        notes: row.get(8)?,
        visit_type: row.get(9)?,
        payer: row.get(10)?,
        medical_aid: row.get(11)?,
        created_at: row.get(12)?,
    })
}

/// Intermediate row struct for database mapping.
struct PatientRow {
    id: String,
    practice_id: Option<String>,
    first_name: String,
    last_name: String,
    dob: String,
    phone: Option<String>,
    email: Option<String>,
    address: Option<String>,
    notes: Option<String>,
    visit_type: String,
    payer: String,
    medical_aid: Option<String>,
    created_at: String,
}

impl TryFrom<PatientRow> for Patient {
    type Error = DbError;

    fn try_from(row: PatientRow) -> Result<Self, Self::Error> {
        let visit_type = VisitType::parse(&row.visit_type)
            .ok_or_else(|| DbError::Constraint(format!("unknown visit_type: {}", row.visit_type)))?;
        let payer = Payer::parse(&row.payer)
            .ok_or_else(|| DbError::Constraint(format!("unknown payer: {}", row.payer)))?;
        let medical_aid: Option<MedicalAid> = row
            .medical_aid
            .as_deref()
            .map(serde_json::from_str)
            .transpose()?;

        Ok(Patient {
            id: row.id,
            practice_id: row.practice_id,
            first_name: row.first_name,
            last_name: row.last_name,
            dob: row.dob,
            phone: row.phone,
            email: row.email,
            address: row.address,
            notes: row.notes,
            visit_type,
            payer,
            medical_aid,
            created_at: row.created_at,
        })
    }
}

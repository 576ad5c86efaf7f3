//! Duplicate detection.
//!
//! A presence check, not a similarity search: three equality probes against
//! the practice-scoped patient store, each gated on its inputs being
//! non-empty after normalization, each capped, unioned and deduplicated by
//! patient id. A typo'd name is an accepted false negative; there is no
//! scoring to tune.

use std::collections::HashSet;

use crate::db::{Database, DbResult};
use crate::models::{Patient, PatientDraft};

use super::normalize::ComparisonForm;

/// Per-probe result cap.
pub const PROBE_LIMIT: usize = 10;

/// An existing patient returned by a match probe. Transient, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct DuplicateCandidate {
    pub patient: Patient,
}

impl DuplicateCandidate {
    /// One human-readable line for manual review: name, DOB, phone-or-email.
    pub fn summary(&self) -> String {
        let dob = if self.patient.dob.is_empty() {
            "-"
        } else {
            &self.patient.dob
        };
        format!(
            "{} {} - DOB {} - {}",
            self.patient.first_name,
            self.patient.last_name,
            dob,
            self.patient.contact()
        )
    }
}

/// Runs the equality probes for one candidate record.
pub struct DuplicateChecker<'a> {
    db: &'a Database,
}

impl<'a> DuplicateChecker<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Find existing patients in `practice_id` that plausibly represent the
    /// same person as `candidate`.
    ///
    /// Returns an empty set without probing when the practice id is blank or
    /// the candidate supplies no usable comparison fields.
    pub fn find_duplicates(
        &self,
        practice_id: &str,
        candidate: &PatientDraft,
    ) -> DbResult<Vec<DuplicateCandidate>> {
        let practice_id = practice_id.trim();
        if practice_id.is_empty() {
            return Ok(Vec::new());
        }

        let c = ComparisonForm::of_draft(candidate);
        let mut results: Vec<Patient> = Vec::new();

        // 1) exact name + surname + dob
        if !c.first_name.is_empty() && !c.last_name.is_empty() && !c.dob.is_empty() {
            results.extend(self.db.probe_name_dob(
                practice_id,
                &c.first_name,
                &c.last_name,
                &c.dob,
                PROBE_LIMIT,
            )?);
        }

        // 2) same phone
        if !c.phone.is_empty() {
            results.extend(self.db.probe_phone(practice_id, &c.phone, PROBE_LIMIT)?);
        }

        // 3) same email with same full name
        if !c.email.is_empty() && !c.first_name.is_empty() && !c.last_name.is_empty() {
            results.extend(self.db.probe_email_name(
                practice_id,
                &c.email,
                &c.first_name,
                &c.last_name,
                PROBE_LIMIT,
            )?);
        }

        // unique by id, first seen wins
        let mut seen = HashSet::new();
        Ok(results
            .into_iter()
            .filter(|p| seen.insert(p.id.clone()))
            .map(|patient| DuplicateCandidate { patient })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Payer, VisitType};

    fn setup_db() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.upsert_practice("p1", "Sunrise Family Practice").unwrap();
        db.upsert_practice("p2", "Harbour View Clinic").unwrap();
        db
    }

    fn stored_patient(practice_id: &str) -> Patient {
        Patient {
            id: uuid::Uuid::new_v4().to_string(),
            practice_id: Some(practice_id.into()),
            first_name: "Jane".into(),
            last_name: "Doe".into(),
            dob: "1990-01-01".into(),
            phone: Some("0711112222".into()),
            email: Some("jane@example.com".into()),
            address: None,
            notes: None,
            visit_type: VisitType::New,
            payer: Payer::Private,
            medical_aid: None,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    fn draft(first: &str, last: &str, dob: &str) -> PatientDraft {
        PatientDraft {
            first_name: first.into(),
            last_name: last.into(),
            dob: dob.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_name_dob_probe_is_case_insensitive() {
        let db = setup_db();
        db.insert_patient(&stored_patient("p1")).unwrap();
        let checker = DuplicateChecker::new(&db);

        let matches = checker
            .find_duplicates("p1", &draft("JANE", "doe", " 1990-01-01 "))
            .unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].patient.first_name, "Jane");
    }

    #[test]
    fn test_phone_probe_is_independent_of_name() {
        let db = setup_db();
        db.insert_patient(&stored_patient("p1")).unwrap();
        let checker = DuplicateChecker::new(&db);

        // Different person, same phone after normalization
        let mut candidate = draft("Peter", "Smith", "1985-06-15");
        candidate.phone = Some("071 111 2222".into());

        let matches = checker.find_duplicates("p1", &candidate).unwrap();
        assert_eq!(matches.len(), 1);
    }

    #[test]
    fn test_email_probe_requires_matching_name() {
        let db = setup_db();
        db.insert_patient(&stored_patient("p1")).unwrap();
        let checker = DuplicateChecker::new(&db);

        // Shared email alone is not enough
        let mut candidate = draft("Peter", "Smith", "1985-06-15");
        candidate.email = Some("jane@example.com".into());
        assert!(checker.find_duplicates("p1", &candidate).unwrap().is_empty());

        // Shared email with the same name matches even when dob differs
        let mut candidate = draft("Jane", "Doe", "1991-12-31");
        candidate.email = Some("JANE@example.com".into());
        assert_eq!(checker.find_duplicates("p1", &candidate).unwrap().len(), 1);
    }

    #[test]
    fn test_probe_results_are_deduplicated_by_id() {
        let db = setup_db();
        let stored = stored_patient("p1");
        db.insert_patient(&stored).unwrap();
        let checker = DuplicateChecker::new(&db);

        // Candidate hits all three probes on the same stored row
        let mut candidate = draft("Jane", "Doe", "1990-01-01");
        candidate.phone = Some("0711112222".into());
        candidate.email = Some("jane@example.com".into());

        let matches = checker.find_duplicates("p1", &candidate).unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].patient.id, stored.id);
    }

    #[test]
    fn test_empty_candidate_issues_no_probe() {
        let db = setup_db();
        db.insert_patient(&stored_patient("p1")).unwrap();
        let checker = DuplicateChecker::new(&db);

        let matches = checker.find_duplicates("p1", &PatientDraft::default()).unwrap();
        assert!(matches.is_empty());
    }

    #[test]
    fn test_blank_practice_returns_empty() {
        let db = setup_db();
        db.insert_patient(&stored_patient("p1")).unwrap();
        let checker = DuplicateChecker::new(&db);

        let matches = checker
            .find_duplicates("  ", &draft("Jane", "Doe", "1990-01-01"))
            .unwrap();
        assert!(matches.is_empty());
    }

    #[test]
    fn test_matching_is_practice_scoped() {
        let db = setup_db();
        db.insert_patient(&stored_patient("p1")).unwrap();
        let checker = DuplicateChecker::new(&db);

        let matches = checker
            .find_duplicates("p2", &draft("Jane", "Doe", "1990-01-01"))
            .unwrap();
        assert!(matches.is_empty());
    }

    #[test]
    fn test_summary_line() {
        let candidate = DuplicateCandidate {
            patient: stored_patient("p1"),
        };
        assert_eq!(candidate.summary(), "Jane Doe - DOB 1990-01-01 - 0711112222");

        let mut no_phone = stored_patient("p1");
        no_phone.phone = None;
        no_phone.dob = String::new();
        let candidate = DuplicateCandidate { patient: no_phone };
        assert_eq!(candidate.summary(), "Jane Doe - DOB - - jane@example.com");
    }
}

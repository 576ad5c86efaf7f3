//! Tenant-scoped patient repository and practice directory.
//!
//! Pipeline on create: Normalization → Duplicate Matcher → insert. Every
//! operation takes the practice id explicitly; no ambient session state.

mod normalize;
mod dedup;

pub use normalize::*;
pub use dedup::*;

use thiserror::Error;
use tracing::{debug, warn};

use crate::db::{Database, DbError};
use crate::models::{Patient, PatientDraft, PatientUpdate, Payer, Practice, VisitType};

/// Cap on a practice-scoped list.
pub const SCOPED_LIST_LIMIT: usize = 500;
/// Cap on the cross-practice list.
pub const ALL_PRACTICES_LIST_LIMIT: usize = 1000;

/// Registry errors.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Required scoping or field missing; the caller must re-prompt.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Potential duplicates found; surfaced verbatim for manual review.
    #[error("potential duplicate(s) found:\n{}", summarize(.matches))]
    DuplicateFound { matches: Vec<DuplicateCandidate> },

    /// Update target no longer exists. Point lookups return `Ok(None)`
    /// instead.
    #[error("patient not found: {patient_id}")]
    NotFound { patient_id: String },

    /// Underlying store call failed; propagated with the store's message.
    #[error("storage error: {0}")]
    Store(#[from] DbError),
}

pub type RegistryResult<T> = Result<T, RegistryError>;

fn summarize(matches: &[DuplicateCandidate]) -> String {
    matches
        .iter()
        .map(DuplicateCandidate::summary)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Which rows a list call may see.
///
/// There is no implicit fallback between the two: crossing practices is
/// always a deliberate caller decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListScope {
    /// One practice's rows, newest first.
    Practice(String),
    /// Every row, pre-tenancy legacy rows included, ordered by surname then
    /// first name.
    AllPractices,
}

/// The patient repository and practice directory, bound to one store.
pub struct PatientRegistry<'a> {
    db: &'a Database,
    checker: DuplicateChecker<'a>,
}

impl<'a> PatientRegistry<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self {
            db,
            checker: DuplicateChecker::new(db),
        }
    }

    /// Run the duplicate probes for a candidate without writing anything.
    pub fn find_duplicates(
        &self,
        practice_id: &str,
        candidate: &PatientDraft,
    ) -> RegistryResult<Vec<DuplicateCandidate>> {
        Ok(self.checker.find_duplicates(practice_id, candidate)?)
    }

    /// Register a patient under `practice_id`.
    ///
    /// Fails with [`RegistryError::DuplicateFound`] when any probe matches;
    /// there is no force flag on this single-call path. The duplicate check
    /// and the insert are two store calls, so two concurrent creates for the
    /// same person can both pass the check.
    pub fn create_patient(
        &self,
        practice_id: &str,
        draft: &PatientDraft,
    ) -> RegistryResult<Patient> {
        let practice_id = practice_id.trim();
        if practice_id.is_empty() {
            return Err(RegistryError::Validation("select a practice first".into()));
        }

        let payer = draft.payer.unwrap_or(Payer::Private);
        let medical_aid = match payer {
            Payer::MedicalAid => Some(require_medical_aid(draft.medical_aid.as_ref())?),
            Payer::Private => None,
        };

        let matches = self.checker.find_duplicates(practice_id, draft)?;
        if !matches.is_empty() {
            warn!(
                practice_id,
                matches = matches.len(),
                "patient create blocked by duplicate check"
            );
            return Err(RegistryError::DuplicateFound { matches });
        }

        let c = ComparisonForm::of_draft(draft);
        let patient = Patient {
            id: uuid::Uuid::new_v4().to_string(),
            practice_id: Some(practice_id.to_string()),
            first_name: display_case(&draft.first_name),
            last_name: display_case(&draft.last_name),
            dob: c.dob,
            phone: some_nonempty(c.phone),
            email: some_nonempty(c.email),
            address: draft.address.clone(),
            notes: draft.notes.clone(),
            visit_type: draft.visit_type.unwrap_or(VisitType::New),
            payer,
            medical_aid,
            created_at: chrono::Utc::now().to_rfc3339(),
        };
        self.db.insert_patient(&patient)?;

        debug!(patient_id = %patient.id, practice_id, "patient created");
        Ok(patient)
    }

    /// Point lookup. Absent is `Ok(None)`, not an error.
    pub fn get_patient(&self, practice_id: &str, patient_id: &str) -> RegistryResult<Option<Patient>> {
        Ok(self.db.get_patient(practice_id.trim(), patient_id)?)
    }

    /// Apply a partial update. Only fields present in `update` are
    /// re-normalized and written; duplicate detection does not re-run.
    pub fn update_patient(
        &self,
        practice_id: &str,
        patient_id: &str,
        update: &PatientUpdate,
    ) -> RegistryResult<Patient> {
        let practice_id = practice_id.trim();
        if practice_id.is_empty() {
            return Err(RegistryError::Validation("select a practice first".into()));
        }

        let mut patient = self
            .db
            .get_patient(practice_id, patient_id)?
            .ok_or_else(|| RegistryError::NotFound {
                patient_id: patient_id.to_string(),
            })?;

        if let Some(first_name) = &update.first_name {
            patient.first_name = display_case(first_name);
        }
        if let Some(last_name) = &update.last_name {
            patient.last_name = display_case(last_name);
        }
        if let Some(dob) = &update.dob {
            patient.dob = dob.trim().to_string();
        }
        if let Some(phone) = &update.phone {
            patient.phone = some_nonempty(digits_only(phone));
        }
        if let Some(email) = &update.email {
            patient.email = some_nonempty(fold(email));
        }
        if let Some(address) = &update.address {
            patient.address = Some(address.clone());
        }
        if let Some(notes) = &update.notes {
            patient.notes = Some(notes.clone());
        }
        if let Some(visit_type) = update.visit_type {
            patient.visit_type = visit_type;
        }
        if let Some(medical_aid) = &update.medical_aid {
            patient.medical_aid = Some(medical_aid.clone());
        }
        if let Some(payer) = update.payer {
            patient.payer = payer;
        }
        // Enforce the payer rule on the effective payer, as create does
        match patient.payer {
            Payer::MedicalAid => {
                patient.medical_aid = Some(require_medical_aid(patient.medical_aid.as_ref())?);
            }
            Payer::Private => patient.medical_aid = None,
        }

        let updated = self.db.update_patient(&patient)?;
        if !updated {
            // Row vanished between the read and the write
            return Err(RegistryError::NotFound {
                patient_id: patient_id.to_string(),
            });
        }
        Ok(patient)
    }

    /// List patients for the given scope.
    ///
    /// A blank or unknown practice id degrades to an empty list; no data yet
    /// is a valid state.
    pub fn list_patients(&self, scope: ListScope) -> RegistryResult<Vec<Patient>> {
        match scope {
            ListScope::Practice(practice_id) => {
                let practice_id = practice_id.trim().to_string();
                if practice_id.is_empty() {
                    return Ok(Vec::new());
                }
                Ok(self
                    .db
                    .list_patients_for_practice(&practice_id, SCOPED_LIST_LIMIT)?)
            }
            ListScope::AllPractices => Ok(self
                .db
                .list_patients_all_practices(ALL_PRACTICES_LIST_LIMIT)?),
        }
    }

    /// Scoped list with an explicit legacy fallback: when the practice has
    /// zero rows, read unscoped on the theory that pre-migration data lacks
    /// a practice id. Opt-in only, since a misapplied fallback discloses
    /// cross-practice data.
    pub fn list_patients_with_legacy_fallback(
        &self,
        practice_id: &str,
    ) -> RegistryResult<Vec<Patient>> {
        let practice_id = practice_id.trim();
        if practice_id.is_empty() {
            return Ok(Vec::new());
        }

        let scoped = self
            .db
            .list_patients_for_practice(practice_id, SCOPED_LIST_LIMIT)?;
        if !scoped.is_empty() {
            return Ok(scoped);
        }

        warn!(practice_id, "scoped list empty, running legacy unscoped read");
        Ok(self
            .db
            .list_patients_all_practices(ALL_PRACTICES_LIST_LIMIT)?)
    }

    /// Resolve the practices a principal may access, sorted by name.
    ///
    /// Each allowed id is fetched individually; ids without a practice
    /// document are skipped and a blank name falls back to the id.
    pub fn list_accessible_practices(&self, principal_id: &str) -> RegistryResult<Vec<Practice>> {
        let Some(allowed) = self.db.allowed_practices(principal_id)? else {
            return Ok(Vec::new());
        };

        let mut practices = Vec::new();
        for id in allowed {
            if let Some(practice) = self.db.get_practice(&id)? {
                let name = practice.display_name().to_string();
                practices.push(Practice { id: practice.id, name });
            }
        }
        practices.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(practices)
    }
}

fn some_nonempty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

fn require_medical_aid(
    medical_aid: Option<&crate::models::MedicalAid>,
) -> RegistryResult<crate::models::MedicalAid> {
    let Some(aid) = medical_aid else {
        return Err(RegistryError::Validation(
            "medical aid details are required".into(),
        ));
    };
    if [&aid.scheme, &aid.plan, &aid.member_no, &aid.dependent_no]
        .iter()
        .any(|field| field.trim().is_empty())
    {
        return Err(RegistryError::Validation(
            "medical aid details are incomplete".into(),
        ));
    }
    Ok(aid.clone())
}

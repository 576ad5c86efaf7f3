//! Patient models.

use serde::{Deserialize, Serialize};

/// Type of visit a patient is registered for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VisitType {
    New,
    Returning,
}

impl VisitType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VisitType::New => "new",
            VisitType::Returning => "returning",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "new" => Some(VisitType::New),
            "returning" => Some(VisitType::Returning),
            _ => None,
        }
    }
}

/// Who pays for the visit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Payer {
    Private,
    MedicalAid,
}

impl Payer {
    pub fn as_str(&self) -> &'static str {
        match self {
            Payer::Private => "private",
            Payer::MedicalAid => "medical_aid",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "private" => Some(Payer::Private),
            "medical_aid" => Some(Payer::MedicalAid),
            _ => None,
        }
    }
}

/// Medical-aid membership details, required when the payer is a medical aid.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MedicalAid {
    /// Scheme name (e.g., "Discovery Health")
    pub scheme: String,
    /// Plan within the scheme
    pub plan: String,
    /// Member number
    pub member_no: String,
    /// Dependent number
    pub dependent_no: String,
}

/// A persisted patient record.
///
/// Names are stored display-cased; the storage layer keeps lowercase shadow
/// columns for case-insensitive matching. Phone is digits-only and email is
/// lowercased at write time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    /// Storage-assigned UUID, immutable
    pub id: String,
    /// Owning practice; None only on pre-tenancy legacy rows
    pub practice_id: Option<String>,
    pub first_name: String,
    pub last_name: String,
    /// Date of birth as an unvalidated `YYYY-MM-DD` string
    pub dob: String,
    /// Digits-only phone number
    pub phone: Option<String>,
    /// Lowercased email address
    pub email: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
    pub visit_type: VisitType,
    pub payer: Payer,
    /// Present iff payer is MedicalAid
    pub medical_aid: Option<MedicalAid>,
    /// RFC 3339 creation timestamp, stamped at insert, never updated
    pub created_at: String,
}

impl Patient {
    /// Phone if present, else email, else an empty string. Used in
    /// duplicate summaries and list views.
    pub fn contact(&self) -> &str {
        self.phone
            .as_deref()
            .filter(|p| !p.is_empty())
            .or(self.email.as_deref())
            .unwrap_or("")
    }
}

/// A candidate patient record, not yet persisted.
///
/// Fields arrive raw from the caller; normalization happens in the matcher
/// and at write time, never here.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PatientDraft {
    pub first_name: String,
    pub last_name: String,
    pub dob: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
    pub visit_type: Option<VisitType>,
    pub payer: Option<Payer>,
    pub medical_aid: Option<MedicalAid>,
}

/// A partial update: only `Some` fields are written.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PatientUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub dob: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
    pub visit_type: Option<VisitType>,
    pub payer: Option<Payer>,
    pub medical_aid: Option<MedicalAid>,
}

impl PatientUpdate {
    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.dob.is_none()
            && self.phone.is_none()
            && self.email.is_none()
            && self.address.is_none()
            && self.notes.is_none()
            && self.visit_type.is_none()
            && self.payer.is_none()
            && self.medical_aid.is_none()
    }
}

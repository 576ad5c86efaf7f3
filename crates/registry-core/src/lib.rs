//! Practice Registry Core Library
//!
//! Multi-practice patient registration with strict-equality duplicate
//! detection.
//!
//! # Architecture
//!
//! ```text
//! caller (form) ──► PatientDraft
//!                        │
//!                  Normalization
//!            (comparison form + display form)
//!                        │
//!                 Duplicate Matcher
//!        (name+dob, phone, email+name equality probes)
//!                        │
//!              ┌─────────┴─────────┐
//!        any match            no match
//!              │                   │
//!      DuplicateFoundError    insert into
//!      (summaries for         practice-scoped
//!       manual review)        patient store
//! ```
//!
//! Every operation takes the practice (tenant) id explicitly; the crate
//! holds no session state. Crossing practice boundaries (the all-practices
//! list and the legacy unscoped fallback) is always an explicit caller
//! decision, never a silent default.
//!
//! # Modules
//!
//! - [`db`]: SQLite storage layer (patients, practices, user allow-lists)
//! - [`models`]: Domain types (Patient, Practice, MedicalAid, etc.)
//! - [`registry`]: Normalization, duplicate matcher, repository and directory

pub mod db;
pub mod models;
pub mod registry;

// Re-export commonly used types
pub use db::{Database, DbError};
pub use models::{
    MedicalAid, Patient, PatientDraft, PatientUpdate, Payer, Practice, VisitType,
};
pub use registry::{
    DuplicateCandidate, DuplicateChecker, ListScope, PatientRegistry, RegistryError,
    RegistryResult,
};

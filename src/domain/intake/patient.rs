//! Patient types shared between the workflow and the directory port.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::PatientId;

/// Biological sex as recorded by the laboratory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    M,
    F,
}

impl Sex {
    /// Single-letter form stored by the directory.
    pub fn as_letter(&self) -> &'static str {
        match self {
            Self::M => "M",
            Self::F => "F",
        }
    }
}

/// A patient record as returned by the patient directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    pub id: PatientId,
    /// National/identity document id as registered.
    pub document_id: String,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: NaiveDate,
    pub sex: Sex,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl PatientRecord {
    /// Full display name.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Fields for creating a patient record through the directory port.
///
/// All required fields are present by construction; the registration
/// chain only builds this once every step has been answered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPatient {
    pub document_id: String,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: NaiveDate,
    pub sex: Sex,
    pub phone: String,
    pub email: Option<String>,
}

/// The patient a conversation has settled on, either verified against
/// the directory or freshly created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentifiedPatient {
    pub id: PatientId,
    pub first_name: String,
    pub last_name: String,
}

impl IdentifiedPatient {
    /// Builds the reference from a verified directory record.
    pub fn from_record(record: &PatientRecord) -> Self {
        Self {
            id: record.id,
            first_name: record.first_name.clone(),
            last_name: record.last_name.clone(),
        }
    }

    /// Builds the reference for a just-created patient.
    pub fn from_new(id: PatientId, new: &NewPatient) -> Self {
        Self {
            id,
            first_name: new.first_name.clone(),
            last_name: new.last_name.clone(),
        }
    }

    /// Full display name.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

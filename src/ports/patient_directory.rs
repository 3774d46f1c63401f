//! Patient Directory Port - identity lookup and registration.

use async_trait::async_trait;

use crate::domain::foundation::PatientId;
use crate::domain::intake::{NewPatient, PatientRecord};

/// Errors from the patient directory.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("Directory backend error: {0}")]
    BackendError(String),

    #[error("Patient already registered with document {0}")]
    DuplicateDocument(String),
}

/// Port for the external patient directory.
#[async_trait]
pub trait PatientDirectory: Send + Sync {
    /// Looks a patient up by internal id.
    async fn find_by_id(&self, id: &PatientId) -> Result<Option<PatientRecord>, DirectoryError>;

    /// Finds candidate records for a raw document id.
    ///
    /// Compound national ids are ambiguous; zero, one, or many records
    /// may come back and the workflow disambiguates.
    async fn find_candidates_by_external_id(
        &self,
        raw_id: &str,
    ) -> Result<Vec<PatientRecord>, DirectoryError>;

    /// Creates a patient record, returning its new id.
    async fn create(&self, patient: &NewPatient) -> Result<PatientId, DirectoryError>;
}

//! In-memory patient directory.
//!
//! Double for tests and the console demo. Lookup by external id
//! compares digit sequences, so compound national ids with different
//! letter prefixes ("V-123", "E-123") collide and produce the
//! ambiguous multi-candidate case the workflow must disambiguate.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::foundation::PatientId;
use crate::domain::intake::{NewPatient, PatientRecord, Sex};
use crate::ports::{DirectoryError, PatientDirectory};

/// Seeded, process-local patient directory.
pub struct InMemoryPatientDirectory {
    records: RwLock<Vec<PatientRecord>>,
    failing: AtomicBool,
}

impl InMemoryPatientDirectory {
    /// Empty directory.
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            failing: AtomicBool::new(false),
        }
    }

    /// Directory pre-populated with records.
    pub fn with_records(records: Vec<PatientRecord>) -> Self {
        Self {
            records: RwLock::new(records),
            failing: AtomicBool::new(false),
        }
    }

    /// Makes every call fail, for collaborator-failure tests.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of stored records (for test assertions).
    pub fn record_count(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    fn check_available(&self) -> Result<(), DirectoryError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(DirectoryError::BackendError(
                "directory unavailable".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for InMemoryPatientDirectory {
    fn default() -> Self {
        Self::new()
    }
}

fn digits_of(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

#[async_trait]
impl PatientDirectory for InMemoryPatientDirectory {
    async fn find_by_id(&self, id: &PatientId) -> Result<Option<PatientRecord>, DirectoryError> {
        self.check_available()?;
        let records = self
            .records
            .read()
            .map_err(|_| DirectoryError::BackendError("records lock poisoned".to_string()))?;
        Ok(records.iter().find(|r| &r.id == id).cloned())
    }

    async fn find_candidates_by_external_id(
        &self,
        raw_id: &str,
    ) -> Result<Vec<PatientRecord>, DirectoryError> {
        self.check_available()?;
        let digits = digits_of(raw_id);
        let records = self
            .records
            .read()
            .map_err(|_| DirectoryError::BackendError("records lock poisoned".to_string()))?;
        Ok(records
            .iter()
            .filter(|r| digits_of(&r.document_id) == digits)
            .cloned()
            .collect())
    }

    async fn create(&self, patient: &NewPatient) -> Result<PatientId, DirectoryError> {
        self.check_available()?;
        let mut records = self
            .records
            .write()
            .map_err(|_| DirectoryError::BackendError("records lock poisoned".to_string()))?;
        if records
            .iter()
            .any(|r| r.document_id.eq_ignore_ascii_case(&patient.document_id))
        {
            return Err(DirectoryError::DuplicateDocument(patient.document_id.clone()));
        }
        let id = PatientId::new();
        records.push(PatientRecord {
            id,
            document_id: patient.document_id.clone(),
            first_name: patient.first_name.clone(),
            last_name: patient.last_name.clone(),
            birth_date: patient.birth_date,
            sex: patient.sex,
            phone: Some(patient.phone.clone()),
            email: patient.email.clone(),
        });
        Ok(id)
    }
}

/// Fixture record builder shared by tests across the crate.
pub fn sample_record(document_id: &str, first: &str, last: &str, birth: (i32, u32, u32)) -> PatientRecord {
    PatientRecord {
        id: PatientId::new(),
        document_id: document_id.to_string(),
        first_name: first.to_string(),
        last_name: last.to_string(),
        birth_date: chrono::NaiveDate::from_ymd_opt(birth.0, birth.1, birth.2)
            .expect("valid fixture date"),
        sex: Sex::F,
        phone: None,
        email: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn directory() -> InMemoryPatientDirectory {
        InMemoryPatientDirectory::with_records(vec![
            sample_record("V-17371453", "María", "Gutiérrez", (1985, 2, 14)),
            sample_record("E-17371453", "Mario", "Gutiérrez", (1960, 7, 1)),
            sample_record("V-9988776", "Ana", "Pérez", (1992, 11, 3)),
        ])
    }

    #[tokio::test]
    async fn external_id_lookup_matches_by_digits() {
        let dir = directory();
        let candidates = dir.find_candidates_by_external_id("17371453").await.unwrap();
        assert_eq!(candidates.len(), 2);
    }

    #[tokio::test]
    async fn external_id_lookup_returns_empty_for_unknown() {
        let dir = directory();
        assert!(dir
            .find_candidates_by_external_id("V-00000000")
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn create_assigns_id_and_registers_record() {
        let dir = InMemoryPatientDirectory::new();
        let new = NewPatient {
            document_id: "V-123456".to_string(),
            first_name: "Luis".to_string(),
            last_name: "Rojas".to_string(),
            birth_date: NaiveDate::from_ymd_opt(1990, 5, 20).unwrap(),
            sex: Sex::M,
            phone: "04125551234".to_string(),
            email: None,
        };

        let id = dir.create(&new).await.unwrap();
        let found = dir.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(found.first_name, "Luis");
        assert_eq!(found.phone.as_deref(), Some("04125551234"));
    }

    #[tokio::test]
    async fn create_rejects_duplicate_document() {
        let dir = directory();
        let new = NewPatient {
            document_id: "v-9988776".to_string(),
            first_name: "Ana".to_string(),
            last_name: "Pérez".to_string(),
            birth_date: NaiveDate::from_ymd_opt(1992, 11, 3).unwrap(),
            sex: Sex::F,
            phone: "04125551234".to_string(),
            email: None,
        };
        assert!(matches!(
            dir.create(&new).await,
            Err(DirectoryError::DuplicateDocument(_))
        ));
    }

    #[tokio::test]
    async fn failing_directory_errors_every_call() {
        let dir = directory();
        dir.set_failing(true);
        assert!(dir.find_candidates_by_external_id("17371453").await.is_err());
    }
}

//! File-backed catalog and alias sources.
//!
//! The catalog document is a JSON array of `{id, name, code, price}`;
//! the alias document maps category -> { alias -> [canonical, ...] }.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::catalog::CatalogEntry;
use crate::domain::foundation::{CatalogEntryId, Price};
use crate::ports::{AliasSource, CatalogError, CatalogSource};

#[derive(Debug, Deserialize)]
struct CatalogDocEntry {
    id: String,
    name: String,
    #[serde(default)]
    code: String,
    price: f64,
}

/// Catalog source reading a JSON document from disk.
pub struct FileCatalogSource {
    path: PathBuf,
    name: String,
}

impl FileCatalogSource {
    /// Source for the given document path.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let name = format!("file:{}", path.display());
        Self { path, name }
    }
}

#[async_trait]
impl CatalogSource for FileCatalogSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn load(&self) -> Result<Vec<CatalogEntry>, CatalogError> {
        let raw = tokio::fs::read_to_string(&self.path).await.map_err(|err| {
            CatalogError::SourceFailed {
                source_name: self.name.clone(),
                reason: err.to_string(),
            }
        })?;
        let doc: Vec<CatalogDocEntry> = serde_json::from_str(&raw)
            .map_err(|err| CatalogError::MalformedDocument(err.to_string()))?;

        let mut entries = Vec::with_capacity(doc.len());
        for item in doc {
            let price = Price::from_decimal(item.price).map_err(|err| {
                CatalogError::MalformedDocument(format!("entry '{}': {}", item.id, err))
            })?;
            entries.push(CatalogEntry::new(
                CatalogEntryId::new(item.id),
                item.name,
                item.code,
                price,
            ));
        }
        Ok(entries)
    }
}

/// Alias source reading a JSON document from disk.
pub struct FileAliasSource {
    path: PathBuf,
    name: String,
}

impl FileAliasSource {
    /// Source for the given document path.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let name = format!("file:{}", path.display());
        Self { path, name }
    }
}

#[async_trait]
impl AliasSource for FileAliasSource {
    async fn load(&self) -> Result<HashMap<String, HashMap<String, Vec<String>>>, CatalogError> {
        let raw = tokio::fs::read_to_string(&self.path).await.map_err(|err| {
            CatalogError::SourceFailed {
                source_name: self.name.clone(),
                reason: err.to_string(),
            }
        })?;
        serde_json::from_str(&raw).map_err(|err| CatalogError::MalformedDocument(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn loads_entries_with_normalized_projections() {
        let file = write_temp(
            r#"[
                {"id": "hem-01", "name": "Hemograma Completo", "code": "HEM-01", "price": 15.0},
                {"id": "gli-01", "name": "Glicemia en Ayunas", "code": "GLI-01", "price": 9.0}
            ]"#,
        );
        let source = FileCatalogSource::new(file.path());

        let entries = source.load().await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].normalized_name(), "hemograma completo");
        assert_eq!(entries[0].price, Price::from_cents(1500));
    }

    #[tokio::test]
    async fn missing_file_reports_source_failure() {
        let source = FileCatalogSource::new("/nonexistent/catalog.json");
        assert!(matches!(
            source.load().await,
            Err(CatalogError::SourceFailed { .. })
        ));
    }

    #[tokio::test]
    async fn malformed_document_is_distinguished_from_io_failure() {
        let file = write_temp("{not json");
        let source = FileCatalogSource::new(file.path());
        assert!(matches!(
            source.load().await,
            Err(CatalogError::MalformedDocument(_))
        ));
    }

    #[tokio::test]
    async fn negative_price_is_a_malformed_document() {
        let file = write_temp(r#"[{"id": "x", "name": "X", "code": "X", "price": -1.0}]"#);
        let source = FileCatalogSource::new(file.path());
        assert!(matches!(
            source.load().await,
            Err(CatalogError::MalformedDocument(_))
        ));
    }

    #[tokio::test]
    async fn alias_document_roundtrips() {
        let file = write_temp(
            r#"{"perfiles": {"chequeo basico": ["Hemograma Completo", "Glicemia en Ayunas"]}}"#,
        );
        let source = FileAliasSource::new(file.path());

        let categories = source.load().await.unwrap();
        assert_eq!(categories["perfiles"]["chequeo basico"].len(), 2);
    }
}

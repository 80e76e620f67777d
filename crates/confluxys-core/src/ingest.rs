//! Document ingestion: metadata, hashing, text extraction, one insert.

use std::fs;
use std::path::Path;
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::error::{DecodeError, Result, StoreError};
use crate::formats::DocumentExtractor;
use crate::models::config::ConfluxysConfig;
use crate::models::document::Document;
use crate::pdf::{PdfWordSource, WordSource};
use crate::store::DocumentStore;

/// Turns source files into stored documents.
pub struct Ingestor<W: WordSource = PdfWordSource> {
    extractor: DocumentExtractor<W>,
    reject_duplicates: bool,
}

impl Ingestor<PdfWordSource> {
    pub fn from_config(config: &ConfluxysConfig) -> Self {
        Self::new(DocumentExtractor::from_config(config))
            .with_reject_duplicates(config.ingest.reject_duplicates)
    }
}

impl<W: WordSource> Ingestor<W> {
    pub fn new(extractor: DocumentExtractor<W>) -> Self {
        Self {
            extractor,
            reject_duplicates: true,
        }
    }

    pub fn with_reject_duplicates(mut self, reject: bool) -> Self {
        self.reject_duplicates = reject;
        self
    }

    /// Ingest one file.
    ///
    /// Everything is computed before the single insert, so a failure leaves
    /// the store untouched.
    pub fn ingest<S: DocumentStore>(&self, path: &Path, store: &mut S) -> Result<Document> {
        if !path.exists() {
            return Err(DecodeError::NotFound(path.to_path_buf()).into());
        }
        let path = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());

        if self.reject_duplicates && store.find_document_by_path(&path)?.is_some() {
            return Err(StoreError::DuplicateDocument(path).into());
        }

        let data = fs::read(&path).map_err(|source| DecodeError::Read {
            path: path.clone(),
            source,
        })?;
        let metadata = fs::metadata(&path)?;
        let ingested_at = Utc::now();

        let text = self.extractor.extract(&path)?;
        debug!("{}: {} pages extracted", path.display(), text.page_count);

        let mut document = Document {
            id: 0,
            file_name: path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default(),
            file_path: path.clone(),
            file_hash: content_hash(&data),
            file_size: metadata.len(),
            created_at: timestamp(metadata.created(), ingested_at),
            modified_at: timestamp(metadata.modified(), ingested_at),
            ingested_at,
            raw_text: text.raw_text,
            layout_text: text.layout_text,
            page_count: text.page_count,
        };

        document.id = store.insert_document(document.clone())?;
        info!("Ingested {} as document {}", path.display(), document.id);
        Ok(document)
    }
}

/// SHA-256 of `data`, lower-case hex.
pub fn content_hash(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}

fn timestamp(time: std::io::Result<SystemTime>, fallback: DateTime<Utc>) -> DateTime<Utc> {
    time.map(DateTime::<Utc>::from).unwrap_or(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfluxysError;
    use crate::layout::LayoutReconstructor;
    use crate::store::MemoryStore;
    use pretty_assertions::assert_eq;

    fn ingestor() -> Ingestor {
        Ingestor::new(DocumentExtractor::new(
            PdfWordSource::new(),
            LayoutReconstructor::default(),
            60,
        ))
    }

    #[test]
    fn test_content_hash() {
        assert_eq!(
            content_hash(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_ingest_text_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("order.txt");
        fs::write(&path, "ORDER FORM\nQuantity: 3").unwrap();
        let mut store = MemoryStore::new();

        let doc = ingestor().ingest(&path, &mut store).unwrap();

        assert_eq!(doc.id, 1);
        assert_eq!(doc.file_name, "order.txt");
        assert_eq!(doc.file_size, 22);
        assert_eq!(doc.page_count, 1);
        assert_eq!(doc.layout_text, "ORDER FORM\nQuantity: 3");
        assert_eq!(doc.file_hash, content_hash(b"ORDER FORM\nQuantity: 3"));
        assert_eq!(store.get_document(1).unwrap(), Some(doc));
    }

    #[test]
    fn test_duplicate_path_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("order.txt");
        fs::write(&path, "ORDER").unwrap();
        let mut store = MemoryStore::new();
        let strict = ingestor();

        strict.ingest(&path, &mut store).unwrap();
        let err = strict.ingest(&path, &mut store).unwrap_err();
        assert!(matches!(err, ConfluxysError::Store(StoreError::DuplicateDocument(_))));

        let lenient = ingestor().with_reject_duplicates(false);
        lenient.ingest(&path, &mut store).unwrap();
        assert_eq!(store.list_documents().unwrap().len(), 2);
    }

    #[test]
    fn test_failed_extraction_stores_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("broken.pdf");
        fs::write(&pdf, b"not a pdf").unwrap();
        let docx = dir.path().join("letter.docx");
        fs::write(&docx, b"PK").unwrap();
        let mut store = MemoryStore::new();

        let err = ingestor().ingest(&pdf, &mut store).unwrap_err();
        assert!(err.to_string().contains("broken.pdf"));
        let err = ingestor().ingest(&docx, &mut store).unwrap_err();
        assert!(matches!(
            err,
            ConfluxysError::Decode(DecodeError::UnsupportedFormat { .. })
        ));
        assert!(store.list_documents().unwrap().is_empty());
    }

    #[test]
    fn test_missing_file() {
        let mut store = MemoryStore::new();
        let err = ingestor()
            .ingest(Path::new("/no/such/file.txt"), &mut store)
            .unwrap_err();
        assert!(matches!(err, ConfluxysError::Decode(DecodeError::NotFound(_))));
    }
}

//! Workspace persisted as a single JSON file.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::{DocumentStore, MemoryStore, Result, RowStore, TemplateStore};
use crate::models::document::{Document, DocumentId};
use crate::models::template::{DocumentTypeId, ExtractedRow, Template};

/// A [`MemoryStore`] written to `<data_dir>/workspace.json` after every mutation.
///
/// A table rebuilt through [`RowStore::replace_rows`] costs a single write.
///
/// Writes go to a sibling temp file that is then renamed over the workspace,
/// so a crash mid-write leaves the previous state intact.
#[derive(Debug)]
pub struct JsonStore {
    path: PathBuf,
    state: MemoryStore,
    writes: u64,
}

impl JsonStore {
    /// Workspace file name inside the data directory.
    pub const FILE_NAME: &'static str = "workspace.json";

    /// Open the workspace in `data_dir`, creating the directory if needed.
    pub fn open(data_dir: &Path) -> Result<Self> {
        fs::create_dir_all(data_dir)?;
        let path = data_dir.join(Self::FILE_NAME);

        let state = if path.exists() {
            let content = fs::read_to_string(&path)?;
            serde_json::from_str(&content)?
        } else {
            MemoryStore::new()
        };

        info!("Opened workspace {}", path.display());
        Ok(Self {
            path,
            state,
            writes: 0,
        })
    }

    /// Path of the workspace file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The in-memory state.
    pub fn state(&self) -> &MemoryStore {
        &self.state
    }

    /// Number of times the workspace file was written since opening.
    pub fn writes(&self) -> u64 {
        self.writes
    }

    fn persist(&mut self) -> Result<()> {
        let content = serde_json::to_string_pretty(&self.state)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, content)?;
        fs::rename(&tmp, &self.path)?;
        self.writes += 1;
        debug!("Persisted workspace to {} (write {})", self.path.display(), self.writes);
        Ok(())
    }
}

impl DocumentStore for JsonStore {
    fn insert_document(&mut self, document: Document) -> Result<DocumentId> {
        let id = self.state.insert_document(document)?;
        self.persist()?;
        Ok(id)
    }

    fn get_document(&self, id: DocumentId) -> Result<Option<Document>> {
        self.state.get_document(id)
    }

    fn find_document_by_path(&self, path: &Path) -> Result<Option<Document>> {
        self.state.find_document_by_path(path)
    }

    fn list_documents(&self) -> Result<Vec<Document>> {
        self.state.list_documents()
    }
}

impl TemplateStore for JsonStore {
    fn create_template(&mut self, template: Template) -> Result<Template> {
        let created = self.state.create_template(template)?;
        self.persist()?;
        Ok(created)
    }

    fn replace_template(&mut self, id: DocumentTypeId, template: Template) -> Result<Template> {
        let replaced = self.state.replace_template(id, template)?;
        self.persist()?;
        Ok(replaced)
    }

    fn delete_template(&mut self, id: DocumentTypeId) -> Result<()> {
        self.state.delete_template(id)?;
        self.persist()
    }

    fn get_template(&self, id: DocumentTypeId) -> Result<Option<Template>> {
        self.state.get_template(id)
    }

    fn list_templates(&self) -> Result<Vec<Template>> {
        self.state.list_templates()
    }
}

impl RowStore for JsonStore {
    fn clear_table(&mut self, table: &str) -> Result<()> {
        self.state.clear_table(table)?;
        self.persist()
    }

    fn insert_row(&mut self, row: &ExtractedRow) -> Result<()> {
        self.state.insert_row(row)?;
        self.persist()
    }

    fn rows(&self, table: &str) -> Result<Vec<ExtractedRow>> {
        self.state.rows(table)
    }

    fn replace_rows(&mut self, table: &str, rows: &[ExtractedRow]) -> Result<()> {
        self.state.replace_rows(table, rows)?;
        self.persist()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::models::document::sample;
    use crate::models::template::sample_template;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_state_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();

        {
            let mut store = JsonStore::open(dir.path()).unwrap();
            store.insert_document(sample(0, "Total: 42", "Total: 42")).unwrap();
            store
                .create_template(sample_template("Invoice", "total", &[("total", r"Total: (\d+)")]))
                .unwrap();
            let mut row = ExtractedRow::new(1, "doc_invoice");
            row.values.push(("total".to_string(), "42".to_string()));
            store.insert_row(&row).unwrap();
        }

        let store = JsonStore::open(dir.path()).unwrap();
        assert_eq!(store.list_documents().unwrap().len(), 1);
        assert_eq!(store.list_templates().unwrap()[0].document_type.id, 1);
        assert_eq!(store.rows("doc_invoice").unwrap()[0].get("total"), Some("42"));
        assert!(store.path().ends_with(JsonStore::FILE_NAME));
        assert!(!store.path().with_extension("json.tmp").exists());
    }

    #[test]
    fn test_ids_continue_after_reopen() {
        let dir = tempfile::tempdir().unwrap();
        JsonStore::open(dir.path())
            .unwrap()
            .insert_document(sample(0, "a", "a"))
            .unwrap();

        let mut store = JsonStore::open(dir.path()).unwrap();
        assert_eq!(store.insert_document(sample(0, "b", "b")).unwrap(), 2);
    }

    #[test]
    fn test_replace_rows_writes_once() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonStore::open(dir.path()).unwrap();
        store
            .create_template(sample_template("Invoice", "total", &[("total", r"Total: (\d+)")]))
            .unwrap();
        let before = store.writes();

        let rows: Vec<ExtractedRow> = (1..=50)
            .map(|id| {
                let mut row = ExtractedRow::new(id, "doc_invoice");
                row.values.push(("total".to_string(), id.to_string()));
                row
            })
            .collect();
        store.replace_rows("doc_invoice", &rows).unwrap();

        assert_eq!(store.writes() - before, 1);
        let reopened = JsonStore::open(dir.path()).unwrap();
        assert_eq!(reopened.rows("doc_invoice").unwrap().len(), 50);
    }

    #[test]
    fn test_corrupt_workspace_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(JsonStore::FILE_NAME), "{not json").unwrap();

        let err = JsonStore::open(dir.path()).unwrap_err();
        assert!(matches!(err, StoreError::Serde(_)));
    }
}

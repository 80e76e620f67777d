//! In-memory workspace.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{DocumentStore, Result, RowStore, TemplateStore};
use crate::error::StoreError;
use crate::models::document::{Document, DocumentId};
use crate::models::template::{DocumentTypeId, ExtractedRow, Template};

/// A complete workspace held in memory.
///
/// The state is plain serde data, which is how [`super::JsonStore`]
/// persists it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryStore {
    last_document_id: DocumentId,
    last_type_id: DocumentTypeId,
    documents: BTreeMap<DocumentId, Document>,
    templates: BTreeMap<DocumentTypeId, Template>,
    tables: BTreeMap<String, Vec<ExtractedRow>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of every extracted-data table.
    pub fn table_names(&self) -> Vec<&str> {
        self.tables.keys().map(|t| t.as_str()).collect()
    }

    fn table_owner(&self, table: &str) -> Option<DocumentTypeId> {
        self.templates
            .values()
            .find(|t| t.document_type.table_name == table)
            .map(|t| t.document_type.id)
    }

    fn attach_fields(template: &mut Template, id: DocumentTypeId) {
        template.document_type.id = id;
        for (i, field) in template.fields.iter_mut().enumerate() {
            field.document_type_id = id;
            field.sort_order = i as u32 + 1;
        }
    }
}

impl DocumentStore for MemoryStore {
    fn insert_document(&mut self, mut document: Document) -> Result<DocumentId> {
        self.last_document_id += 1;
        let id = self.last_document_id;
        document.id = id;
        debug!("Stored document {} ({})", id, document.file_path.display());
        self.documents.insert(id, document);
        Ok(id)
    }

    fn get_document(&self, id: DocumentId) -> Result<Option<Document>> {
        Ok(self.documents.get(&id).cloned())
    }

    fn find_document_by_path(&self, path: &Path) -> Result<Option<Document>> {
        Ok(self
            .documents
            .values()
            .find(|d| d.file_path == path)
            .cloned())
    }

    fn list_documents(&self) -> Result<Vec<Document>> {
        Ok(self.documents.values().cloned().collect())
    }
}

impl TemplateStore for MemoryStore {
    fn create_template(&mut self, mut template: Template) -> Result<Template> {
        let table = template.document_type.table_name.clone();
        if self.table_owner(&table).is_some() {
            return Err(StoreError::DuplicateTable(table));
        }

        self.last_type_id += 1;
        let id = self.last_type_id;
        Self::attach_fields(&mut template, id);

        self.tables.insert(table, Vec::new());
        self.templates.insert(id, template.clone());
        debug!("Created document type {} ({})", id, template.document_type.name);
        Ok(template)
    }

    fn replace_template(&mut self, id: DocumentTypeId, mut template: Template) -> Result<Template> {
        let existing = self
            .templates
            .get(&id)
            .ok_or(StoreError::UnknownDocumentType(id))?;

        template.document_type.table_name = existing.document_type.table_name.clone();
        template.document_type.created_at = existing.document_type.created_at;
        Self::attach_fields(&mut template, id);

        self.templates.insert(id, template.clone());
        debug!("Replaced document type {} with {} fields", id, template.fields.len());
        Ok(template)
    }

    fn delete_template(&mut self, id: DocumentTypeId) -> Result<()> {
        let template = self
            .templates
            .remove(&id)
            .ok_or(StoreError::UnknownDocumentType(id))?;
        self.tables.remove(&template.document_type.table_name);
        debug!("Deleted document type {}", id);
        Ok(())
    }

    fn get_template(&self, id: DocumentTypeId) -> Result<Option<Template>> {
        Ok(self.templates.get(&id).cloned())
    }

    fn list_templates(&self) -> Result<Vec<Template>> {
        Ok(self.templates.values().cloned().collect())
    }
}

impl RowStore for MemoryStore {
    fn clear_table(&mut self, table: &str) -> Result<()> {
        self.tables.entry(table.to_string()).or_default().clear();
        Ok(())
    }

    fn insert_row(&mut self, row: &ExtractedRow) -> Result<()> {
        let rows = self
            .tables
            .get_mut(&row.table_name)
            .ok_or_else(|| StoreError::UnknownTable(row.table_name.clone()))?;
        rows.push(row.clone());
        Ok(())
    }

    fn rows(&self, table: &str) -> Result<Vec<ExtractedRow>> {
        self.tables
            .get(table)
            .cloned()
            .ok_or_else(|| StoreError::UnknownTable(table.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::document::sample;
    use crate::models::template::sample_template;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_document_ids_are_assigned() {
        let mut store = MemoryStore::new();
        let first = store.insert_document(sample(0, "a", "a")).unwrap();
        let second = store.insert_document(sample(0, "b", "b")).unwrap();

        assert_eq!((first, second), (1, 2));
        assert_eq!(store.get_document(2).unwrap().unwrap().layout_text, "b");
        assert_eq!(store.list_documents().unwrap().len(), 2);
        assert!(store.get_document(9).unwrap().is_none());
    }

    #[test]
    fn test_find_by_path() {
        let mut store = MemoryStore::new();
        let doc = sample(0, "a", "a");
        let path = doc.file_path.clone();
        store.insert_document(doc).unwrap();

        assert!(store.find_document_by_path(&path).unwrap().is_some());
        assert!(store.find_document_by_path(Path::new("/elsewhere.pdf")).unwrap().is_none());
    }

    #[test]
    fn test_create_template_assigns_ids_and_table() {
        let mut store = MemoryStore::new();
        let created = store
            .create_template(sample_template("Invoice", "INVOICE", &[("total", r"(\d+)")]))
            .unwrap();

        assert_eq!(created.document_type.id, 1);
        assert_eq!(created.fields[0].document_type_id, 1);
        assert_eq!(store.rows("doc_invoice").unwrap(), Vec::new());
    }

    #[test]
    fn test_table_names_are_unique() {
        let mut store = MemoryStore::new();
        store
            .create_template(sample_template("Invoice", "INVOICE", &[]))
            .unwrap();
        let err = store
            .create_template(sample_template("Invoice", "BILL", &[]))
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateTable(t) if t == "doc_invoice"));
        assert_eq!(store.list_templates().unwrap().len(), 1);
    }

    #[test]
    fn test_replace_keeps_identity_and_table() {
        let mut store = MemoryStore::new();
        let created = store
            .create_template(sample_template("Invoice", "INVOICE", &[("a", "a"), ("b", "b")]))
            .unwrap();

        let mut edited = sample_template("Renamed", "FACTURE", &[("b", "b")]);
        edited.document_type.table_name = "doc_other".to_string();
        let replaced = store.replace_template(created.document_type.id, edited).unwrap();

        assert_eq!(replaced.document_type.id, created.document_type.id);
        assert_eq!(replaced.document_type.table_name, "doc_invoice");
        assert_eq!(replaced.document_type.identifier_text, "FACTURE");
        assert_eq!(replaced.fields.len(), 1);
        assert_eq!(replaced.fields[0].sort_order, 1);
        assert!(matches!(
            store.replace_template(42, sample_template("X", "X", &[])),
            Err(StoreError::UnknownDocumentType(42))
        ));
    }

    #[test]
    fn test_delete_removes_rows() {
        let mut store = MemoryStore::new();
        let created = store
            .create_template(sample_template("Invoice", "INVOICE", &[("total", "x")]))
            .unwrap();
        let mut row = ExtractedRow::new(1, "doc_invoice");
        row.values.push(("total".to_string(), "42".to_string()));
        store.insert_row(&row).unwrap();

        store.delete_template(created.document_type.id).unwrap();

        assert!(store.get_template(created.document_type.id).unwrap().is_none());
        assert!(matches!(store.rows("doc_invoice"), Err(StoreError::UnknownTable(_))));
        assert!(store.table_names().is_empty());
    }

    #[test]
    fn test_rows_need_a_table() {
        let mut store = MemoryStore::new();
        let row = ExtractedRow::new(1, "doc_missing");
        assert!(matches!(store.insert_row(&row), Err(StoreError::UnknownTable(_))));

        store.clear_table("doc_missing").unwrap();
        store.insert_row(&row).unwrap();
        assert_eq!(store.rows("doc_missing").unwrap(), vec![row]);
    }
}

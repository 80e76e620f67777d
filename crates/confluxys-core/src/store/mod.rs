//! Persistence collaborator boundary.
//!
//! The core never reaches for a shared handle: every component receives the
//! store it works against as a parameter. Values cross the boundary as typed
//! structs, so user text is never spliced into a command string.

mod json;
mod memory;

pub use json::JsonStore;
pub use memory::MemoryStore;

use std::path::Path;

use crate::error::StoreError;
use crate::models::document::{Document, DocumentId};
use crate::models::template::{DocumentTypeId, ExtractedRow, Template};

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Ingested documents.
pub trait DocumentStore {
    /// Persist a document and return its assigned identity.
    fn insert_document(&mut self, document: Document) -> Result<DocumentId>;

    /// Fetch one document.
    fn get_document(&self, id: DocumentId) -> Result<Option<Document>>;

    /// Fetch the document ingested from `path`, if any.
    fn find_document_by_path(&self, path: &Path) -> Result<Option<Document>>;

    /// Every document, in id order.
    fn list_documents(&self) -> Result<Vec<Document>>;
}

/// Document types and their fields.
pub trait TemplateStore {
    /// Persist a new template, assigning ids. Fails if the table name is taken.
    fn create_template(&mut self, template: Template) -> Result<Template>;

    /// Replace a template's type record and all of its fields.
    ///
    /// The identity, creation time, and table name of the stored type are kept.
    fn replace_template(&mut self, id: DocumentTypeId, template: Template) -> Result<Template>;

    /// Remove a template, its fields, and every row of its table.
    fn delete_template(&mut self, id: DocumentTypeId) -> Result<()>;

    /// Fetch one template.
    fn get_template(&self, id: DocumentTypeId) -> Result<Option<Template>>;

    /// Every template, in id order.
    fn list_templates(&self) -> Result<Vec<Template>>;
}

/// Per-type extracted-data tables.
pub trait RowStore {
    /// Delete every row of `table`, creating it if absent.
    fn clear_table(&mut self, table: &str) -> Result<()>;

    /// Append one row to its table.
    fn insert_row(&mut self, row: &ExtractedRow) -> Result<()>;

    /// Rows of `table` in insertion order.
    fn rows(&self, table: &str) -> Result<Vec<ExtractedRow>>;

    /// Swap the whole content of `table` for `rows` as one unit.
    fn replace_rows(&mut self, table: &str, rows: &[ExtractedRow]) -> Result<()> {
        self.clear_table(table)?;
        for row in rows {
            self.insert_row(row)?;
        }
        Ok(())
    }
}

/// Everything a full workspace provides.
pub trait Store: DocumentStore + TemplateStore + RowStore {}

impl<T: DocumentStore + TemplateStore + RowStore> Store for T {}

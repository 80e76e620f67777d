//! Full rebuild of every document type's table.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::{error, info};

use super::engine::MatchingEngine;
use crate::error::{Result, StoreError};
use crate::models::document::{Document, DocumentId};
use crate::models::template::Template;
use crate::store::{DocumentStore, RowStore, TemplateStore};

/// A type whose pass was abandoned.
#[derive(Debug, Serialize)]
pub struct TypeFailure {
    pub table: String,
    #[serde(serialize_with = "serialize_error")]
    pub error: StoreError,
}

fn serialize_error<S: serde::Serializer>(error: &StoreError, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_str(&error.to_string())
}

/// Outcome of a reprocessing run.
#[derive(Debug, Default, Serialize)]
pub struct ReprocessReport {
    /// Distinct documents that produced at least one row.
    pub documents_processed: usize,
    /// Rows written across all types.
    pub rows_written: usize,
    /// Types whose pass completed.
    pub types_processed: usize,
    /// Types whose pass failed.
    pub failures: Vec<TypeFailure>,
}

impl ReprocessReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Rebuilds every type's table from the current documents and templates.
pub struct Reprocessor<'a> {
    engine: &'a MatchingEngine,
}

impl<'a> Reprocessor<'a> {
    pub fn new(engine: &'a MatchingEngine) -> Self {
        Self { engine }
    }

    /// Reprocess everything.
    ///
    /// Each type's table is cleared and rewritten as one unit; a store error
    /// abandons that type only. The exclusive borrow of `store` keeps every
    /// delete-then-rewrite sequence single-writer.
    pub fn reprocess_all<S>(&self, store: &mut S) -> Result<ReprocessReport>
    where
        S: DocumentStore + TemplateStore + RowStore,
    {
        let documents = store.list_documents()?;
        let templates = store.list_templates()?;
        info!(
            "Reprocessing {} documents against {} document types",
            documents.len(),
            templates.len()
        );

        let mut report = ReprocessReport::default();
        let mut emitted: BTreeSet<DocumentId> = BTreeSet::new();

        for template in &templates {
            let table = template.document_type.table_name.clone();
            match self.rebuild_type(store, template, &documents, &mut emitted) {
                Ok(rows) => {
                    info!("Rebuilt {} with {} rows", table, rows);
                    report.rows_written += rows;
                    report.types_processed += 1;
                }
                Err(e) => {
                    error!("Reprocessing {} failed: {}", table, e);
                    report.failures.push(TypeFailure { table, error: e });
                }
            }
        }

        report.documents_processed = emitted.len();
        Ok(report)
    }

    fn rebuild_type<S>(
        &self,
        store: &mut S,
        template: &Template,
        documents: &[Document],
        emitted: &mut BTreeSet<DocumentId>,
    ) -> std::result::Result<usize, StoreError>
    where
        S: RowStore,
    {
        let document_type = &template.document_type;
        let fields = self.engine.compile(&template.fields);

        let rows: Vec<_> = documents
            .iter()
            .filter_map(|document| self.engine.process(document, document_type, &fields))
            .collect();

        store.replace_rows(&document_type.table_name, &rows)?;
        emitted.extend(rows.iter().map(|row| row.document_id));
        Ok(rows.len())
    }
}

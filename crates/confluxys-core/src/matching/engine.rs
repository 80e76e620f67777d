//! Type membership and field extraction.

use regex::{Regex, RegexBuilder};
use tracing::{debug, trace, warn};

use crate::error::PatternError;
use crate::models::config::{EmptyRowPolicy, ExtractionConfig};
use crate::models::document::Document;
use crate::models::template::{DocumentField, DocumentType, ExtractedRow};

/// A field's pattern, compiled once per pass.
#[derive(Debug, Clone)]
pub struct CompiledField {
    pub field_name: String,
    pub column_name: String,
    pub pattern: Result<Regex, PatternError>,
}

/// The fields of one document type, in `sort_order`.
#[derive(Debug, Clone, Default)]
pub struct CompiledFields {
    fields: Vec<CompiledField>,
}

impl CompiledFields {
    pub fn iter(&self) -> impl Iterator<Item = &CompiledField> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Patterns that failed to compile.
    pub fn errors(&self) -> Vec<&PatternError> {
        self.fields
            .iter()
            .filter_map(|f| f.pattern.as_ref().err())
            .collect()
    }
}

/// Decides which documents belong to a type and pulls field values out of them.
#[derive(Debug, Clone, Default)]
pub struct MatchingEngine {
    config: ExtractionConfig,
}

impl MatchingEngine {
    /// Create an engine with the given configuration.
    pub fn new(config: ExtractionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// A document is an instance of a type iff the identifier occurs in
    /// either text variant, ignoring case.
    pub fn matches(&self, document: &Document, document_type: &DocumentType) -> bool {
        document.contains_ignore_case(&document_type.identifier_text)
    }

    /// Compile a single user-authored pattern.
    ///
    /// Case-insensitive and multi-line: `^`/`$` anchor per line and `.` does
    /// not cross newlines. Program and cache sizes are bounded so a
    /// pathological pattern fails to compile instead of exhausting memory.
    pub fn compile_pattern(&self, field_name: &str, pattern: &str) -> Result<Regex, PatternError> {
        RegexBuilder::new(pattern)
            .case_insensitive(true)
            .multi_line(true)
            .size_limit(self.config.regex_size_limit)
            .dfa_size_limit(self.config.dfa_size_limit)
            .build()
            .map_err(|e| PatternError {
                field: field_name.to_string(),
                reason: e.to_string(),
            })
    }

    /// Compile every field, ordered by `sort_order`. Failures are kept per field.
    pub fn compile(&self, fields: &[DocumentField]) -> CompiledFields {
        let mut ordered: Vec<&DocumentField> = fields.iter().collect();
        ordered.sort_by_key(|f| f.sort_order);

        let fields = ordered
            .into_iter()
            .map(|field| CompiledField {
                field_name: field.field_name.clone(),
                column_name: field.column_name.clone(),
                pattern: self.compile_pattern(&field.field_name, &field.regex_pattern),
            })
            .collect();

        CompiledFields { fields }
    }

    /// Capture one field's value: layout text first, then raw text.
    ///
    /// The first text the pattern matches decides the value. A group 1 that
    /// takes no part in that match yields an empty value.
    pub fn capture(&self, regex: &Regex, document: &Document) -> Option<String> {
        if regex.captures_len() < 2 {
            return None;
        }
        let caps = document
            .texts()
            .into_iter()
            .find_map(|text| regex.captures(text))?;
        Some(
            caps.get(1)
                .map(|m| m.as_str().trim().to_string())
                .unwrap_or_default(),
        )
    }

    /// Extract a row for a (document, type) pair.
    ///
    /// Malformed or non-matching fields are left out of the row. With no
    /// values at all the outcome follows the configured [`EmptyRowPolicy`].
    pub fn extract(
        &self,
        document: &Document,
        document_type: &DocumentType,
        fields: &CompiledFields,
    ) -> Option<ExtractedRow> {
        let mut row = ExtractedRow::new(document.id, &document_type.table_name);

        for field in fields.iter() {
            let regex = match &field.pattern {
                Ok(regex) => regex,
                Err(e) => {
                    warn!(
                        "Skipping field {} of {}: {}",
                        field.field_name, document_type.name, e.reason
                    );
                    continue;
                }
            };

            match self.capture(regex, document) {
                Some(value) => {
                    trace!("{}.{} = {:?}", document_type.table_name, field.column_name, value);
                    row.values.push((field.column_name.clone(), value));
                }
                None => debug!(
                    "Field {} of {} did not match document {}",
                    field.field_name, document_type.name, document.id
                ),
            }
        }

        if row.is_empty() && self.config.empty_row_policy == EmptyRowPolicy::Skip {
            return None;
        }
        Some(row)
    }

    /// Membership test and extraction in one step.
    pub fn process(
        &self,
        document: &Document,
        document_type: &DocumentType,
        fields: &CompiledFields,
    ) -> Option<ExtractedRow> {
        if !self.matches(document, document_type) {
            return None;
        }
        self.extract(document, document_type, fields)
    }
}

//! Template authoring sessions.
//!
//! A draft collects fields one example at a time, synthesizing a pattern for
//! each. Nothing reaches the store until [`TemplateDraft::build`] accepts the
//! whole draft.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::synthesizer::{column_name, synthesize_pattern, table_name};
use crate::error::ValidationError;
use crate::matching::MatchingEngine;
use crate::models::document::Document;
use crate::models::template::{DataType, DocumentField, DocumentType, DocumentTypeId, Template};

/// Result type for authoring operations.
pub type Result<T> = std::result::Result<T, ValidationError>;

/// One field as the author describes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDraft {
    /// Human-facing field name.
    pub name: String,

    /// Excerpt containing the example value.
    pub context: String,

    /// The example value, exactly as it appears in `context`.
    pub value: String,

    /// Advisory type tag.
    #[serde(default)]
    pub data_type: DataType,

    /// Pattern to use instead of the synthesized one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

impl FieldDraft {
    pub fn new(name: impl Into<String>, context: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            context: context.into(),
            value: value.into(),
            data_type: DataType::Text,
            pattern: None,
        }
    }

    pub fn with_data_type(mut self, data_type: DataType) -> Self {
        self.data_type = data_type;
        self
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }
}

/// A whole template as written in a draft file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftFile {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub identifier: String,
    #[serde(default)]
    pub fields: Vec<FieldDraft>,
}

impl DraftFile {
    /// Replay the file into an authoring session.
    pub fn into_draft(self, engine: MatchingEngine) -> Result<TemplateDraft> {
        let mut draft =
            TemplateDraft::new(self.name, self.description, self.identifier).with_engine(engine);
        for field in self.fields {
            draft.add_field(field)?;
        }
        Ok(draft)
    }
}

/// What a draft would extract from one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Preview {
    /// Whether the identifier text occurs in the document.
    pub identifier_found: bool,
    pub fields: Vec<FieldPreview>,
}

/// Outcome for a single field of a [`Preview`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldPreview {
    pub field_name: String,
    pub column_name: String,
    pub pattern: String,
    pub value: Option<String>,
    pub error: Option<String>,
}

/// Identity of the template being edited, kept across replace-on-edit.
#[derive(Debug, Clone)]
struct Existing {
    id: DocumentTypeId,
    table_name: String,
    created_at: DateTime<Utc>,
}

/// An authoring session for one template.
#[derive(Debug, Clone)]
pub struct TemplateDraft {
    name: String,
    description: String,
    identifier: String,
    fields: Vec<DocumentField>,
    engine: MatchingEngine,
    existing: Option<Existing>,
}

impl TemplateDraft {
    /// Start a new template.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        identifier: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            identifier: identifier.into(),
            fields: Vec::new(),
            engine: MatchingEngine::default(),
            existing: None,
        }
    }

    /// Reopen a stored template for editing.
    pub fn from_template(template: &Template) -> Self {
        let document_type = &template.document_type;
        Self {
            name: document_type.name.clone(),
            description: document_type.description.clone(),
            identifier: document_type.identifier_text.clone(),
            fields: template.ordered_fields().into_iter().cloned().collect(),
            engine: MatchingEngine::default(),
            existing: Some(Existing {
                id: document_type.id,
                table_name: document_type.table_name.clone(),
                created_at: document_type.created_at,
            }),
        }
    }

    /// Use `engine` for pattern validation and previews.
    pub fn with_engine(mut self, engine: MatchingEngine) -> Self {
        self.engine = engine;
        self
    }

    /// Keep the stored identity of `template` while taking this draft's content.
    pub fn editing(mut self, template: &Template) -> Self {
        let edited = Self::from_template(template);
        self.existing = edited.existing;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub fn set_identifier(&mut self, identifier: impl Into<String>) {
        self.identifier = identifier.into();
    }

    /// Id of the template being edited, if any.
    pub fn editing_id(&self) -> Option<DocumentTypeId> {
        self.existing.as_ref().map(|e| e.id)
    }

    /// Fields in order.
    pub fn fields(&self) -> &[DocumentField] {
        &self.fields
    }

    /// Validate and append a field.
    pub fn add_field(&mut self, draft: FieldDraft) -> Result<&DocumentField> {
        let field = self.make_field(draft, None)?;
        debug!("Field {} -> {}", field.field_name, field.regex_pattern);
        self.fields.push(field);
        self.renumber();
        Ok(&self.fields[self.fields.len() - 1])
    }

    /// Replace the field at `index` with a re-validated one.
    pub fn update_field(&mut self, index: usize, draft: FieldDraft) -> Result<&DocumentField> {
        if index >= self.fields.len() {
            return Err(ValidationError::FieldIndex(index));
        }
        let field = self.make_field(draft, Some(index))?;
        self.fields[index] = field;
        self.renumber();
        Ok(&self.fields[index])
    }

    /// Remove the field at `index`.
    pub fn remove_field(&mut self, index: usize) -> Result<DocumentField> {
        if index >= self.fields.len() {
            return Err(ValidationError::FieldIndex(index));
        }
        let field = self.fields.remove(index);
        self.renumber();
        Ok(field)
    }

    /// Move the field at `from` so it ends up at `to`.
    pub fn move_field(&mut self, from: usize, to: usize) -> Result<()> {
        let len = self.fields.len();
        if from >= len {
            return Err(ValidationError::FieldIndex(from));
        }
        if to >= len {
            return Err(ValidationError::FieldIndex(to));
        }
        let field = self.fields.remove(from);
        self.fields.insert(to, field);
        self.renumber();
        Ok(())
    }

    /// Replace a synthesized pattern by hand. The pattern must compile.
    pub fn override_pattern(&mut self, index: usize, pattern: impl Into<String>) -> Result<()> {
        let pattern = pattern.into();
        let field = self
            .fields
            .get_mut(index)
            .ok_or(ValidationError::FieldIndex(index))?;

        self.engine
            .compile_pattern(&field.field_name, &pattern)
            .map_err(|e| ValidationError::InvalidPattern {
                field: e.field,
                reason: e.reason,
            })?;
        field.regex_pattern = pattern;
        Ok(())
    }

    /// Run the draft against a sample document without storing anything.
    pub fn preview(&self, document: &Document) -> Preview {
        let document_type = self.document_type();
        let compiled = self.engine.compile(&self.fields);

        let fields = compiled
            .iter()
            .zip(self.fields.iter())
            .map(|(compiled, field)| {
                let (value, error) = match &compiled.pattern {
                    Ok(regex) => (self.engine.capture(regex, document), None),
                    Err(e) => (None, Some(e.reason.clone())),
                };
                FieldPreview {
                    field_name: compiled.field_name.clone(),
                    column_name: compiled.column_name.clone(),
                    pattern: field.regex_pattern.clone(),
                    value,
                    error,
                }
            })
            .collect();

        Preview {
            identifier_found: self.engine.matches(document, &document_type),
            fields,
        }
    }

    /// Validate the whole draft and produce a template ready for the store.
    pub fn build(&self) -> Result<Template> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingTemplateName);
        }
        if self.identifier.trim().is_empty() {
            return Err(ValidationError::MissingIdentifier);
        }
        if self.fields.is_empty() {
            return Err(ValidationError::NoFields);
        }

        let document_type = self.document_type();
        let fields = self
            .fields
            .iter()
            .map(|field| DocumentField {
                document_type_id: document_type.id,
                ..field.clone()
            })
            .collect();
        let template = Template {
            document_type,
            fields,
        };
        info!(
            "Built template {} with {} fields for table {}",
            template.document_type.name,
            template.fields.len(),
            template.document_type.table_name
        );
        Ok(template)
    }

    fn document_type(&self) -> DocumentType {
        let (id, table, created_at) = match &self.existing {
            Some(e) => (e.id, e.table_name.clone(), e.created_at),
            None => (0, table_name(&self.name), Utc::now()),
        };
        DocumentType {
            id,
            name: self.name.clone(),
            description: self.description.clone(),
            identifier_text: self.identifier.clone(),
            table_name: table,
            created_at,
        }
    }

    fn make_field(&self, draft: FieldDraft, replacing: Option<usize>) -> Result<DocumentField> {
        let name = draft.name.trim();
        if name.is_empty() {
            return Err(ValidationError::MissingFieldName);
        }
        if draft.value.is_empty() {
            return Err(ValidationError::EmptyFieldValue(name.to_string()));
        }
        if !draft.context.contains(&draft.value) {
            return Err(ValidationError::ValueNotInContext {
                field: name.to_string(),
            });
        }

        let column = column_name(name);
        let taken = self
            .fields
            .iter()
            .enumerate()
            .any(|(i, f)| Some(i) != replacing && f.column_name == column);
        if taken {
            return Err(ValidationError::DuplicateColumn { column });
        }

        let regex_pattern = match draft.pattern {
            Some(pattern) => {
                self.engine.compile_pattern(name, &pattern).map_err(|e| {
                    ValidationError::InvalidPattern {
                        field: e.field,
                        reason: e.reason,
                    }
                })?;
                pattern
            }
            None => synthesize_pattern(&draft.context, &draft.value),
        };

        Ok(DocumentField {
            document_type_id: self.editing_id().unwrap_or(0),
            field_name: name.to_string(),
            column_name: column,
            context_text: draft.context,
            field_text: draft.value,
            regex_pattern,
            data_type: draft.data_type,
            sort_order: 0,
        })
    }

    fn renumber(&mut self) {
        for (i, field) in self.fields.iter_mut().enumerate() {
            field.sort_order = i as u32 + 1;
        }
    }
}

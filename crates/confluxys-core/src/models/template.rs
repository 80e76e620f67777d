//! Document type ("template") and field definitions, plus extracted rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::document::DocumentId;

/// Identity assigned to a document type by the store.
pub type DocumentTypeId = u64;

/// Declared data type of a field.
///
/// Advisory only: extraction always yields text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DataType {
    #[default]
    Text,
    Integer,
    Real,
    Date,
}

impl DataType {
    /// Parse a type tag, case-insensitively.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "TEXT" => Some(Self::Text),
            "INTEGER" | "INT" => Some(Self::Integer),
            "REAL" | "FLOAT" => Some(Self::Real),
            "DATE" => Some(Self::Date),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "TEXT",
            Self::Integer => "INTEGER",
            Self::Real => "REAL",
            Self::Date => "DATE",
        }
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recognizer for one kind of document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentType {
    /// Store-assigned identity (0 until created).
    #[serde(default)]
    pub id: DocumentTypeId,

    /// Display name.
    pub name: String,

    /// Free-text description.
    #[serde(default)]
    pub description: String,

    /// Literal substring whose presence marks a document as this type.
    pub identifier_text: String,

    /// Target table for extracted rows; unique across types.
    pub table_name: String,

    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// One pattern-backed extraction target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentField {
    /// Owning document type.
    #[serde(default)]
    pub document_type_id: DocumentTypeId,

    /// Human-facing name.
    pub field_name: String,

    /// Column derived from `field_name`; unique within the type.
    pub column_name: String,

    /// Excerpt the example value was highlighted in.
    pub context_text: String,

    /// The example value itself.
    pub field_text: String,

    /// Pattern with one capture group.
    pub regex_pattern: String,

    /// Advisory type tag.
    #[serde(default)]
    pub data_type: DataType,

    /// 1-based position; dense within the type.
    pub sort_order: u32,
}

/// A document type together with its ordered fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub document_type: DocumentType,
    pub fields: Vec<DocumentField>,
}

impl Template {
    /// Fields ordered by `sort_order`.
    pub fn ordered_fields(&self) -> Vec<&DocumentField> {
        let mut fields: Vec<&DocumentField> = self.fields.iter().collect();
        fields.sort_by_key(|f| f.sort_order);
        fields
    }

    /// Column names in field order.
    pub fn columns(&self) -> Vec<&str> {
        self.ordered_fields()
            .into_iter()
            .map(|f| f.column_name.as_str())
            .collect()
    }
}

/// Values extracted from one document for one document type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedRow {
    /// Source document.
    pub document_id: DocumentId,

    /// Owning type's target table.
    pub table_name: String,

    /// `(column, value)` pairs in field order.
    pub values: Vec<(String, String)>,
}

impl ExtractedRow {
    pub fn new(document_id: DocumentId, table_name: impl Into<String>) -> Self {
        Self {
            document_id,
            table_name: table_name.into(),
            values: Vec::new(),
        }
    }

    /// Look up a value by column.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Build a template whose fields are `(column, pattern)` pairs.
#[cfg(test)]
pub(crate) fn sample_template(name: &str, identifier: &str, fields: &[(&str, &str)]) -> Template {
    Template {
        document_type: DocumentType {
            id: 0,
            name: name.to_string(),
            description: String::new(),
            identifier_text: identifier.to_string(),
            table_name: format!("doc_{}", name.to_lowercase()),
            created_at: Utc::now(),
        },
        fields: fields
            .iter()
            .enumerate()
            .map(|(i, (column, pattern))| DocumentField {
                document_type_id: 0,
                field_name: column.to_string(),
                column_name: column.to_string(),
                context_text: String::new(),
                field_text: String::new(),
                regex_pattern: pattern.to_string(),
                data_type: DataType::Text,
                sort_order: i as u32 + 1,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_type_parsing() {
        assert_eq!(DataType::from_str("text"), Some(DataType::Text));
        assert_eq!(DataType::from_str(" INTEGER "), Some(DataType::Integer));
        assert_eq!(DataType::from_str("real"), Some(DataType::Real));
        assert_eq!(DataType::from_str("Date"), Some(DataType::Date));
        assert_eq!(DataType::from_str("blob"), None);
    }

    #[test]
    fn test_data_type_serializes_uppercase() {
        let json = serde_json::to_string(&DataType::Integer).unwrap();
        assert_eq!(json, "\"INTEGER\"");
    }

    #[test]
    fn test_row_lookup() {
        let mut row = ExtractedRow::new(7, "doc_invoice");
        row.values.push(("total".to_string(), "42".to_string()));
        assert_eq!(row.get("total"), Some("42"));
        assert_eq!(row.get("missing"), None);
        assert!(!row.is_empty());
    }
}

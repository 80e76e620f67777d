//! Ingested document model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Identity assigned to a document by the store.
pub type DocumentId = u64;

/// An ingested source file with its reconstructed text.
///
/// Immutable once ingested. The core only ever holds copies; the store owns
/// the canonical record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Store-assigned identity (0 until inserted).
    #[serde(default)]
    pub id: DocumentId,

    /// Absolute or user-supplied source path.
    pub file_path: PathBuf,

    /// File name component of `file_path`.
    pub file_name: String,

    /// SHA-256 of the file contents, lower-case hex.
    pub file_hash: String,

    /// Size in bytes.
    pub file_size: u64,

    /// File creation time (falls back to ingestion time when unavailable).
    pub created_at: DateTime<Utc>,

    /// File modification time.
    pub modified_at: DateTime<Utc>,

    /// Time the document entered the store.
    pub ingested_at: DateTime<Utc>,

    /// Reading-order text.
    pub raw_text: String,

    /// Line-clustered text.
    pub layout_text: String,

    /// Number of pages processed.
    pub page_count: u32,
}

impl Document {
    /// Check whether either text variant contains `needle`, ignoring case.
    pub fn contains_ignore_case(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.layout_text.to_lowercase().contains(&needle)
            || self.raw_text.to_lowercase().contains(&needle)
    }

    /// The texts to search, in precedence order.
    pub fn texts(&self) -> [&str; 2] {
        [&self.layout_text, &self.raw_text]
    }
}

#[cfg(test)]
pub(crate) fn sample(id: DocumentId, layout_text: &str, raw_text: &str) -> Document {
    let now = Utc::now();
    Document {
        id,
        file_path: PathBuf::from(format!("/docs/{id}.pdf")),
        file_name: format!("{id}.pdf"),
        file_hash: String::new(),
        file_size: 0,
        created_at: now,
        modified_at: now,
        ingested_at: now,
        raw_text: raw_text.to_string(),
        layout_text: layout_text.to_string(),
        page_count: 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_ignore_case_checks_both_texts() {
        let doc = sample(1, "RECIPE COLLECTION", "unrelated");
        assert!(doc.contains_ignore_case("recipe collection"));

        let doc = sample(2, "", "Poetry Anthology");
        assert!(doc.contains_ignore_case("POETRY ANTHOLOGY"));
        assert!(!doc.contains_ignore_case("recipe"));
    }
}

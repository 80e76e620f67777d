//! Configuration structures for ingestion and extraction.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for confluxys.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfluxysConfig {
    /// Layout reconstruction configuration.
    pub layout: LayoutConfig,

    /// Field extraction configuration.
    pub extraction: ExtractionConfig,

    /// Ingestion configuration.
    pub ingest: IngestConfig,

    /// Store configuration.
    pub store: StoreConfig,
}

/// Layout reconstruction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Maximum baseline difference (page units) for two words to share a line.
    pub line_tolerance: f64,

    /// Page boundary marker; `{n}` is replaced by the 1-based page number.
    pub page_marker: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            line_tolerance: 1.0,
            page_marker: "--- Page {n} ---".to_string(),
        }
    }
}

impl LayoutConfig {
    /// Render the page marker for page `n`.
    pub fn marker(&self, n: u32) -> String {
        self.page_marker.replace("{n}", &n.to_string())
    }
}

/// What to emit when a document matches a type but no field matched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyRowPolicy {
    /// Emit nothing for the pair.
    #[default]
    Skip,
    /// Emit a row carrying only the document id.
    DocumentIdOnly,
}

/// Field extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Policy for matched documents with zero extracted fields.
    pub empty_row_policy: EmptyRowPolicy,

    /// Compiled program size bound for user-authored patterns (bytes).
    pub regex_size_limit: usize,

    /// Lazy DFA cache bound for user-authored patterns (bytes).
    pub dfa_size_limit: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            empty_row_policy: EmptyRowPolicy::Skip,
            regex_size_limit: 1 << 20,
            dfa_size_limit: 2 << 20,
        }
    }
}

/// Ingestion configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Lines per page when estimating page counts of unpaginated formats.
    pub lines_per_page: usize,

    /// Refuse to ingest a path that is already stored.
    pub reject_duplicates: bool,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            lines_per_page: 60,
            reject_duplicates: true,
        }
    }
}

/// Store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory holding the workspace file.
    pub data_dir: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".confluxys"),
        }
    }
}

impl ConfluxysConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: ConfluxysConfig =
            serde_json::from_str(r#"{"extraction": {"empty_row_policy": "document_id_only"}}"#)
                .unwrap();
        assert_eq!(config.extraction.empty_row_policy, EmptyRowPolicy::DocumentIdOnly);
        assert_eq!(config.extraction.regex_size_limit, 1 << 20);
        assert_eq!(config.layout.line_tolerance, 1.0);
        assert_eq!(config.ingest.lines_per_page, 60);
    }

    #[test]
    fn test_page_marker() {
        let layout = LayoutConfig::default();
        assert_eq!(layout.marker(3), "--- Page 3 ---");
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = ConfluxysConfig::default();
        config.layout.line_tolerance = 2.5;
        config.save(&path).unwrap();

        let loaded = ConfluxysConfig::from_file(&path).unwrap();
        assert_eq!(loaded.layout.line_tolerance, 2.5);
    }
}

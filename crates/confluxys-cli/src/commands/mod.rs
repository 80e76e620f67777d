//! Command implementations and the helpers they share.

pub mod config;
pub mod documents;
pub mod ingest;
pub mod reprocess;
pub mod rows;
pub mod synthesize;
pub mod template;

use std::path::{Path, PathBuf};

use console::style;
use tracing::debug;

use confluxys_core::models::config::ConfluxysConfig;
use confluxys_core::{JsonStore, MatchingEngine, ReprocessReport, Reprocessor};

/// Options every command receives.
pub struct GlobalOptions {
    /// Explicit config file (`-c`).
    pub config: Option<PathBuf>,
    /// Workspace directory override (`--data-dir`).
    pub data_dir: Option<PathBuf>,
}

impl GlobalOptions {
    /// Load the config: the explicit file, else the default file if present,
    /// else built-in defaults.
    pub fn load_config(&self) -> anyhow::Result<ConfluxysConfig> {
        if let Some(path) = &self.config {
            return Ok(ConfluxysConfig::from_file(path)?);
        }

        let default_path = default_config_path();
        if default_path.exists() {
            debug!("Loading config from {}", default_path.display());
            Ok(ConfluxysConfig::from_file(&default_path)?)
        } else {
            Ok(ConfluxysConfig::default())
        }
    }

    /// Load the config and open the workspace it points at.
    pub fn open_workspace(&self) -> anyhow::Result<(ConfluxysConfig, JsonStore)> {
        let config = self.load_config()?;
        let data_dir = self
            .data_dir
            .clone()
            .unwrap_or_else(|| config.store.data_dir.clone());
        let store = JsonStore::open(&data_dir)?;
        Ok((config, store))
    }
}

/// Where `config init` writes and other commands look by default.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("confluxys")
        .join("config.json")
}

/// Output format for listings.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text table
    Text,
}

/// Run a full reprocessing pass and print its summary.
pub fn run_reprocess(config: &ConfluxysConfig, store: &mut JsonStore) -> anyhow::Result<ReprocessReport> {
    let engine = MatchingEngine::new(config.extraction.clone());
    let report = Reprocessor::new(&engine).reprocess_all(store)?;

    println!(
        "{} Reprocessed {} document types: {} documents, {} rows",
        style("✓").green(),
        report.types_processed,
        report.documents_processed,
        report.rows_written
    );
    for failure in &report.failures {
        eprintln!(
            "{} {}: {}",
            style("✗").red(),
            failure.table,
            failure.error
        );
    }
    Ok(report)
}

/// Read and parse a JSON file.
pub fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
    serde_json::from_str(&content)
        .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path.display(), e))
}

/// Pad cells into aligned columns.
pub fn format_table(header: &[String], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(widths.len()) {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let render = |cells: &[String]| {
        let line: String = cells
            .iter()
            .enumerate()
            .take(widths.len())
            .map(|(i, c)| format!("{:<width$}  ", c, width = widths[i]))
            .collect();
        line.trim_end().to_string()
    };

    let mut output = render(header);
    output.push('\n');
    for row in rows {
        output.push_str(&render(row));
        output.push('\n');
    }
    output
}

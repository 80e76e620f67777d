//! Ingest command - add documents to the workspace.

use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, warn};

use confluxys_core::formats::{supported_extensions, SourceFormat};
use confluxys_core::Ingestor;

use super::{run_reprocess, GlobalOptions};

/// Arguments for the ingest command.
#[derive(Args)]
pub struct IngestArgs {
    /// Input files or glob patterns
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,

    /// Reprocess all templates after ingesting
    #[arg(long)]
    reprocess: bool,
}

pub async fn run(args: IngestArgs, options: &GlobalOptions) -> anyhow::Result<()> {
    let start = Instant::now();
    let (config, mut store) = options.open_workspace()?;

    let files = expand_inputs(&args.inputs)?;
    if files.is_empty() {
        anyhow::bail!(
            "No supported files found (supported: {})",
            supported_extensions().join(" ")
        );
    }

    println!(
        "{} Found {} files to ingest",
        style("ℹ").blue(),
        files.len()
    );

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let ingestor = Ingestor::from_config(&config);
    let mut ingested = 0usize;
    let mut failed: Vec<(PathBuf, String)> = Vec::new();

    for path in files {
        match ingestor.ingest(&path, &mut store) {
            Ok(document) => {
                pb.println(format!(
                    "{} {} ({} pages) -> document {}",
                    style("✓").green(),
                    document.file_name,
                    document.page_count,
                    document.id
                ));
                ingested += 1;
            }
            Err(e) if args.continue_on_error => {
                warn!("Failed to ingest {}: {}", path.display(), e);
                failed.push((path, e.to_string()));
            }
            Err(e) => {
                pb.abandon();
                error!("Failed to ingest {}: {}", path.display(), e);
                anyhow::bail!("Ingestion failed: {}", e);
            }
        }
        pb.inc(1);
    }

    pb.finish_and_clear();

    println!(
        "{} Ingested {} files in {:?}",
        style("✓").green(),
        ingested,
        start.elapsed()
    );

    if !failed.is_empty() {
        println!("{}", style("Failed files:").red());
        for (path, error) in &failed {
            println!("  - {}: {}", path.display(), error);
        }
    }

    if args.reprocess && ingested > 0 {
        run_reprocess(&config, &mut store)?;
    }

    Ok(())
}

/// Expand each input as a glob, keeping plain paths that exist.
fn expand_inputs(inputs: &[String]) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        let mut matched = false;
        for path in glob(input)?.filter_map(|r| r.ok()) {
            matched = true;
            if path.is_file() && SourceFormat::from_path(&path).is_some() {
                files.push(path);
            }
        }
        // An explicit path is passed through so the user sees why it failed
        if !matched {
            files.push(PathBuf::from(input));
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}

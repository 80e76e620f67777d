//! Documents command - inspect ingested documents.

use clap::{Args, Subcommand};
use console::style;

use confluxys_core::{Document, DocumentStore};

use super::{format_table, GlobalOptions, OutputFormat};

/// Arguments for the documents command.
#[derive(Args)]
pub struct DocumentsArgs {
    #[command(subcommand)]
    command: DocumentsCommand,
}

#[derive(Subcommand)]
enum DocumentsCommand {
    /// List ingested documents
    List {
        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show one document's metadata and text
    Show {
        /// Document id
        id: u64,

        /// Print reading-order text instead of layout text
        #[arg(long)]
        raw: bool,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

pub async fn run(args: DocumentsArgs, options: &GlobalOptions) -> anyhow::Result<()> {
    let (_, store) = options.open_workspace()?;

    match args.command {
        DocumentsCommand::List { format } => list(&store.list_documents()?, format),
        DocumentsCommand::Show { id, raw, json } => {
            let document = store
                .get_document(id)?
                .ok_or_else(|| anyhow::anyhow!("Document {} not found", id))?;
            show(&document, raw, json)
        }
    }
}

fn list(documents: &[Document], format: OutputFormat) -> anyhow::Result<()> {
    let header: Vec<String> = ["id", "file_name", "pages", "size", "ingested_at"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let rows: Vec<Vec<String>> = documents
        .iter()
        .map(|d| {
            vec![
                d.id.to_string(),
                d.file_name.clone(),
                d.page_count.to_string(),
                d.file_size.to_string(),
                d.ingested_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            ]
        })
        .collect();

    match format {
        OutputFormat::Json => {
            let summaries: Vec<serde_json::Value> = documents
                .iter()
                .map(|d| {
                    serde_json::json!({
                        "id": d.id,
                        "file_path": d.file_path,
                        "file_name": d.file_name,
                        "file_hash": d.file_hash,
                        "file_size": d.file_size,
                        "page_count": d.page_count,
                        "ingested_at": d.ingested_at,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&summaries)?);
        }
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(std::io::stdout());
            wtr.write_record(&header)?;
            for row in &rows {
                wtr.write_record(row)?;
            }
            wtr.flush()?;
        }
        OutputFormat::Text => {
            if documents.is_empty() {
                println!("{} No documents ingested yet.", style("ℹ").blue());
            } else {
                print!("{}", format_table(&header, &rows));
            }
        }
    }
    Ok(())
}

fn show(document: &Document, raw: bool, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(document)?);
        return Ok(());
    }

    println!("{} {}", style("Document").bold(), document.id);
    println!("  Path:     {}", document.file_path.display());
    println!("  Hash:     {}", document.file_hash);
    println!("  Size:     {} bytes", document.file_size);
    println!("  Pages:    {}", document.page_count);
    println!("  Created:  {}", document.created_at);
    println!("  Modified: {}", document.modified_at);
    println!("  Ingested: {}", document.ingested_at);
    println!();
    if raw {
        println!("{}", document.raw_text);
    } else {
        println!("{}", document.layout_text);
    }
    Ok(())
}

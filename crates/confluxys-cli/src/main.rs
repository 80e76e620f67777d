//! CLI application for confluxys document templating.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{config, documents, ingest, reprocess, rows, synthesize, template, GlobalOptions};

/// Confluxys - Turn recurring documents into tables from a single example
#[derive(Parser)]
#[command(name = "confluxys")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Workspace directory (overrides store.data_dir)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest documents into the workspace
    Ingest(ingest::IngestArgs),

    /// Inspect ingested documents
    Documents(documents::DocumentsArgs),

    /// Synthesize a pattern from a context and an example value
    Synthesize(synthesize::SynthesizeArgs),

    /// Author and manage templates
    Template(template::TemplateArgs),

    /// Rebuild every template's table from all documents
    Reprocess(reprocess::ReprocessArgs),

    /// Print the rows extracted into a table
    Rows(rows::RowsArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let options = GlobalOptions {
        config: cli.config,
        data_dir: cli.data_dir,
    };

    // Execute command
    match cli.command {
        Commands::Ingest(args) => ingest::run(args, &options).await,
        Commands::Documents(args) => documents::run(args, &options).await,
        Commands::Synthesize(args) => synthesize::run(args, &options).await,
        Commands::Template(args) => template::run(args, &options).await,
        Commands::Reprocess(args) => reprocess::run(args, &options).await,
        Commands::Rows(args) => rows::run(args, &options).await,
        Commands::Config(args) => config::run(args, &options).await,
    }
}

//! Template command - author and manage templates.

use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use console::style;
use tracing::info;

use confluxys_core::template::{DraftFile, Preview, TemplateDraft};
use confluxys_core::{
    ConfluxysConfig, DocumentStore, JsonStore, MatchingEngine, Template, TemplateStore,
};

use super::{format_table, read_json, run_reprocess, GlobalOptions};

/// Arguments for the template command.
#[derive(Args)]
pub struct TemplateArgs {
    #[command(subcommand)]
    command: TemplateCommand,
}

#[derive(Subcommand)]
enum TemplateCommand {
    /// Create a template from a draft file
    Create {
        /// Draft JSON file
        draft: PathBuf,

        /// Reprocess all templates afterwards
        #[arg(long)]
        reprocess: bool,
    },

    /// Replace an existing template's content with a draft file
    Edit {
        /// Template id
        id: u64,

        /// Draft JSON file
        draft: PathBuf,

        /// Reprocess all templates afterwards
        #[arg(long)]
        reprocess: bool,
    },

    /// List templates
    List,

    /// Show a template and its fields
    Show {
        /// Template id
        id: u64,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Delete a template, its fields, and its extracted rows
    Delete {
        /// Template id
        id: u64,
    },

    /// Try a draft against an ingested document without saving
    Test {
        /// Draft JSON file
        draft: PathBuf,

        /// Document id
        document: u64,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

pub async fn run(args: TemplateArgs, options: &GlobalOptions) -> anyhow::Result<()> {
    let (config, mut store) = options.open_workspace()?;
    let engine = MatchingEngine::new(config.extraction.clone());

    match args.command {
        TemplateCommand::Create { draft, reprocess } => {
            let template = load_draft(&draft, &engine)?.build()?;
            let created = store.create_template(template)?;
            info!("Created template {}", created.document_type.id);
            println!(
                "{} Created template {} ({}) writing to {}",
                style("✓").green(),
                created.document_type.id,
                created.document_type.name,
                created.document_type.table_name
            );
            finish(&config, &mut store, reprocess)
        }
        TemplateCommand::Edit { id, draft, reprocess } => {
            let existing = store
                .get_template(id)?
                .ok_or_else(|| anyhow::anyhow!("Template {} not found", id))?;
            let template = load_draft(&draft, &engine)?.editing(&existing).build()?;
            let replaced = store.replace_template(id, template)?;
            println!(
                "{} Updated template {} ({} fields)",
                style("✓").green(),
                replaced.document_type.id,
                replaced.fields.len()
            );
            finish(&config, &mut store, reprocess)
        }
        TemplateCommand::List => {
            let templates = store.list_templates()?;
            if templates.is_empty() {
                println!("{} No templates defined yet.", style("ℹ").blue());
                return Ok(());
            }
            let header: Vec<String> = ["id", "name", "identifier", "table", "fields"]
                .iter()
                .map(|s| s.to_string())
                .collect();
            let rows: Vec<Vec<String>> = templates
                .iter()
                .map(|t| {
                    vec![
                        t.document_type.id.to_string(),
                        t.document_type.name.clone(),
                        t.document_type.identifier_text.clone(),
                        t.document_type.table_name.clone(),
                        t.fields.len().to_string(),
                    ]
                })
                .collect();
            print!("{}", format_table(&header, &rows));
            Ok(())
        }
        TemplateCommand::Show { id, json } => {
            let template = store
                .get_template(id)?
                .ok_or_else(|| anyhow::anyhow!("Template {} not found", id))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&template)?);
            } else {
                print_template(&template);
            }
            Ok(())
        }
        TemplateCommand::Delete { id } => {
            store.delete_template(id)?;
            println!("{} Deleted template {}", style("✓").green(), id);
            Ok(())
        }
        TemplateCommand::Test { draft, document, json } => {
            let document = store
                .get_document(document)?
                .ok_or_else(|| anyhow::anyhow!("Document {} not found", document))?;
            let preview = load_draft(&draft, &engine)?.preview(&document);
            if json {
                println!("{}", serde_json::to_string_pretty(&preview)?);
            } else {
                print_preview(&preview);
            }
            Ok(())
        }
    }
}

fn load_draft(path: &Path, engine: &MatchingEngine) -> anyhow::Result<TemplateDraft> {
    let file: DraftFile = read_json(path)?;
    Ok(file.into_draft(engine.clone())?)
}

fn finish(
    config: &ConfluxysConfig,
    store: &mut JsonStore,
    reprocess: bool,
) -> anyhow::Result<()> {
    if reprocess {
        run_reprocess(config, store)?;
    } else {
        println!(
            "{} Run 'confluxys reprocess' to rebuild extracted rows.",
            style("ℹ").blue()
        );
    }
    Ok(())
}

fn print_template(template: &Template) {
    let document_type = &template.document_type;
    println!("{} {}", style("Template").bold(), document_type.name);
    println!("  Id:          {}", document_type.id);
    println!("  Description: {}", document_type.description);
    println!("  Identifier:  {}", document_type.identifier_text);
    println!("  Table:       {}", document_type.table_name);
    println!("  Created:     {}", document_type.created_at);
    println!();

    let header: Vec<String> = ["#", "field", "column", "type", "pattern"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let rows: Vec<Vec<String>> = template
        .ordered_fields()
        .into_iter()
        .map(|f| {
            vec![
                f.sort_order.to_string(),
                f.field_name.clone(),
                f.column_name.clone(),
                f.data_type.to_string(),
                f.regex_pattern.replace('\n', "\\n"),
            ]
        })
        .collect();
    print!("{}", format_table(&header, &rows));
}

fn print_preview(preview: &Preview) {
    if preview.identifier_found {
        println!("{} Identifier found", style("✓").green());
    } else {
        println!("{} Identifier not found in this document", style("✗").red());
    }

    for field in &preview.fields {
        match (&field.value, &field.error) {
            (Some(value), _) => println!("  {} {} = {}", style("✓").green(), field.column_name, value),
            (None, Some(error)) => println!("  {} {}: {}", style("✗").red(), field.column_name, error),
            (None, None) => println!("  {} {}: no match", style("-").yellow(), field.column_name),
        }
    }
}

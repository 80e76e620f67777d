//! Rows command - print a template's extracted rows.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use console::style;

use confluxys_core::{ExtractedRow, RowStore, TemplateStore};

use super::{format_table, GlobalOptions, OutputFormat};

/// Arguments for the rows command.
#[derive(Args)]
pub struct RowsArgs {
    /// Table name (e.g. doc_invoice)
    table: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

pub async fn run(args: RowsArgs, options: &GlobalOptions) -> anyhow::Result<()> {
    let (_, store) = options.open_workspace()?;
    let rows = store.rows(&args.table)?;

    // Column order follows the owning template; orphan tables fall back to
    // first appearance.
    let template_columns: Option<Vec<String>> = store
        .list_templates()?
        .into_iter()
        .find(|t| t.document_type.table_name == args.table)
        .map(|t| t.columns().into_iter().map(String::from).collect());
    let columns = template_columns.unwrap_or_else(|| columns_of(&rows));

    let output = match args.format {
        OutputFormat::Json => format_json(&rows, &columns)?,
        OutputFormat::Csv => format_csv(&rows, &columns)?,
        OutputFormat::Text => {
            let mut header = vec!["document_id".to_string()];
            header.extend(columns.iter().cloned());
            format_table(&header, &cells(&rows, &columns))
        }
    };

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} {} rows written to {}",
            style("✓").green(),
            rows.len(),
            output_path.display()
        );
    } else {
        print!("{}", output);
    }

    Ok(())
}

fn columns_of(rows: &[ExtractedRow]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for row in rows {
        for (column, _) in &row.values {
            if !columns.contains(column) {
                columns.push(column.clone());
            }
        }
    }
    columns
}

fn cells(rows: &[ExtractedRow], columns: &[String]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|row| {
            let mut line = vec![row.document_id.to_string()];
            line.extend(
                columns
                    .iter()
                    .map(|c| row.get(c).unwrap_or_default().to_string()),
            );
            line
        })
        .collect()
}

fn format_json(rows: &[ExtractedRow], columns: &[String]) -> anyhow::Result<String> {
    let objects: Vec<serde_json::Value> = rows
        .iter()
        .map(|row| {
            let mut object = serde_json::Map::new();
            object.insert("document_id".to_string(), row.document_id.into());
            for column in columns {
                let value = row
                    .get(column)
                    .map(|v| serde_json::Value::String(v.to_string()))
                    .unwrap_or(serde_json::Value::Null);
                object.insert(column.clone(), value);
            }
            serde_json::Value::Object(object)
        })
        .collect();
    Ok(format!("{}\n", serde_json::to_string_pretty(&objects)?))
}

fn format_csv(rows: &[ExtractedRow], columns: &[String]) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    let mut header = vec!["document_id".to_string()];
    header.extend(columns.iter().cloned());
    wtr.write_record(&header)?;

    for line in cells(rows, columns) {
        wtr.write_record(&line)?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: u64, values: &[(&str, &str)]) -> ExtractedRow {
        let mut row = ExtractedRow::new(id, "doc_invoice");
        row.values = values
            .iter()
            .map(|(c, v)| (c.to_string(), v.to_string()))
            .collect();
        row
    }

    #[test]
    fn test_columns_in_first_appearance_order() {
        let rows = vec![row(1, &[("total", "1")]), row(2, &[("number", "A"), ("total", "2")])];
        assert_eq!(columns_of(&rows), vec!["total", "number"]);
    }

    #[test]
    fn test_csv_leaves_missing_values_empty() {
        let rows = vec![row(1, &[("total", "42")]), row(2, &[("number", "A, B")])];
        let columns = vec!["number".to_string(), "total".to_string()];
        let csv = format_csv(&rows, &columns).unwrap();
        assert_eq!(csv, "document_id,number,total\n1,,42\n2,\"A, B\",\n");
    }

    #[test]
    fn test_json_uses_null_for_missing_values() {
        let rows = vec![row(3, &[("total", "42")])];
        let columns = vec!["number".to_string(), "total".to_string()];
        let json: serde_json::Value = serde_json::from_str(&format_json(&rows, &columns).unwrap()).unwrap();
        assert_eq!(json[0]["document_id"], 3);
        assert!(json[0]["number"].is_null());
        assert_eq!(json[0]["total"], "42");
    }
}

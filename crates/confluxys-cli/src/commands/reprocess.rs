//! Reprocess command - rebuild every template's table.

use clap::Args;

use super::{run_reprocess, GlobalOptions};

/// Arguments for the reprocess command.
#[derive(Args)]
pub struct ReprocessArgs {
    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

pub async fn run(args: ReprocessArgs, options: &GlobalOptions) -> anyhow::Result<()> {
    let (config, mut store) = options.open_workspace()?;
    let report = run_reprocess(&config, &mut store)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    if !report.is_success() {
        anyhow::bail!(
            "{} of {} document types failed to reprocess",
            report.failures.len(),
            report.failures.len() + report.types_processed
        );
    }
    Ok(())
}

use crate::cli_args::{OutputFormat, RunArgs};
use crate::commands::gather_candidates;
use crate::host::ProcessHost;
use crate::load_config_for_command;
use crate::output;
use anyhow::{Context, Result};
use colored::*;
use formatall_core::{AppError, Config, LogProgress};
use log;

pub fn handle_run_command(args: RunArgs, quiet: bool) -> Result<()> {
    let project_root = Config::determine_project_root(args.project_config.project_root.as_ref())
        .context("Failed to determine project root")?;
    log::info!("Project root determined: {}", project_root.display());

    let config = load_config_for_command(
        &project_root,
        &args.project_config,
        &args.filters,
        args.command.as_ref(),
    )
    .context("Failed to load configuration for run command")?;
    let runner = config.batch_runner()?;
    log::debug!("Commands: {:?}", runner.commands());

    let candidates = gather_candidates(&config, &args.selection, &project_root)?;
    if candidates.is_empty() && !quiet {
        println!("{}", "(No files selected)".yellow());
    }

    let mut host = ProcessHost::new(Some(project_root), args.dry_run);
    let summary = runner.run(&mut host, &candidates, &mut LogProgress);

    if args.dry_run && !quiet && args.format == OutputFormat::Table {
        for line in &host.executed {
            println!("{}", line.dimmed());
        }
    }

    match args.format {
        OutputFormat::Json => output::print_json(&summary)?,
        OutputFormat::Table if !quiet => output::print_summary_pretty(&summary)?,
        OutputFormat::Table => {}
    }

    if summary.has_failures() {
        anyhow::bail!(AppError::Execution(format!(
            "{} of {} file(s) failed",
            summary.failed, summary.total
        )));
    }
    Ok(())
}

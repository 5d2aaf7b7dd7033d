use crate::cli_args::{ListArgs, OutputFormat};
use crate::commands::gather_candidates;
use crate::load_config_for_command;
use crate::output::{self, CandidateEntry};
use anyhow::{Context, Result};
use formatall_core::{Config, DocumentHost};
use log;

use crate::host::ProcessHost;

pub fn handle_list_command(args: ListArgs) -> Result<()> {
    let project_root = Config::determine_project_root(args.project_config.project_root.as_ref())
        .context("Failed to determine project root")?;
    log::info!("Project root determined: {}", project_root.display());

    let config = load_config_for_command(&project_root, &args.project_config, &args.filters, None)
        .context("Failed to load configuration for list command")?;

    let candidates = gather_candidates(&config, &args.selection, &project_root)?;

    let namer = ProcessHost::new(Some(project_root), true);
    let entries: Vec<CandidateEntry> = candidates
        .iter()
        .enumerate()
        .map(|(i, node)| CandidateEntry {
            index: i + 1,
            path: namer.display_name(node),
        })
        .collect();

    match args.format {
        OutputFormat::Json => output::print_json(&entries),
        OutputFormat::Table => output::print_candidates_table(&entries),
    }
}

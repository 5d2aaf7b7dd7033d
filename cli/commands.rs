pub mod config;
pub mod list;
pub mod run;

use crate::cli_args::SelectionOpts;
use crate::host::{self, FsNode};
use crate::selected_paths;
use anyhow::{Context, Result};
use formatall_core::Config;
use std::path::Path;

/// Resolves the selection and runs it through the configured pipeline.
pub fn gather_candidates(
    config: &Config,
    selection: &SelectionOpts,
    project_root: &Path,
) -> Result<Vec<FsNode>> {
    let paths = selected_paths(selection, project_root)
        .into_iter()
        .map(|p| {
            std::path::absolute(&p).with_context(|| format!("Invalid path: {}", p.display()))
        })
        .collect::<Result<Vec<_>>>()?;
    for path in &paths {
        if !path.exists() {
            anyhow::bail!(formatall_core::AppError::InvalidArgument(format!(
                "Selected path does not exist: {}",
                path.display()
            )));
        }
    }

    let selection = host::selection_from_paths(&paths, selection.solution);
    let candidates = config
        .selection_pipeline()
        .select(selection)
        .context("Failed to walk the selected project")?;
    Ok(candidates)
}

mod cli_args;
mod commands;
mod host;
mod output;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use colored::*;
use log;
use std::path::{Path, PathBuf};
use std::process;

use cli_args::{Cli, Commands, FilterOpts, ProjectConfigOpts, SelectionOpts};
use formatall_core::{AppError, Config};

fn main() {
    let cli_args = Cli::parse();

    setup_logging(cli_args.quiet, cli_args.verbose);

    let quiet = cli_args.quiet;

    log::debug!("CLI args parsed: {:?}", cli_args);

    let exit_code = match run_app(cli_args, quiet) {
        Ok(_) => {
            log::info!("Application finished successfully.");
            0
        }
        Err(e) => {
            let exit_code = exit_code_for(&e);

            // Batch failures were already reported item by item.
            if !quiet || exit_code == 1 || exit_code == 5 {
                eprintln!("{} {:#}", "Error:".red().bold(), e);
            } else {
                log::error!("Application failed: {:#}", e);
            }

            exit_code
        }
    };
    log::debug!("Exiting with code {}", exit_code);
    process::exit(exit_code);
}

fn exit_code_for(error: &anyhow::Error) -> i32 {
    match error.downcast_ref::<AppError>() {
        Some(AppError::Config(_)) | Some(AppError::TomlParse(_)) | Some(AppError::TomlSerialize(_)) => 1,
        Some(AppError::Io(_))
        | Some(AppError::FileRead { .. })
        | Some(AppError::FileWrite { .. })
        | Some(AppError::DirCreation { .. })
        | Some(AppError::WalkDir(_)) => 2,
        Some(AppError::Execution(_)) => 3,
        Some(AppError::InvalidArgument(_)) => 5,
        Some(_) => 1,
        None => 1,
    }
}

fn setup_logging(quiet: bool, verbose: u8) {
    let log_level = if quiet {
        log::LevelFilter::Off
    } else {
        match verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    };
    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();
    log::trace!("Logger initialized with level: {:?}", log_level);
}

fn run_app(cli: Cli, quiet: bool) -> Result<()> {
    match cli.command {
        None => {
            Cli::command().print_help()?;
        }
        Some(Commands::List(args)) => {
            log::debug!("Executing 'list' command...");
            commands::list::handle_list_command(args)?;
        }
        Some(Commands::Run(args)) => {
            log::debug!("Executing 'run' command...");
            commands::run::handle_run_command(args, quiet)?;
        }
        Some(Commands::Config(args)) => {
            log::debug!("Executing 'config' command...");
            let project_root =
                Config::determine_project_root(args.project_config.project_root.as_ref())
                    .context("Failed to determine project root for config command")?;
            commands::config::handle_config_command(&args, &project_root, quiet)?;
        }
    }
    Ok(())
}

fn merge_config_with_cli_overrides(
    mut config: Config,
    filters: &FilterOpts,
    command: Option<&String>,
) -> Config {
    log::trace!("Applying CLI overrides to config...");

    if let Some(inclusion) = &filters.inclusion {
        config.general.inclusion_file_pattern = inclusion.clone();
    }
    if let Some(exclusion) = &filters.exclusion {
        config.general.exclusion_file_pattern = exclusion.clone();
    }
    if filters.include_generated {
        config.general.exclude_generated_artifacts = false;
    }
    if let Some(descent) = filters.sub_project_descent {
        config.general.sub_project_descent = descent.into();
    }
    if let Some(command) = command {
        config.general.command = command.clone();
    }

    log::trace!("Config after CLI overrides: {:?}", config);
    config
}

/// Loads the effective configuration for `list` and `run`.
pub fn load_config_for_command(
    project_root: &Path,
    project_opts: &ProjectConfigOpts,
    filters: &FilterOpts,
    command: Option<&String>,
) -> Result<Config> {
    let config_path = Config::resolve_config_path(
        project_root,
        project_opts.config.as_ref(),
        project_opts.no_config,
    )
    .context("Failed to resolve configuration path")?;

    let config = match &config_path {
        Some(path) => Config::load_from_path(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::default(),
    };

    Ok(merge_config_with_cli_overrides(config, filters, command))
}

/// Paths the user selected, defaulting to the project root itself.
pub fn selected_paths(selection: &SelectionOpts, project_root: &Path) -> Vec<PathBuf> {
    if selection.paths.is_empty() {
        return vec![project_root.to_path_buf()];
    }
    if selection.paths.len() > 1 {
        log::warn!(
            "{} paths selected; select a single project, solution or file.",
            selection.paths.len()
        );
    }
    selection.paths.clone()
}

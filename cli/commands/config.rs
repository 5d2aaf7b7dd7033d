use crate::cli_args::ConfigArgs;
use anyhow::{Context, Result};
use colored::*;
use formatall_core::{AppError, Config};
use std::path::Path;

pub fn handle_config_command(args: &ConfigArgs, project_root: &Path, quiet: bool) -> Result<()> {
    let config = Config::default();

    if !args.save {
        let content = config
            .to_toml()
            .context("Failed to serialize default configuration")?;
        print!("{}", content);
        return Ok(());
    }

    let save_path = Config::default_path(project_root);
    if save_path.exists() && !args.force {
        anyhow::bail!(AppError::InvalidArgument(format!(
            "Config file already exists at '{}'. Use --force to overwrite.",
            save_path.display()
        )));
    }
    config
        .save_to_path(&save_path)
        .with_context(|| format!("Failed to save config to {}", save_path.display()))?;
    if !quiet {
        println!(
            "{} Default config saved to: {}",
            "✅".green(),
            save_path.display().to_string().blue()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(save: bool, force: bool) -> ConfigArgs {
        ConfigArgs {
            project_config: Default::default(),
            save,
            force,
        }
    }

    #[test]
    fn test_save_refuses_to_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        handle_config_command(&args(true, false), dir.path(), true).unwrap();
        let path = Config::default_path(dir.path());
        assert_eq!(Config::load_from_path(&path).unwrap(), Config::default());

        let err = handle_config_command(&args(true, false), dir.path(), true).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AppError>(),
            Some(AppError::InvalidArgument(_))
        ));
        handle_config_command(&args(true, true), dir.path(), true).unwrap();
    }
}

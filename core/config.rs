use crate::batch::{self, BatchRunner};
use crate::error::{AppError, Result};
use crate::filters::{FileFilter, HierarchyFilter};
use crate::selection::{SelectionPipeline, SubProjectDescent};
use log;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_DIR: &str = ".formatall";
pub const DEFAULT_CONFIG_FILENAME: &str = "formatall.toml";
pub const FORMAT_DOCUMENT_COMMAND: &str = "format document";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct GeneralConfig {
    /// Command run on each file. May list several, separated by `;` or
    /// newlines.
    #[serde(default = "default_command")]
    pub command: String,
    #[serde(default)]
    pub inclusion_file_pattern: String,
    #[serde(default)]
    pub exclusion_file_pattern: String,
    #[serde(default = "default_true")]
    pub exclude_generated_artifacts: bool,
    #[serde(default)]
    pub sub_project_descent: SubProjectDescent,
}

fn default_true() -> bool {
    true
}
fn default_command() -> String {
    FORMAT_DOCUMENT_COMMAND.to_string()
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            command: default_command(),
            inclusion_file_pattern: String::new(),
            exclusion_file_pattern: String::new(),
            exclude_generated_artifacts: default_true(),
            sub_project_descent: SubProjectDescent::default(),
        }
    }
}

impl Config {
    pub fn create_file_filter(&self) -> FileFilter {
        FileFilter::new(
            &self.general.inclusion_file_pattern,
            &self.general.exclusion_file_pattern,
        )
    }

    pub fn create_hierarchy_filter(&self) -> HierarchyFilter {
        HierarchyFilter::new(self.general.exclude_generated_artifacts)
    }

    pub fn selection_pipeline(&self) -> SelectionPipeline {
        SelectionPipeline::new(self.create_hierarchy_filter(), self.create_file_filter())
            .with_sub_project_descent(self.general.sub_project_descent)
    }

    pub fn commands(&self) -> Vec<String> {
        batch::parse_commands(&self.general.command)
    }

    pub fn batch_runner(&self) -> Result<BatchRunner> {
        let commands = self.commands();
        if commands.is_empty() {
            return Err(AppError::Config(format!(
                "No command configured (command = {:?}).",
                self.general.command
            )));
        }
        Ok(BatchRunner::new(commands))
    }

    pub fn determine_project_root(cli_project_root: Option<&PathBuf>) -> Result<PathBuf> {
        let path_str_opt = cli_project_root
            .map(|p| p.to_string_lossy().to_string())
            .or_else(|| env::var("FORMATALL_ROOT").ok().filter(|s| !s.is_empty()));

        let path_to_resolve = match path_str_opt {
            Some(p_str) => PathBuf::from(shellexpand::tilde(&p_str).as_ref()),
            None => env::current_dir().map_err(AppError::Io)?,
        };

        path_to_resolve.canonicalize().map_err(|e| {
            AppError::Io(std::io::Error::new(
                e.kind(),
                format!(
                    "Failed to canonicalize project root '{}': {}",
                    path_to_resolve.display(),
                    e
                ),
            ))
        })
    }

    /// Picks the config file to load: an explicit `--config` path (a
    /// missing `.toml` extension is added), else the default file when it
    /// exists, else none.
    pub fn resolve_config_path(
        project_root: &Path,
        cli_config_file: Option<&String>,
        cli_disable_config: bool,
    ) -> Result<Option<PathBuf>> {
        if cli_disable_config {
            log::debug!("Config file loading disabled via CLI flag.");
            return Ok(None);
        }

        let Some(requested) = cli_config_file else {
            let default_path = Self::default_path(project_root);
            if !default_path.exists() {
                log::debug!("No config file at {}", default_path.display());
                return Ok(None);
            }
            return Ok(Some(default_path));
        };

        let mut path = PathBuf::from(shellexpand::tilde(requested).as_ref());
        if path.is_relative() {
            path = project_root.join(path);
        }
        if !path.exists() && path.extension().is_none() {
            path.set_extension("toml");
        }
        if !path.exists() {
            return Err(AppError::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        log::debug!("Using config file: {}", path.display());
        Ok(Some(path))
    }

    pub fn default_path(project_root: &Path) -> PathBuf {
        project_root
            .join(DEFAULT_CONFIG_DIR)
            .join(DEFAULT_CONFIG_FILENAME)
    }

    pub fn load_from_path(config_path: &Path) -> Result<Self> {
        log::info!("Loading configuration from: {}", config_path.display());
        let toml_content = fs::read_to_string(config_path).map_err(|e| AppError::FileRead {
            path: config_path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml(&toml_content).map_err(|e| {
            AppError::TomlParse(format!(
                "Error parsing config file '{}': {}. Check TOML syntax and structure.",
                config_path.display(),
                e
            ))
        })
    }

    pub fn from_toml(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str::<Config>(content)
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn save_to_path(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| AppError::DirCreation {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        fs::write(config_path, self.to_toml()?).map_err(|e| AppError::FileWrite {
            path: config_path.to_path_buf(),
            source: e,
        })?;
        log::info!("Configuration saved to: {}", config_path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.general.command, "format document");
        assert!(config.general.inclusion_file_pattern.is_empty());
        assert!(config.general.exclusion_file_pattern.is_empty());
        assert!(config.general.exclude_generated_artifacts);
        assert_eq!(config.general.sub_project_descent, SubProjectDescent::Filtered);
        assert_eq!(config.commands(), ["format document"]);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = Config::from_toml(
            r#"
            [general]
            inclusion_file_pattern = "*.cs;*.xaml"
            sub_project_descent = "always"
            "#,
        )
        .unwrap();
        assert_eq!(config.general.command, FORMAT_DOCUMENT_COMMAND);
        assert_eq!(config.general.inclusion_file_pattern, "*.cs;*.xaml");
        assert_eq!(config.general.sub_project_descent, SubProjectDescent::Always);
        assert!(config.general.exclude_generated_artifacts);

        let filter = config.create_file_filter();
        assert!(filter.accepts("Main.xaml"));
        assert!(!filter.accepts("notes.txt"));
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(Config::from_toml("").unwrap(), Config::default());
    }

    #[test]
    fn test_unknown_fields_rejected() {
        assert!(Config::from_toml("[general]\nformat = \"json\"\n").is_err());
        assert!(Config::from_toml("[output]\n").is_err());
    }

    #[test]
    fn test_filters_from_config() {
        let mut config = Config::default();
        assert!(!config.create_hierarchy_filter().accepts("View.tt"));
        config.general.exclude_generated_artifacts = false;
        assert!(config.create_hierarchy_filter().accepts("View.tt"));

        config.general.exclusion_file_pattern = "*.Designer.cs".to_string();
        let pipeline = config.selection_pipeline();
        assert!(!pipeline.file_filter().accepts("Form.Designer.cs"));
        assert!(pipeline.file_filter().accepts("Form.cs"));
        assert!(pipeline.hierarchy_filter().accepts("View.tt"));
    }

    #[test]
    fn test_multiple_commands() {
        let mut config = Config::default();
        config.general.command = "rustfmt {file}\ndos2unix {file}".to_string();
        assert_eq!(config.commands(), ["rustfmt {file}", "dos2unix {file}"]);
        assert_eq!(config.batch_runner().unwrap().commands().len(), 2);

        config.general.command = " ; ".to_string();
        assert!(matches!(config.batch_runner(), Err(AppError::Config(_))));
    }

    #[test]
    fn test_save_and_load_roundtrip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = Config::default_path(dir.path());
        let mut config = Config::default();
        config.general.inclusion_file_pattern = "*.rs".to_string();
        config.save_to_path(&path).unwrap();

        let resolved = Config::resolve_config_path(dir.path(), None, false)
            .unwrap()
            .unwrap();
        assert_eq!(resolved, path);
        assert_eq!(Config::load_from_path(&resolved).unwrap(), config);
    }

    #[test]
    fn test_resolve_config_path_variants() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(Config::resolve_config_path(dir.path(), None, false).unwrap(), None);
        assert_eq!(
            Config::resolve_config_path(dir.path(), Some(&"anything".to_string()), true).unwrap(),
            None
        );

        let named = dir.path().join("ci").join("strict.toml");
        Config::default().save_to_path(&named).unwrap();
        assert_eq!(
            Config::resolve_config_path(dir.path(), Some(&"ci/strict".to_string()), false)
                .unwrap(),
            Some(named.clone())
        );
        let absolute = named.to_string_lossy().to_string();
        assert_eq!(
            Config::resolve_config_path(dir.path(), Some(&absolute), false).unwrap(),
            Some(named)
        );
        assert!(matches!(
            Config::resolve_config_path(dir.path(), Some(&"missing".to_string()), false),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn test_load_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        fs::write(&path, "[general\n").unwrap();
        assert!(matches!(
            Config::load_from_path(&path),
            Err(AppError::TomlParse(_))
        ));
    }
}

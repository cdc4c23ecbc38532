//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/schemeprune/schemeprune.toml`
//! 3. Local config: `<project_dir>/.schemeprune.toml`
//! 4. Environment variables: `SCHEMEPRUNE_*` prefix
//!
//! Command line arguments override all of these.

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;

/// Name of the project-local config file.
pub const LOCAL_CONFIG_FILE: &str = ".schemeprune.toml";

/// Unified configuration for schemeprune.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Scheme file or directory pruned when no path is given
    pub scheme: Option<PathBuf>,
    /// Build target pruned when no `--target` is given
    pub target: Option<String>,
    /// Keep a `<file>.orig` copy before overwriting
    pub backup: bool,
}

/// Raw settings for intermediate parsing (`None` means "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub scheme: Option<PathBuf>,
    pub target: Option<String>,
    pub backup: Option<bool>,
}

/// Get the XDG config directory for schemeprune.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "schemeprune").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("schemeprune.toml"))
}

/// Get the path to the local config file in a project directory.
pub fn local_config_path(project_dir: &Path) -> PathBuf {
    project_dir.join(LOCAL_CONFIG_FILE)
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Expand `~`, `$VAR` and `${VAR}` in the scheme path.
    fn expand_paths(&mut self) {
        self.scheme = self.scheme.as_deref().map(|scheme| {
            let raw = scheme.to_string_lossy();
            let expanded = shellexpand::full(&raw)
                .map(|s| s.into_owned())
                .unwrap_or_else(|_| raw.to_string());
            PathBuf::from(expanded)
        });
    }

    /// Overlay wins wherever it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            scheme: overlay.scheme.clone().or_else(|| self.scheme.clone()),
            target: overlay.target.clone().or_else(|| self.target.clone()),
            backup: overlay.backup.unwrap_or(self.backup),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `project_dir` - Optional project directory holding `.schemeprune.toml`
    pub fn load(project_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        Self::load_from(global_config_path().as_deref(), project_dir)
    }

    /// Load settings from an explicit global config file instead of the XDG location.
    pub fn load_from(
        global_path: Option<&Path>,
        project_dir: Option<&Path>,
    ) -> Result<Self, ApplicationError> {
        // 1. Defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global_path {
            if global_path.exists() {
                let raw = load_raw_settings(global_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 3. Project-local config
        if let Some(project) = project_dir {
            let local_path = local_config_path(project);
            if local_path.exists() {
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 4. Environment variables
        current = Self::apply_env_overrides(current)?;

        current.expand_paths();

        // Relative scheme paths in config are relative to the project
        if let (Some(project), Some(scheme)) = (project_dir, &current.scheme) {
            if scheme.is_relative() {
                current.scheme = Some(project.join(scheme));
            }
        }

        Ok(current)
    }

    /// Apply SCHEMEPRUNE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("SCHEMEPRUNE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("scheme") {
            settings.scheme = Some(PathBuf::from(val));
        }
        if let Ok(val) = config.get_string("target") {
            settings.target = Some(val);
        }
        if let Ok(val) = config.get_bool("backup") {
            settings.backup = val;
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# schemeprune configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/schemeprune/schemeprune.toml
#   Local:  <project>/.schemeprune.toml
#   Env:    SCHEMEPRUNE_SCHEME, SCHEMEPRUNE_TARGET, SCHEMEPRUNE_BACKUP
#
# Command line arguments override everything in this file.

# Scheme file, or a directory searched for *.xcscheme files.
# Relative paths are resolved against the project directory.
# scheme = "App.xcodeproj/xcshareddata/xcschemes"

# Build target whose references are removed
# target = "App"

# Keep a <file>.orig copy of every scheme before overwriting it
# backup = false
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

//! Command dispatch: wires parsed arguments to the services

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use termtree::Tree;
use tracing::{debug, instrument};

use crate::application::services::{PruneOptions, PruneOutcome, SchemeService};
use crate::application::IoResultExt;
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{ReferenceListing, Section};
use crate::infrastructure::RealFileSystem;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let project_dir = match &cli.project_dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().with_path_context("resolve", Path::new("."))?,
    };
    debug!("project_dir: {}", project_dir.display());

    match &cli.command {
        Some(Commands::Prune {
            path,
            target,
            dry_run,
            backup,
        }) => cmd_prune(
            &project_dir,
            path.as_deref(),
            target.as_deref(),
            *dry_run,
            *backup,
        ),
        Some(Commands::List { path }) => cmd_list(&project_dir, path.as_deref()),
        Some(Commands::Config { command }) => cmd_config(&project_dir, command),
        Some(Commands::Completion { shell }) => {
            cmd_completion(*shell);
            Ok(())
        }
        None => Cli::command()
            .print_help()
            .with_path_context("print help to", Path::new("stdout"))
            .map_err(CliError::from),
    }
}

fn scheme_service() -> SchemeService {
    SchemeService::new(Arc::new(RealFileSystem))
}

/// Path argument relative to the project, falling back to config `scheme`.
fn scheme_path(project_dir: &Path, path: Option<&Path>, settings: &Settings) -> CliResult<PathBuf> {
    match (path, &settings.scheme) {
        (Some(path), _) => Ok(project_dir.join(path)),
        (None, Some(scheme)) => Ok(scheme.clone()),
        (None, None) => Err(CliError::Usage(
            "no scheme given: pass a path or set `scheme` in config".into(),
        )),
    }
}

#[instrument]
fn cmd_prune(
    project_dir: &Path,
    path: Option<&Path>,
    target: Option<&str>,
    dry_run: bool,
    backup: bool,
) -> CliResult<()> {
    let settings = Settings::load(Some(project_dir))?;
    let path = scheme_path(project_dir, path, &settings)?;
    let target = target
        .map(str::to_owned)
        .or(settings.target)
        .ok_or_else(|| {
            CliError::Usage("no target given: pass --target or set `target` in config".into())
        })?;
    if target.trim().is_empty() {
        return Err(CliError::InvalidArgs("target must not be empty".into()));
    }

    let options = PruneOptions {
        dry_run,
        backup: backup || settings.backup,
    };
    let outcomes = scheme_service().prune_path(&path, &target, options)?;
    report_prune(&outcomes, &target, dry_run);
    Ok(())
}

fn report_prune(outcomes: &[PruneOutcome], target: &str, dry_run: bool) {
    for outcome in outcomes {
        output::header(&outcome.path.display());
        if outcome.removals.is_empty() {
            output::detail(&format!("no reference to {target}"));
        }
        for removal in &outcome.removals {
            output::diff_remove(removal);
        }
    }

    let total: usize = outcomes.iter().map(|o| o.removals.len()).sum();
    let written = outcomes.iter().filter(|o| o.written).count();
    if dry_run {
        output::action(
            "Dry run",
            &format!("would remove {total} reference(s) to {target}"),
        );
    } else if total == 0 {
        output::warning(&format!("no references to {target} found"));
    } else {
        output::success(&format!(
            "removed {total} reference(s) to {target} from {written} scheme(s)"
        ));
    }
}

#[instrument]
fn cmd_list(project_dir: &Path, path: Option<&Path>) -> CliResult<()> {
    let settings = Settings::load(Some(project_dir))?;
    let path = scheme_path(project_dir, path, &settings)?;

    for scheme in scheme_service().list_path(&path)? {
        let mut tree = Tree::new(scheme.path.display().to_string());
        for section in Section::ALL {
            let leaves: Vec<String> = scheme
                .references
                .iter()
                .filter(|reference| reference.section == section)
                .map(describe_reference)
                .collect();
            if !leaves.is_empty() {
                tree.push(Tree::new(section.to_string()).with_leaves(leaves));
            }
        }
        output::info(&tree);
    }
    Ok(())
}

fn describe_reference(reference: &ReferenceListing) -> String {
    let name = reference.blueprint_name.as_deref().unwrap_or("<unnamed>");
    match &reference.buildable_name {
        Some(buildable) => format!("{name} ({buildable})"),
        None => name.to_string(),
    }
}

#[instrument]
fn cmd_config(project_dir: &Path, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = Settings::load(Some(project_dir))?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Path => {
            match global_config_path() {
                Some(global) => output::action("Global", &describe_config_file(&global)),
                None => output::action("Global", "(no config directory on this system)"),
            }
            output::action("Local", &describe_config_file(&local_config_path(project_dir)));
        }
        ConfigCommands::Init { global } => {
            let path = if *global {
                global_config_path().ok_or_else(|| {
                    CliError::Usage("cannot determine global config directory".into())
                })?
            } else {
                local_config_path(project_dir)
            };
            if path.exists() {
                return Err(CliError::Usage(format!(
                    "config file already exists: {}",
                    path.display()
                )));
            }
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).with_path_context("create config dir", parent)?;
            }
            std::fs::write(&path, Settings::template()).with_path_context("write config", &path)?;
            output::success(&format!("Created {}", path.display()));
        }
    }
    Ok(())
}

fn describe_config_file(path: &Path) -> String {
    if path.exists() {
        path.display().to_string()
    } else {
        format!("{} (not found)", path.display())
    }
}

fn cmd_completion(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_relative_path_when_resolving_then_joins_project_dir() {
        let settings = Settings::default();
        let path = scheme_path(Path::new("/proj"), Some(Path::new("a.xcscheme")), &settings)
            .expect("path");
        assert_eq!(path, PathBuf::from("/proj/a.xcscheme"));
    }

    #[test]
    fn given_no_path_when_resolving_then_falls_back_to_config() {
        let settings = Settings {
            scheme: Some(PathBuf::from("/elsewhere/b.xcscheme")),
            ..Settings::default()
        };
        let path = scheme_path(Path::new("/proj"), None, &settings).expect("path");
        assert_eq!(path, PathBuf::from("/elsewhere/b.xcscheme"));
    }

    #[test]
    fn given_no_path_and_no_config_when_resolving_then_usage_error() {
        let err = scheme_path(Path::new("/proj"), None, &Settings::default()).unwrap_err();
        assert!(matches!(err, CliError::Usage(_)));
    }

    #[test]
    fn given_reference_without_buildable_when_describing_then_shows_name() {
        let reference = ReferenceListing {
            section: Section::Build,
            blueprint_name: Some("App".into()),
            buildable_name: None,
            blueprint_identifier: None,
        };
        assert_eq!(describe_reference(&reference), "App");
    }
}

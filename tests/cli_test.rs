//! CLI tests: spawn the binary and check exit codes and file effects.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

use schemeprune::exitcode;

const SCHEME: &str = r#"<?xml version = "1.0" encoding = "UTF-8"?>
<Scheme
   version = "1.7">
   <LaunchAction
      buildConfiguration = "Debug">
      <BuildableProductRunnable
         runnableDebuggingMode = "0">
         <BuildableReference
            BuildableIdentifier = "primary"
            BlueprintName = "App">
         </BuildableReference>
      </BuildableProductRunnable>
   </LaunchAction>
</Scheme>
"#;

const PRUNED: &str = r#"<?xml version = "1.0" encoding = "UTF-8"?>
<Scheme
   version = "1.7">
   <LaunchAction
      buildConfiguration = "Debug">
   </LaunchAction>
</Scheme>
"#;

/// Run the binary in `project` with config lookups isolated to the temp dir.
fn run(project: &Path, args: &[&str]) -> Output {
    run_with_env(project, args, &[])
}

/// Like [`run`], with extra environment variables set on the child only.
fn run_with_env(project: &Path, args: &[&str], vars: &[(&str, &str)]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_schemeprune"))
        .current_dir(project)
        .env("HOME", project)
        .env("XDG_CONFIG_HOME", project.join(".config"))
        .env_remove("SCHEMEPRUNE_SCHEME")
        .env_remove("SCHEMEPRUNE_TARGET")
        .env_remove("SCHEMEPRUNE_BACKUP")
        .env("NO_COLOR", "1")
        .envs(vars.iter().copied())
        .args(args)
        .output()
        .expect("run schemeprune")
}

#[test]
fn prune_with_target_rewrites_scheme() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("App.xcscheme"), SCHEME).unwrap();

    let output = run(temp.path(), &["prune", "App.xcscheme", "--target", "App"]);

    assert!(output.status.success(), "{output:?}");
    assert_eq!(fs::read_to_string(temp.path().join("App.xcscheme")).unwrap(), PRUNED);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("LaunchAction/BuildableProductRunnable: App"), "{stdout}");
}

#[test]
fn prune_uses_target_and_scheme_from_local_config() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("App.xcscheme"), SCHEME).unwrap();
    fs::write(
        temp.path().join(".schemeprune.toml"),
        "scheme = \"App.xcscheme\"\ntarget = \"App\"\n",
    )
    .unwrap();

    let output = run(temp.path(), &["prune"]);

    assert!(output.status.success(), "{output:?}");
    assert_eq!(fs::read_to_string(temp.path().join("App.xcscheme")).unwrap(), PRUNED);
}

#[test]
fn prune_dry_run_leaves_file_alone() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("App.xcscheme"), SCHEME).unwrap();

    let output = run(temp.path(), &["prune", "App.xcscheme", "-t", "App", "--dry-run"]);

    assert!(output.status.success(), "{output:?}");
    assert_eq!(fs::read_to_string(temp.path().join("App.xcscheme")).unwrap(), SCHEME);
}

#[test]
fn prune_without_target_is_usage_error() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("App.xcscheme"), SCHEME).unwrap();

    let output = run(temp.path(), &["prune", "App.xcscheme"]);

    assert_eq!(output.status.code(), Some(exitcode::USAGE));
}

#[test]
fn prune_malformed_scheme_exits_with_dataerr() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("App.xcscheme"), "<Scheme><LaunchAction></Scheme>").unwrap();

    let output = run(temp.path(), &["prune", "App.xcscheme", "-t", "App"]);

    assert_eq!(output.status.code(), Some(exitcode::DATAERR));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid scheme"), "{stderr}");
}

#[test]
fn prune_missing_scheme_exits_with_noinput() {
    let temp = TempDir::new().unwrap();

    let output = run(temp.path(), &["prune", "Nope.xcscheme", "-t", "App"]);

    assert_eq!(output.status.code(), Some(exitcode::NOINPUT));
}

#[test]
fn list_prints_references() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("App.xcscheme"), SCHEME).unwrap();

    let output = run(temp.path(), &["list", "App.xcscheme"]);

    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("LaunchAction"), "{stdout}");
    assert!(stdout.contains("App"), "{stdout}");
}

#[test]
fn config_init_refuses_to_overwrite() {
    let temp = TempDir::new().unwrap();

    let first = run(temp.path(), &["config", "init"]);
    let second = run(temp.path(), &["config", "init"]);

    assert!(first.status.success(), "{first:?}");
    assert!(temp.path().join(".schemeprune.toml").exists());
    assert_eq!(second.status.code(), Some(exitcode::USAGE));
}

#[test]
fn prune_environment_overrides_local_config() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("App.xcscheme"), SCHEME).unwrap();
    fs::write(
        temp.path().join(".schemeprune.toml"),
        "scheme = \"App.xcscheme\"\ntarget = \"Other\"\nbackup = false\n",
    )
    .unwrap();

    let output = run_with_env(
        temp.path(),
        &["prune"],
        &[("SCHEMEPRUNE_TARGET", "App"), ("SCHEMEPRUNE_BACKUP", "true")],
    );

    assert!(output.status.success(), "{output:?}");
    assert_eq!(fs::read_to_string(temp.path().join("App.xcscheme")).unwrap(), PRUNED);
    assert_eq!(
        fs::read_to_string(temp.path().join("App.xcscheme.orig")).unwrap(),
        SCHEME
    );
}

#[test]
fn config_show_reflects_environment_over_local_config() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join(".schemeprune.toml"), "target = \"Other\"\n").unwrap();

    let output = run_with_env(temp.path(), &["config", "show"], &[("SCHEMEPRUNE_TARGET", "App")]);

    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("target = \"App\""), "{stdout}");
}

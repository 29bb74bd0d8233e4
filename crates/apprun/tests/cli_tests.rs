//! Tests against the real apprun binary.

#![cfg(unix)]

mod common;

use assert_cmd::Command;
use common::Bundle;
use predicates::prelude::*;
use std::fs;
use std::path::Path;

#[allow(deprecated)]
fn apprun(bundle: &Bundle) -> Command {
    let mut cmd = Command::cargo_bin("apprun").unwrap();
    for var in [
        "APPIMAGE",
        "ARGV0",
        "APP_ENTRY_POINT",
        "APP_DEFAULT_ENTRY_POINT",
        "VIRTUAL_ENV",
        "APPRUN_CONFIG",
        "PYTHONUSERBASE",
        "PYTHONPATH",
    ] {
        cmd.env_remove(var);
    }
    cmd.env("APPDIR", bundle.root());
    cmd
}

#[test]
fn test_help_output() {
    let bundle = Bundle::new();
    apprun(&bundle)
        .arg("--python-help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--python-venv"))
        .stdout(predicate::str::contains("--python-entry-point"));
}

#[test]
fn test_help_without_interpreter() {
    let bundle = Bundle::new();
    let empty = tempfile::tempdir().unwrap();
    apprun(&bundle)
        .env("APPDIR", empty.path())
        .arg("--python-help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--python-venv"));
}

#[test]
fn test_conflict_reported_before_interpreter_lookup() {
    let bundle = Bundle::new();
    let empty = tempfile::tempdir().unwrap();
    apprun(&bundle)
        .env("APPDIR", empty.path())
        .args(["--python-interpreter", "--python-venv", "x"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn test_missing_bundle_root() {
    let bundle = Bundle::new();
    apprun(&bundle)
        .env_remove("APPDIR")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("APPDIR environment variable missing!"));
}

#[test]
fn test_conflicting_actions() {
    let bundle = Bundle::new();
    apprun(&bundle)
        .args(["--python-interpreter", "--python-entry-point", "mytool"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn test_unrecognized_private_flag() {
    let bundle = Bundle::new();
    apprun(&bundle)
        .args(["--verbose", "--python-foo"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains(
            "unrecognized python arguments: '--python-foo'",
        ));
}

#[test]
fn test_runs_command_by_invoked_name() {
    let bundle = Bundle::new();
    apprun(&bundle)
        .env("ARGV0", "mytool")
        .arg("--verbose")
        .assert()
        .code(7)
        .stdout(predicate::str::contains("arg:-P\narg:-c\n"))
        .stdout(predicate::str::contains("sys.argv[0] = 'mytool'"))
        .stdout(predicate::str::contains("arg:--verbose\n"));
}

#[test]
fn test_invalid_entry_point_option() {
    let bundle = Bundle::new();
    apprun(&bundle)
        .args(["--python-entry-point", "typo"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("'typo' is not a valid entry point!"));
}

#[test]
fn test_unknown_entry_point_option_falls_back_to_default() {
    let bundle = Bundle::new();
    apprun(&bundle)
        .env("ARGV0", "AppRun")
        .env("APP_DEFAULT_ENTRY_POINT", "mytool")
        .args(["--python-entry-point", "typo"])
        .assert()
        .code(7)
        .stdout(predicate::str::contains("sys.argv[0] = 'mytool'"));
}

#[test]
fn test_reserved_name_starts_interpreter() {
    let bundle = Bundle::new();
    apprun(&bundle)
        .env("ARGV0", "python3")
        .env("APP_DEFAULT_ENTRY_POINT", "mytool")
        .args(["-c", "print(1)"])
        .assert()
        .code(7)
        .stdout(predicate::str::contains("arg:-P\narg:-c\narg:print(1)\n"))
        .stdout(predicate::str::contains("sys.argv[0]").not());
}

#[test]
fn test_provisions_two_environments() {
    let bundle = Bundle::new();
    let work = tempfile::tempdir().unwrap();
    let env1 = work.path().join("env1");
    let env2 = work.path().join("env2");

    apprun(&bundle)
        .arg("--python-venv")
        .arg(&env1)
        .arg(&env2)
        .arg("--system-site-packages")
        .assert()
        .success();

    for env in [&env1, &env2] {
        assert_eq!(fs::read_link(env.join("bin/python3")).unwrap(), bundle.app_run());
        assert_eq!(fs::read_link(env.join("bin/mytool")).unwrap(), Path::new("python3"));
        let cfg = fs::read_to_string(env.join("pyvenv.cfg")).unwrap();
        assert!(cfg.contains("include-system-site-packages = true"));
    }
}

#[test]
fn test_command_link_in_environment_activates_it() {
    let bundle = Bundle::new();
    let work = tempfile::tempdir().unwrap();
    let env = work.path().join("env");

    apprun(&bundle).arg("--python-venv").arg(&env).assert().success();

    apprun(&bundle)
        .env("ARGV0", env.join("bin/mytool"))
        .assert()
        .code(7)
        .stdout(predicate::str::contains(format!("PYTHONUSERBASE={}\n", env.display())))
        .stdout(predicate::str::contains(format!(
            "sys.executable = '{}'",
            env.join("bin/python3").display()
        )));
}

#[test]
fn test_config_file_sets_default() {
    let bundle = Bundle::new();
    fs::write(bundle.root().join("apprun.toml"), "default_entry_point = \"mytool\"\n").unwrap();

    apprun(&bundle)
        .env("ARGV0", "AppRun")
        .assert()
        .code(7)
        .stdout(predicate::str::contains("sys.argv[0] = 'mytool'"));
}

#[test]
fn test_malformed_config() {
    let bundle = Bundle::new();
    fs::write(bundle.root().join("apprun.toml"), "unknown_key = 1\n").unwrap();

    apprun(&bundle)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("loading bundle configuration"));
}

#![cfg(unix)]

mod common;

use apprun::activate::{ActivatedBy, activate, find_env_from_links};
use apprun::config::BundleConfig;
use apprun::provision::provision;
use apprun::state::{Environment, LauncherState, vars};
use apprun_venv::EnvOptions;
use common::Bundle;
use std::os::unix::fs::symlink;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn provisioned(bundle: &Bundle, env: &Path) {
    let python = BundleConfig::default().resolve_python(bundle.root()).unwrap();
    provision(
        &python.interpreter,
        &bundle.app_run(),
        &["mytool".to_string()],
        &[env],
        EnvOptions::default(),
    )
    .unwrap();
}

fn state(bundle: &Bundle, extra: &[(&str, &Path)]) -> LauncherState {
    let mut env = Environment::new("/").with(vars::APPDIR, bundle.root());
    for (k, v) in extra {
        env = env.with(*k, *v);
    }
    LauncherState::from_env(&env).unwrap()
}

fn interpreter(bundle: &Bundle) -> apprun_platform::Interpreter {
    BundleConfig::default()
        .resolve_python(bundle.root())
        .unwrap()
        .interpreter
}

#[test]
fn test_virtual_env_of_this_bundle() {
    let bundle = Bundle::new();
    let work = TempDir::new().unwrap();
    let env = work.path().join("env");
    provisioned(&bundle, &env);

    let mut state = state(&bundle, &[(vars::VIRTUAL_ENV, env.as_path())]);
    assert_eq!(activate(&mut state, &interpreter(&bundle)), Some(ActivatedBy::VirtualEnv));
    assert_eq!(state.active_env.as_deref(), Some(env.as_path()));
    assert_eq!(state.overlay.prepended("PATH"), vec![env.join("bin")]);
    assert_eq!(state.executable_override(), Some(env.join("bin/python3")));
}

#[test]
fn test_foreign_virtual_env_is_ignored() {
    let bundle = Bundle::new();
    let other = Bundle::new();
    let work = TempDir::new().unwrap();
    let env = work.path().join("env");
    provisioned(&other, &env);

    let mut state = state(&bundle, &[(vars::VIRTUAL_ENV, env.as_path())]);
    assert_eq!(activate(&mut state, &interpreter(&bundle)), None);
    assert!(state.overlay.is_empty());
    assert!(state.active_env.is_none());
}

#[test]
fn test_virtual_env_needs_only_the_interpreter_link() {
    let bundle = Bundle::new();
    let work = TempDir::new().unwrap();
    let env = work.path().join("env");
    std::fs::create_dir_all(env.join("bin")).unwrap();
    symlink(bundle.app_run(), env.join("bin/python3")).unwrap();

    let mut state = state(&bundle, &[(vars::VIRTUAL_ENV, env.as_path())]);
    assert_eq!(activate(&mut state, &interpreter(&bundle)), Some(ActivatedBy::VirtualEnv));
}

#[test]
fn test_user_link_into_environment() {
    let bundle = Bundle::new();
    let work = TempDir::new().unwrap();
    let env = work.path().join("env");
    provisioned(&bundle, &env);

    let user_bin = work.path().join("home/bin");
    std::fs::create_dir_all(&user_bin).unwrap();
    let user_link = user_bin.join("mytool");
    symlink(env.join("bin/mytool"), &user_link).unwrap();

    let mut state = state(&bundle, &[(vars::ARGV0, user_link.as_path())]);
    assert_eq!(
        activate(&mut state, &interpreter(&bundle)),
        Some(ActivatedBy::InvocationPath)
    );
    assert_eq!(state.active_env, Some(env));
}

#[test]
fn test_relative_link_reached_through_symlinked_directory() {
    let bundle = Bundle::new();
    let work = TempDir::new().unwrap();
    let env = work.path().join("env");
    provisioned(&bundle, &env);

    let real = work.path().join("links/sub");
    std::fs::create_dir_all(&real).unwrap();
    symlink(env.join("bin/mytool"), work.path().join("links/env_link")).unwrap();
    symlink("../env_link", real.join("tool")).unwrap();
    symlink(&real, work.path().join("alias")).unwrap();

    let invoked = work.path().join("alias/tool");
    let mut state = state(&bundle, &[(vars::ARGV0, invoked.as_path())]);
    assert_eq!(
        activate(&mut state, &interpreter(&bundle)),
        Some(ActivatedBy::InvocationPath)
    );
    assert_eq!(state.active_env, Some(env));
}

#[test]
fn test_bare_name_found_on_search_path() {
    let bundle = Bundle::new();
    let work = TempDir::new().unwrap();
    let env = work.path().join("env");
    provisioned(&bundle, &env);

    let mut state = state(
        &bundle,
        &[(vars::ARGV0, Path::new("mytool")), (vars::PATH, env.join("bin").as_path())],
    );
    assert_eq!(
        activate(&mut state, &interpreter(&bundle)),
        Some(ActivatedBy::InvocationPath)
    );
}

#[test]
fn test_plain_file_does_not_activate() {
    let bundle = Bundle::new();
    let mut state = state(&bundle, &[(vars::ARGV0, bundle.app_run().as_path())]);
    assert_eq!(activate(&mut state, &interpreter(&bundle)), None);
}

#[test]
fn test_cyclic_chain_terminates() {
    let work = TempDir::new().unwrap();
    let a = work.path().join("x/bin/a");
    let b = work.path().join("y/bin/b");
    std::fs::create_dir_all(a.parent().unwrap()).unwrap();
    std::fs::create_dir_all(b.parent().unwrap()).unwrap();
    symlink(&b, &a).unwrap();
    symlink(&a, &b).unwrap();

    assert_eq!(find_env_from_links(&a, Path::new("/nonexistent/AppRun")), None);
}

#[test]
fn test_dangling_chain_terminates() {
    let work = TempDir::new().unwrap();
    let link: PathBuf = work.path().join("bin/tool");
    std::fs::create_dir_all(link.parent().unwrap()).unwrap();
    symlink("missing", &link).unwrap();

    assert_eq!(find_env_from_links(&link, Path::new("/nonexistent/AppRun")), None);
}

//! Launcher for relocatable Python application bundles.
//!
//! Started by the bundle's `AppRun` wrapper, the launcher decides between
//! running a packaged command, replacing itself with the bundled
//! interpreter, and provisioning virtual environments that point back at
//! the bundle.

pub mod activate;
pub mod cli;
pub mod config;
pub mod error;
pub mod launcher;
pub mod provision;
pub mod state;

pub use error::{ConfigError, LaunchError, UsageError};
pub use launcher::{Action, decide, perform};
pub use state::{Environment, LauncherState};

use anyhow::Context;
use apprun_shim::{CachedRegistry, EntryPointRegistry};
use config::BundleConfig;
use std::ffi::OsString;
use tracing::debug;

/// Runs one invocation and returns its exit code.
///
/// Starting the interpreter does not return.
pub fn run(argv: Vec<OsString>, env: &Environment) -> anyhow::Result<i32> {
    let mut state = LauncherState::from_env(env).map_err(LaunchError::from)?;
    let parsed = cli::split(argv).map_err(LaunchError::from)?;

    let config_path = env
        .path(state::vars::APPRUN_CONFIG)
        .unwrap_or_else(|| BundleConfig::default_path(&state.bundle_root));
    let config = BundleConfig::load(&config_path)
        .map_err(LaunchError::from)
        .context("loading bundle configuration")?;
    let python = config
        .resolve_python(&state.bundle_root)
        .map_err(LaunchError::from)
        .context("locating the bundled interpreter")?;

    if let Some(by) = activate::activate(&mut state, &python.interpreter) {
        debug!(?by, env = ?state.active_env, "environment active");
    }

    state.apply_default(parsed.private.main.clone(), config.default_entry_point.clone());

    let mut site_dirs = Vec::new();
    if let Some(env_dir) = &state.active_env {
        site_dirs.push(
            apprun_venv::EnvLayout::new(env_dir).site_packages(python.interpreter.version()),
        );
    }
    site_dirs.extend(python.site_packages.iter().cloned());
    let registry = CachedRegistry::new(EntryPointRegistry::new(site_dirs));

    let action = decide(
        &parsed,
        &state,
        registry.index(),
        python.interpreter.reserved_names(),
    )?;
    let code = perform(action, &state, &python, registry.index())?;
    Ok(code)
}

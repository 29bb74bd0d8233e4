//! Re-activation of environments provisioned from this bundle.
//!
//! Activation is best-effort: unreadable links and missing files end the
//! search without an error, and the launcher continues unisolated.

use crate::state::LauncherState;
use apprun_fs::LinkWalk;
use apprun_platform::{EnvOverlay, Interpreter};
use apprun_venv::EnvLayout;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Which strategy found the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivatedBy {
    VirtualEnv,
    InvocationPath,
}

/// Records the environment edits that make `env_dir` the active environment.
pub fn env_overlay(env_dir: &Path, interpreter: &Interpreter) -> EnvOverlay {
    let layout = EnvLayout::new(env_dir);
    let mut overlay = EnvOverlay::new();
    overlay
        .prepend_path("PATH", layout.bin_dir())
        .set("PYTHONUSERBASE", env_dir)
        .remove("PYTHONNOUSERSITE")
        .prepend_path("PYTHONPATH", layout.site_packages(interpreter.version()));
    overlay
}

fn apply(state: &mut LauncherState, env_dir: PathBuf, interpreter: &Interpreter) {
    state.overlay = env_overlay(&env_dir, interpreter);
    state.active_env = Some(env_dir);
}

/// Locates the command the launcher was started as.
///
/// A path containing a separator is taken as is, a bare name is looked up
/// on the search path.
pub fn invoked_command(state: &LauncherState) -> Option<PathBuf> {
    let invoked = state.invoked_path.as_deref()?;
    if invoked.components().count() > 1 {
        return Some(state.cwd.join(invoked));
    }
    match which::which_in(invoked, state.search_path.as_ref(), &state.cwd) {
        Ok(path) => Some(path),
        Err(err) => {
            debug!(command = %invoked.display(), error = %err, "invoked command not on PATH");
            None
        }
    }
}

/// Walks the symlink chain from `start`, testing the grandparent of every
/// link as an environment root.
pub fn find_env_from_links(start: &Path, bundle: &Path) -> Option<PathBuf> {
    LinkWalk::new(start).find_map(|link| {
        let candidate = link.parent()?.parent()?;
        debug!(candidate = %candidate.display(), "checking environment candidate");
        EnvLayout::new(candidate)
            .points_at(bundle)
            .then(|| candidate.to_path_buf())
    })
}

/// Activates the environment this invocation belongs to, if any.
pub fn activate(state: &mut LauncherState, interpreter: &Interpreter) -> Option<ActivatedBy> {
    let bundle = state.bundle_identity();

    if let Some(env_dir) = state.isolated_env_path.clone() {
        if EnvLayout::new(&env_dir).interpreter_resolves_to(&bundle) {
            info!(env = %env_dir.display(), "activating VIRTUAL_ENV");
            apply(state, env_dir, interpreter);
            return Some(ActivatedBy::VirtualEnv);
        }
        debug!(env = %env_dir.display(), "VIRTUAL_ENV does not belong to this bundle");
    }

    let command = invoked_command(state)?;
    if !command.is_symlink() {
        return None;
    }
    let env_dir = find_env_from_links(&command, &bundle)?;
    info!(env = %env_dir.display(), command = %command.display(), "activating environment of invoked link");
    apply(state, env_dir, interpreter);
    Some(ActivatedBy::InvocationPath)
}

//! Environments whose interpreter is the bundle itself.

use crate::error::{LaunchError, Result};
use apprun_fs::{atomic_symlink, symlink_if_absent};
use apprun_platform::Interpreter;
use apprun_venv::{EnvBuilder, EnvContext, EnvHook, EnvLayout, EnvOptions, INTERPRETER_LINK};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Repoints `bin/python3` at the bundle and adds one link per packaged
/// command, so every program started from the environment re-enters the
/// launcher.
#[derive(Debug, Clone)]
pub struct BundlePatch {
    bundle:   PathBuf,
    commands: Vec<String>,
}

impl BundlePatch {
    pub fn new(bundle: impl Into<PathBuf>, commands: impl IntoIterator<Item = String>) -> Self {
        Self {
            bundle:   bundle.into(),
            commands: commands.into_iter().collect(),
        }
    }
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\'])
}

impl EnvHook for BundlePatch {
    fn name(&self) -> &'static str {
        "bundle_patch"
    }

    fn post_interpreter(&self, ctx: &mut EnvContext) -> apprun_venv::Result<()> {
        let link = ctx.layout.interpreter_link();
        atomic_symlink(&self.bundle, &link)?;
        debug!(link = %link.display(), bundle = %self.bundle.display(), "interpreter redirected");

        let bin_dir = ctx.bin_dir();
        for command in &self.commands {
            if !is_plain_file_name(command) {
                debug!(%command, "skipping command with an unusable name");
                continue;
            }
            let path = bin_dir.join(command);
            if symlink_if_absent(INTERPRETER_LINK, &path)? {
                ctx.created_links.push(path);
            }
        }
        Ok(())
    }
}

/// Creates every directory in `dirs` as an environment backed by `bundle`.
pub fn provision<P: AsRef<Path>>(
    interpreter: &Interpreter,
    bundle: &Path,
    commands: &[String],
    dirs: &[P],
    options: EnvOptions,
) -> Result<Vec<EnvLayout>> {
    let patch = BundlePatch::new(bundle, commands.iter().cloned());
    let mut layouts = Vec::with_capacity(dirs.len());

    for dir in dirs {
        let dir = dir.as_ref();
        let options = EnvOptions {
            command: Some(format!("{} -m venv {}", bundle.display(), dir.display())),
            ..options.clone()
        };
        let layout = EnvBuilder::new(interpreter.clone(), options)
            .hook(patch.clone())
            .create(dir)
            .map_err(|source| LaunchError::Provision {
                path: dir.to_path_buf(),
                source,
            })?;
        info!(env = %layout.root().display(), "environment ready");
        layouts.push(layout);
    }
    Ok(layouts)
}

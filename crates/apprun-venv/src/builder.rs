//! Environment builder - the step pipeline with hook points.

use crate::context::{EnvContext, EnvOptions};
use crate::error::{Error, Result};
use crate::hooks::EnvHook;
use crate::layout::EnvLayout;
use crate::steps::{EnvStep, Stage, default_steps};
use apprun_fs::absolutize;
use apprun_platform::Interpreter;
use std::path::Path;
use tracing::{debug, info};

/// Composable builder for isolated environments.
///
/// Steps run in [`Stage`] order, steps of the same stage in insertion order.
/// Every hook is called exactly once per stage point for each directory.
pub struct EnvBuilder {
    interpreter: Interpreter,
    options:     EnvOptions,
    steps:       Vec<Box<dyn EnvStep>>,
    hooks:       Vec<Box<dyn EnvHook>>,
}

impl EnvBuilder {
    pub fn new(interpreter: Interpreter, options: EnvOptions) -> Self {
        Self {
            interpreter,
            options,
            steps: default_steps(),
            hooks: vec![],
        }
    }

    /// Builder without the standard steps.
    pub fn empty(interpreter: Interpreter, options: EnvOptions) -> Self {
        Self {
            steps: vec![],
            ..Self::new(interpreter, options)
        }
    }

    pub fn step<S: EnvStep + 'static>(mut self, step: S) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    pub fn hook<H: EnvHook + 'static>(mut self, hook: H) -> Self {
        self.hooks.push(Box::new(hook));
        self
    }

    fn ordered_steps(&self) -> Vec<&dyn EnvStep> {
        let mut steps: Vec<&dyn EnvStep> = self.steps.iter().map(|s| s.as_ref()).collect();
        steps.sort_by_key(|s| s.stage());
        steps
    }

    fn run_hooks<F>(&self, ctx: &mut EnvContext, point: F) -> Result<()>
    where
        F: Fn(&dyn EnvHook, &mut EnvContext) -> Result<()>,
    {
        for hook in &self.hooks {
            point(hook.as_ref(), ctx).map_err(|e| Error::HookFailed {
                name:   hook.name().to_string(),
                source: Box::new(e),
            })?;
        }
        Ok(())
    }

    /// Creates (or completes) an environment in `dir`.
    pub fn create(&self, dir: &Path) -> Result<EnvLayout> {
        let root = absolutize(dir)?;
        if root.exists() && !root.is_dir() {
            return Err(Error::NotADirectory { path: root });
        }

        info!(env = %root.display(), "creating environment");
        let mut ctx = EnvContext::new(
            EnvLayout::new(root),
            self.interpreter.clone(),
            self.options.clone(),
        );

        self.run_hooks(&mut ctx, |h, ctx| h.pre_create(ctx))?;

        let steps = self.ordered_steps();
        for (idx, step) in steps.iter().enumerate() {
            debug!(step = step.name(), "running step");
            step.apply(&mut ctx).map_err(|e| Error::StepFailed {
                name:   step.name(),
                source: Box::new(e),
            })?;

            let stage_done = steps
                .get(idx + 1)
                .is_none_or(|next| next.stage() != step.stage());
            if stage_done && step.stage() == Stage::Interpreter {
                self.run_hooks(&mut ctx, |h, ctx| h.post_interpreter(ctx))?;
            }
        }

        self.run_hooks(&mut ctx, |h, ctx| h.post_create(ctx))?;
        Ok(ctx.layout)
    }

    /// Creates every directory in order, stopping at the first failure.
    pub fn create_all<I, P>(&self, dirs: I) -> Result<Vec<EnvLayout>>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        dirs.into_iter().map(|dir| self.create(dir.as_ref())).collect()
    }
}

impl std::fmt::Debug for EnvBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvBuilder")
            .field("interpreter", &self.interpreter)
            .field("options", &self.options)
            .field("steps", &self.steps.iter().map(|s| s.name()).collect::<Vec<_>>())
            .field("hooks", &self.hooks.iter().map(|h| h.name()).collect::<Vec<_>>())
            .finish()
    }
}

//! Hook traits for the environment creation lifecycle.
//!
//! Hooks allow injecting distribution-specific or policy-specific behavior
//! without polluting the mechanical steps.

use crate::context::EnvContext;
use crate::error::Result;

pub trait EnvHook: Send + Sync {
    /// Name of this hook for error reporting.
    fn name(&self) -> &'static str;

    /// Called before the first step.
    fn pre_create(&self, _ctx: &mut EnvContext) -> Result<()> {
        Ok(())
    }

    /// Called once the interpreter links exist.
    fn post_interpreter(&self, _ctx: &mut EnvContext) -> Result<()> {
        Ok(())
    }

    /// Called after every step has completed.
    fn post_create(&self, _ctx: &mut EnvContext) -> Result<()> {
        Ok(())
    }
}

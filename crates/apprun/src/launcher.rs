//! Dispatch of one invocation.
//!
//! [`decide`] is pure: it maps the parsed arguments, the launcher state and
//! the registry to exactly one [`Action`]. [`perform`] carries it out.

use crate::cli::{ParsedArgs, venv_invocation};
use crate::config::BundlePython;
use crate::error::Result;
use crate::provision::provision;
use crate::state::LauncherState;
use apprun_platform::Command;
use apprun_shim::{Error as ShimError, RegistryIndex, ResolveMode, Resolver, TargetDescriptor};
use apprun_venv::EnvOptions;
use std::ffi::OsString;
use std::path::PathBuf;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Provision {
        dirs:                 Vec<PathBuf>,
        system_site_packages: bool,
        prompt:               Option<String>,
    },
    Interpreter {
        args: Vec<OsString>,
    },
    RunTarget {
        descriptor: TargetDescriptor,
        args:       Vec<OsString>,
    },
}

fn interpreter_or_venv(args: &[OsString]) -> Result<Action> {
    match venv_invocation(args) {
        Some(venv) => {
            let venv = venv?;
            Ok(Action::Provision {
                dirs:                 venv.dirs,
                system_site_packages: venv.system_site_packages,
                prompt:               venv.prompt,
            })
        }
        None => Ok(Action::Interpreter {
            args: args.to_vec(),
        }),
    }
}

/// Chooses what this invocation does.
///
/// Without an action option, a failed resolution falls back to the
/// interpreter. With `--python-entry-point` the option takes the place of
/// the explicit target, and it is an error when nothing resolves at all.
pub fn decide(
    parsed: &ParsedArgs,
    state: &LauncherState,
    index: &RegistryIndex,
    reserved: Vec<String>,
) -> Result<Action> {
    let args = parsed.target_args();

    if !parsed.private.venv.is_empty() {
        return Ok(Action::Provision {
            dirs:                 parsed.private.venv.clone(),
            system_site_packages: parsed.private.system_site_packages,
            prompt:               None,
        });
    }
    if parsed.private.interpreter {
        return interpreter_or_venv(args);
    }

    let resolver = Resolver::new(index, reserved);
    if resolver.is_reserved(state.invoked_name.as_deref()) {
        debug!(name = ?state.invoked_name, "invoked as the interpreter");
        return interpreter_or_venv(args);
    }

    let resolution = match &parsed.private.entry_point {
        Some(entry_point) => {
            let mut request = state.resolve_request();
            request.explicit = Some(entry_point.clone());
            match resolver.resolve(&request, ResolveMode::WithDefault) {
                Some(resolution) => resolution,
                None => return Err(ShimError::NotFound(entry_point.clone()).into()),
            }
        }
        None => match resolver.resolve(&state.resolve_request(), ResolveMode::WithDefault) {
            Some(resolution) => resolution,
            None => {
                debug!("no packaged command resolved");
                return interpreter_or_venv(args);
            }
        },
    };

    info!(
        command = resolution.descriptor.name(),
        target = resolution.descriptor.qualified_target(),
        source = ?resolution.source,
        "resolved packaged command"
    );
    Ok(Action::RunTarget {
        descriptor: resolution.descriptor,
        args:       args.to_vec(),
    })
}

/// Builds the command that replaces the launcher with the interpreter.
pub fn interpreter_command(
    python: &BundlePython,
    state: &LauncherState,
    args: &[OsString],
) -> Result<Command> {
    let mut cmd = Command::new(python.interpreter.path());
    if python.interpreter.supports_safe_path() {
        cmd = cmd.arg("-P");
    }
    Ok(cmd.args(args).overlay(&state.overlay)?)
}

/// Carries out `action` and returns the exit code of the invocation.
///
/// Starting the interpreter replaces the process, so that arm only returns
/// on failure.
pub fn perform(
    action: Action,
    state: &LauncherState,
    python: &BundlePython,
    index: &RegistryIndex,
) -> Result<i32> {
    match action {
        Action::Provision {
            dirs,
            system_site_packages,
            prompt,
        } => {
            let options = EnvOptions {
                system_site_packages,
                prompt,
                command: None,
            };
            let commands: Vec<String> = index.commands().map(str::to_string).collect();
            provision(
                &python.interpreter,
                &state.bundle_identity(),
                &commands,
                &dirs,
                options,
            )?;
            Ok(0)
        }
        Action::Interpreter { args } => {
            let never = interpreter_command(python, state, &args)?.exec()?;
            match never {}
        }
        Action::RunTarget { descriptor, args } => {
            let mut target = descriptor.load(&python.interpreter)?;
            if let Some(executable) = state.executable_override() {
                target = target.with_executable(executable);
            }
            Ok(target.call(args, &state.overlay)?)
        }
    }
}

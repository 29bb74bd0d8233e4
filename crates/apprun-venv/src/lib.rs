//! Isolated environment creation as an explicit pipeline.
//!
//! # Architecture
//!
//! An [`EnvBuilder`] runs a list of [`EnvStep`]s (directories, config,
//! interpreter links, activation scripts) against an [`EnvContext`].
//! Callers that need to adjust the result, such as redirecting the
//! interpreter link, register an [`EnvHook`] instead of replacing a step.
//!
//! ```no_run
//! use apprun_platform::{Interpreter, PythonVersion};
//! use apprun_venv::{EnvBuilder, EnvOptions};
//! use std::path::Path;
//!
//! let python = Interpreter::new("/opt/python3.11/bin/python3.11", PythonVersion::new(3, 11));
//! let layout = EnvBuilder::new(python, EnvOptions::default())
//!     .create(Path::new("/tmp/env"))
//!     .unwrap();
//! assert!(layout.is_complete());
//! ```

pub use builder::EnvBuilder;
pub use context::{EnvContext, EnvOptions};
pub use error::{Error, Result};
pub use hooks::EnvHook;
pub use layout::{ACTIVATE_SCRIPT, CONFIG_FILE, EnvLayout, INTERPRETER_LINK};
pub use scripts::Shell;
pub use steps::{
    CreateDirs, EnvStep, SetupInterpreter, Stage, WriteActivation, WriteConfig, default_steps,
};

mod builder;
mod context;
mod error;
mod hooks;
mod layout;
mod scripts;
mod steps;

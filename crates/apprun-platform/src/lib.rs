pub use error::{Error, Result};

pub mod command;
pub mod env;
mod error;
pub mod interpreter;

pub use command::Command;
pub use env::{EnvChange, EnvOverlay, PathModifier};
pub use interpreter::{Interpreter, PythonVersion};

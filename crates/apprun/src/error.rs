//! Error taxonomy of a launcher invocation.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("APPDIR environment variable missing!")]
    MissingBundleRoot,

    #[error("failed to read {}", .path.display())]
    Read {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration in {}", .path.display())]
    Parse {
        path:   PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("no python interpreter found under {}", .bundle_root.display())]
    NoInterpreter { bundle_root: PathBuf },

    #[error("cannot determine the python version of {}", .path.display())]
    UnknownVersion { path: PathBuf },

    #[error(transparent)]
    Version(#[from] apprun_platform::Error),
}

/// Conflicting, malformed or unrecognized private options.
#[derive(Debug, Error)]
pub enum UsageError {
    #[error(transparent)]
    Clap(#[from] clap::Error),

    #[error("{prog}: error: unrecognized python arguments: '{}'", .flags.join(" "))]
    Unrecognized { prog: String, flags: Vec<String> },
}

impl UsageError {
    /// Prints the error the way it is meant to be seen and returns the exit code.
    ///
    /// Help requests go to stdout with code 0, everything else to stderr.
    pub fn report(&self) -> i32 {
        match self {
            UsageError::Clap(err) => {
                let _ = err.print();
                err.exit_code()
            }
            UsageError::Unrecognized { .. } => {
                eprintln!("{self}");
                2
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Usage(#[from] UsageError),

    #[error(transparent)]
    InvalidEntryPoint(#[from] apprun_shim::Error),

    #[error("failed to provision {}", .path.display())]
    Provision {
        path:   PathBuf,
        #[source]
        source: apprun_venv::Error,
    },

    #[error(transparent)]
    Process(#[from] apprun_platform::Error),
}

impl LaunchError {
    pub fn exit_code(&self) -> i32 {
        match self {
            LaunchError::Usage(err) => match err {
                UsageError::Clap(err) => err.exit_code(),
                UsageError::Unrecognized { .. } => 2,
            },
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, LaunchError>;

//! Error types for environment creation.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{} exists and is not a directory", .path.display())]
    NotADirectory { path: PathBuf },

    #[error("failed to create directory {}", .path.display())]
    CreateDir {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}", .path.display())]
    WriteFile {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("step '{name}' failed")]
    StepFailed {
        name:   &'static str,
        #[source]
        source: Box<Error>,
    },

    #[error("hook '{name}' failed")]
    HookFailed {
        name:   String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error(transparent)]
    Fs(#[from] apprun_fs::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

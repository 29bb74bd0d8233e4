//! Error types for entry point operations.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("'{0}' is not a valid entry point!")]
    NotFound(String),

    #[error("invalid entry point '{target}': {reason}")]
    InvalidTarget { target: String, reason: &'static str },

    #[error(transparent)]
    Platform(#[from] apprun_platform::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

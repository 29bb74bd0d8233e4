use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid python version: {0}")]
    InvalidVersion(String),

    #[error("search path entry contains a separator: {0}")]
    JoinPaths(String),

    #[error("command failed: {cmd}, source: {source}")]
    CommandFailed { cmd: String, source: std::io::Error },
}

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read symlink {}", .path.display())]
    ReadLink {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to create {}", .path.display())]
    Write {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to remove {}", .path.display())]
    Remove {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("symlink chain starting at {} does not terminate", .path.display())]
    LinkLoop { path: PathBuf },

    #[error("failed to resolve the current directory")]
    CurrentDir(#[source] std::io::Error),

    #[error("symlink not supported on this platform")]
    SymlinkNotSupported,
}

pub type Result<T> = std::result::Result<T, Error>;

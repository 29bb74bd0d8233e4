//! Filesystem primitives for locating and rewiring bundle symlinks.
//!
//! Links are followed one hop at a time so callers can inspect every
//! intermediate path of a chain. Every walk is bounded by
//! [`MAX_SYMLINK_HOPS`] and stops on revisits, so cyclic chains terminate.

mod error;
mod link;
mod path;
mod symlink;

pub use error::{Error, Result};
pub use link::{LinkWalk, MAX_SYMLINK_HOPS, read_link_hop, resolve_link_chain};
pub use path::{absolutize, normalize_lexically};
pub use symlink::{atomic_symlink, remove_file_if_exists, symlink, symlink_if_absent};

use crate::path::normalize_lexically;
use crate::{Error, Result};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Upper bound on hops, matching the kernel's `ELOOP` limit.
pub const MAX_SYMLINK_HOPS: usize = 40;

/// Resolves a single level of indirection.
///
/// Relative targets are interpreted against the physical directory holding
/// the link, so `..` steps out of the real directory even when the link was
/// reached through a symlinked one. The directory of the result is
/// canonicalized, its final component never is, so a target that is itself
/// a symlink is returned as-is. Absolute targets are only normalized.
pub fn read_link_hop(link: &Path) -> Result<PathBuf> {
    let read_error = |source| Error::ReadLink {
        path: link.to_path_buf(),
        source,
    };
    let target = std::fs::read_link(link).map_err(read_error)?;
    if target.is_absolute() {
        return Ok(normalize_lexically(&target));
    }
    let base = match link.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let joined = std::fs::canonicalize(base).map_err(read_error)?.join(target);
    match (joined.parent(), joined.file_name()) {
        (Some(dir), Some(name)) => Ok(std::fs::canonicalize(dir).map_err(read_error)?.join(name)),
        _ => std::fs::canonicalize(&joined).map_err(read_error),
    }
}

/// Follows `path` hop by hop until a non-symlink is reached.
pub fn resolve_link_chain(path: &Path) -> Result<PathBuf> {
    let mut current = crate::absolutize(path)?;
    let mut visited = HashSet::new();
    while current.is_symlink() {
        if visited.len() >= MAX_SYMLINK_HOPS || !visited.insert(current.clone()) {
            return Err(Error::LinkLoop {
                path: path.to_path_buf(),
            });
        }
        current = read_link_hop(&current)?;
    }
    Ok(current)
}

/// Iterator over the symlinks of a chain, starting with the given path.
///
/// Yields each path that is a symlink, then reads it to find the next one.
/// The walk ends at the first non-symlink, on a read error, on a revisit,
/// or after [`MAX_SYMLINK_HOPS`] links.
#[derive(Debug)]
pub struct LinkWalk {
    next:    Option<PathBuf>,
    visited: HashSet<PathBuf>,
}

impl LinkWalk {
    pub fn new(start: impl Into<PathBuf>) -> Self {
        Self {
            next:    Some(start.into()),
            visited: HashSet::new(),
        }
    }
}

impl Iterator for LinkWalk {
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> {
        let current = self.next.take()?;
        if !current.is_symlink() {
            return None;
        }
        if self.visited.len() >= MAX_SYMLINK_HOPS || !self.visited.insert(current.clone()) {
            debug!(path = %current.display(), "symlink walk stopped on a cycle");
            return None;
        }
        self.next = match read_link_hop(&current) {
            Ok(target) => Some(target),
            Err(err) => {
                debug!(path = %current.display(), error = %err, "symlink walk stopped");
                None
            }
        };
        Some(current)
    }
}

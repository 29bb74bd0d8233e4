use crate::{Error, Result};
use std::path::Path;

pub fn symlink(target: impl AsRef<Path>, link: impl AsRef<Path>) -> Result<()> {
    let target = target.as_ref();
    let link = link.as_ref();

    #[cfg(unix)]
    {
        std::os::unix::fs::symlink(target, link).map_err(|e| Error::Write {
            path:   link.to_path_buf(),
            source: e,
        })
    }

    #[cfg(windows)]
    {
        std::os::windows::fs::symlink_file(target, link).map_err(|e| Error::Write {
            path:   link.to_path_buf(),
            source: e,
        })
    }

    #[cfg(not(any(unix, windows)))]
    {
        let _ = (target, link);
        Err(Error::SymlinkNotSupported)
    }
}

/// Creates `link` unless an entry with that name already exists.
///
/// Dangling symlinks count as existing. Returns whether a link was created.
pub fn symlink_if_absent(target: impl AsRef<Path>, link: impl AsRef<Path>) -> Result<bool> {
    let link = link.as_ref();
    if link.symlink_metadata().is_ok() {
        return Ok(false);
    }
    symlink(target, link)?;
    Ok(true)
}

/// Replaces `link` with a symlink to `target` through a rename.
///
/// The new link is created under a temporary sibling name first, so `link`
/// never goes missing on POSIX systems.
pub fn atomic_symlink(target: impl AsRef<Path>, link: impl AsRef<Path>) -> Result<()> {
    let target = target.as_ref();
    let link = link.as_ref();

    let parent = link.parent().unwrap_or(Path::new(""));
    let file_name = link.file_name().unwrap_or_default().to_string_lossy();
    let tmp_link = parent.join(format!(".{file_name}.tmp"));

    remove_file_if_exists(&tmp_link)?;
    symlink(target, &tmp_link)?;
    std::fs::rename(&tmp_link, link).map_err(|e| Error::Write {
        path:   link.to_path_buf(),
        source: e,
    })
}

pub fn remove_file_if_exists(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::Remove {
            path:   path.to_path_buf(),
            source: e,
        }),
    }
}

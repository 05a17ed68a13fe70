//! Path utilities for gantry filesystem operations.
//!
//! Ancestor walks absolutize first so termination at the filesystem root is
//! well defined regardless of how the caller spelled the path.

use std::path::{Path, PathBuf};

/// Make `path` absolute against the current directory, without touching the
/// filesystem. Falls back to the path unchanged when the current directory
/// cannot be read.
#[must_use]
pub fn absolutize(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Absolute form of an operation target, resolving symlinks when asked.
/// A target that does not resolve (typically because it does not exist yet)
/// keeps its absolute spelling.
#[must_use]
pub fn resolve_target(path: &Path, follow_symlinks: bool) -> PathBuf {
    let abs = absolutize(path);
    if follow_symlinks {
        std::fs::canonicalize(&abs).unwrap_or(abs)
    } else {
        abs
    }
}

/// Existence without following: a dangling symlink counts as present.
#[must_use]
pub fn exists_no_follow(path: &Path) -> bool {
    std::fs::symlink_metadata(path).is_ok()
}

/// First entry of the ancestor chain, starting at `path` itself, that is a
/// non-directory. Directories end the walk with `None`; missing entries and
/// dangling symlinks are skipped upward.
///
/// A `Some` result means the hierarchy the caller wants cannot be created
/// because a file sits where a directory would have to be.
#[must_use]
pub fn blocking_file_in_ancestors(path: &Path) -> Option<PathBuf> {
    let mut cur = absolutize(path);
    loop {
        match std::fs::metadata(&cur) {
            Ok(md) if md.is_dir() => return None,
            Ok(_) => return Some(cur),
            Err(_) => {}
        }
        cur = match cur.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => return None,
        };
    }
}

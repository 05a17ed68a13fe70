//! Access probes against the kernel's access-check machinery.

use std::path::Path;

use rustix::fs::{accessat, Access, AtFlags, CWD};
use rustix::io::Errno;

use crate::types::{AccessMode, AccessResult};

/// One access check against live state. Implementations must not mutate.
///
/// `effective_ids` selects the effective uid/gid instead of the real ids,
/// which is what matters once a mutation would run under escalation;
/// `follow_symlinks` decides whether a symlink is judged by its target or
/// by the link itself.
pub trait AccessProbe: Send + Sync {
    fn probe(
        &self,
        path: &Path,
        mode: AccessMode,
        effective_ids: bool,
        follow_symlinks: bool,
    ) -> AccessResult;
}

/// Probe backed by `faccessat(2)`.
#[derive(Clone, Copy, Debug, Default)]
pub struct SyscallProbe;

impl AccessProbe for SyscallProbe {
    fn probe(
        &self,
        path: &Path,
        mode: AccessMode,
        effective_ids: bool,
        follow_symlinks: bool,
    ) -> AccessResult {
        // Existence is judged first so Denied always means "present but
        // unreachable". A dangling symlink exists when not following.
        let present = if follow_symlinks {
            std::fs::metadata(path).is_ok()
        } else {
            std::fs::symlink_metadata(path).is_ok()
        };
        if !present {
            return AccessResult::NotFound;
        }
        if mode.is_exists_only() {
            return AccessResult::Allowed;
        }

        let mut flags = AtFlags::empty();
        if effective_ids {
            flags |= AtFlags::EACCESS;
        }
        if !follow_symlinks {
            flags |= AtFlags::SYMLINK_NOFOLLOW;
        }
        match accessat(CWD, path, to_access(mode), flags) {
            Ok(()) => AccessResult::Allowed,
            Err(e) if e == Errno::NOENT || e == Errno::NOTDIR => AccessResult::NotFound,
            Err(_) => AccessResult::Denied,
        }
    }
}

fn to_access(mode: AccessMode) -> Access {
    let mut access = Access::EXISTS;
    if mode.contains(AccessMode::READ) {
        access |= Access::READ_OK;
    }
    if mode.contains(AccessMode::WRITE) {
        access |= Access::WRITE_OK;
    }
    if mode.contains(AccessMode::EXEC) {
        access |= Access::EXEC_OK;
    }
    access
}

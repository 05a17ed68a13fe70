//! State comparison that lets mutations skip work already done.
//!
//! A mutation runs only when the observed state differs from the requested
//! state. Unknown requested values (an unresolvable owner name, a symbolic
//! mode) never reach these functions; callers treat them as "must run".

use std::path::Path;

use crate::constants::MODE_BITS_MASK;
use crate::fs::meta::sha256_hex_of;
use crate::types::{FileStat, Result};

/// True when the permission bits of `current` differ from `desired`,
/// comparing the 0o7777 range only.
#[must_use]
pub fn mode_differs(current: &FileStat, desired: u32) -> bool {
    current.permissions() != desired & MODE_BITS_MASK
}

/// True when ownership differs from the desired uid/gid pair.
#[must_use]
pub fn owner_differs(current: &FileStat, uid: u32, gid: u32) -> bool {
    current.uid != uid || current.gid != gid
}

/// Combined check: `None` means the dimension was not requested.
#[must_use]
pub fn needs_change(current: &FileStat, mode: Option<u32>, owner: Option<(u32, u32)>) -> bool {
    mode.is_some_and(|m| mode_differs(current, m))
        || owner.is_some_and(|(uid, gid)| owner_differs(current, uid, gid))
}

/// Whether two files hold identical bytes, judged by streamed SHA-256.
///
/// # Errors
/// Propagates digest failures from either side.
pub fn content_equal(a: &Path, b: &Path) -> Result<bool> {
    Ok(sha256_hex_of(a)? == sha256_hex_of(b)?)
}

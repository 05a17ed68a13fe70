//! Access-check vocabulary shared by probes and the escalation resolver.

use std::ops::BitOr;

/// Requested access rights for a probe: any combination of read, write and
/// execute, or bare existence when empty.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AccessMode(u8);

impl AccessMode {
    /// Existence only, no rights checked.
    pub const EXISTS: AccessMode = AccessMode(0);
    pub const READ: AccessMode = AccessMode(1);
    pub const WRITE: AccessMode = AccessMode(2);
    pub const EXEC: AccessMode = AccessMode(4);

    /// True when every right in `other` is also requested by `self`.
    #[must_use]
    pub const fn contains(self, other: AccessMode) -> bool {
        self.0 & other.0 == other.0
    }

    /// True when no rights are requested (existence check only).
    #[must_use]
    pub const fn is_exists_only(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for AccessMode {
    type Output = AccessMode;

    fn bitor(self, rhs: AccessMode) -> AccessMode {
        AccessMode(self.0 | rhs.0)
    }
}

/// Mutations ask for write access unless told otherwise.
impl Default for AccessMode {
    fn default() -> Self {
        AccessMode::WRITE
    }
}

/// Tri-state outcome of an access probe.
///
/// `NotFound` is distinct from `Denied`: a missing path carries no access
/// fact, so resolvers keep walking ancestors instead of concluding anything.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessResult {
    Allowed,
    Denied,
    NotFound,
}

impl AccessResult {
    #[must_use]
    pub const fn is_allowed(self) -> bool {
        matches!(self, AccessResult::Allowed)
    }
}

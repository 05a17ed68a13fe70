//! Account records resolved from the system user database.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;

/// One account from the user database, with group membership resolved.
///
/// Records are immutable snapshots; the engine caches them by uid and by
/// username so repeated mutations do not re-read the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentityRecord {
    pub uid: u32,
    pub user: String,
    pub gid: u32,
    /// Name of the primary group.
    pub group: String,
    /// Every group the account belongs to, primary included, name to gid.
    pub groups: BTreeMap<String, u32>,
    pub gecos: String,
    pub home: PathBuf,
    pub shell: PathBuf,
}

impl IdentityRecord {
    /// `user:group` argument accepted by `chown`.
    #[must_use]
    pub fn owner_arg(&self) -> String {
        format!("{}:{}", self.user, self.group)
    }

    #[must_use]
    pub fn is_member_of(&self, group: &str) -> bool {
        self.groups.contains_key(group)
    }

    /// Running as root via `su` or a root login: uid 0 with no sudo trace.
    #[must_use]
    pub fn is_su(&self) -> bool {
        self.uid == 0 && !sudo_env_present()
    }

    /// Running under `sudo`, whoever the target user is.
    #[must_use]
    pub fn is_sudo(&self) -> bool {
        sudo_env_present()
    }

    /// Running as an ordinary user with no escalation in effect.
    #[must_use]
    pub fn is_user(&self) -> bool {
        self.uid != 0 && !sudo_env_present()
    }
}

fn sudo_env_present() -> bool {
    std::env::var_os("SUDO_USER").is_some()
}

/// Ownership requested for a mutation: a resolved record, or a raw
/// `user:group` string validated when the operation runs.
#[derive(Debug, Clone)]
pub enum OwnerSpec {
    Record(IdentityRecord),
    Names(String),
}

impl OwnerSpec {
    #[must_use]
    pub fn names(spec: impl Into<String>) -> Self {
        OwnerSpec::Names(spec.into())
    }
}

impl From<IdentityRecord> for OwnerSpec {
    fn from(record: IdentityRecord) -> Self {
        OwnerSpec::Record(record)
    }
}

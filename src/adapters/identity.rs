//! Account database access and the engine-owned identity cache.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use crate::types::{Error, IdentityRecord, Result};

/// Resolves accounts to [`IdentityRecord`]s.
///
/// Lookups go through [`IdentityCache`], so implementations may re-read
/// their backing store on every call.
pub trait IdentitySource: Send + Sync {
    /// # Errors
    /// `NotFound` when no account has this uid.
    fn by_uid(&self, uid: u32) -> Result<IdentityRecord>;

    /// # Errors
    /// `NotFound` when no account has this name.
    fn by_name(&self, user: &str) -> Result<IdentityRecord>;
}

/// Flat-file source reading `passwd(5)` and `group(5)` format.
#[derive(Debug, Clone)]
pub struct EtcSource {
    passwd: PathBuf,
    group: PathBuf,
}

impl Default for EtcSource {
    fn default() -> Self {
        EtcSource {
            passwd: PathBuf::from("/etc/passwd"),
            group: PathBuf::from("/etc/group"),
        }
    }
}

impl EtcSource {
    #[must_use]
    pub fn new() -> Self {
        EtcSource::default()
    }

    /// Source reading from explicit files, for tests and chroot-style use.
    #[must_use]
    pub fn with_files(passwd: impl Into<PathBuf>, group: impl Into<PathBuf>) -> Self {
        EtcSource {
            passwd: passwd.into(),
            group: group.into(),
        }
    }

    fn find_entry(&self, pred: impl Fn(&PasswdEntry) -> bool) -> Result<Option<PasswdEntry>> {
        let text = std::fs::read_to_string(&self.passwd)
            .map_err(|e| Error::io(&self.passwd, e))?;
        Ok(text.lines().filter_map(parse_passwd_line).find(pred))
    }

    fn build(&self, entry: PasswdEntry) -> Result<IdentityRecord> {
        let (group, groups) = self.groups_for(&entry.name, entry.gid)?;
        Ok(IdentityRecord {
            uid: entry.uid,
            user: entry.name,
            gid: entry.gid,
            group,
            groups,
            gecos: entry.gecos,
            home: entry.home,
            shell: entry.shell,
        })
    }

    /// Primary group name plus full membership, primary included.
    fn groups_for(&self, user: &str, primary_gid: u32) -> Result<(String, BTreeMap<String, u32>)> {
        let text =
            std::fs::read_to_string(&self.group).map_err(|e| Error::io(&self.group, e))?;
        let mut primary: Option<String> = None;
        let mut groups = BTreeMap::new();
        for entry in text.lines().filter_map(parse_group_line) {
            if entry.gid == primary_gid && primary.is_none() {
                primary = Some(entry.name.clone());
                groups.insert(entry.name.clone(), entry.gid);
            }
            if entry.members.iter().any(|m| m == user) {
                groups.insert(entry.name, entry.gid);
            }
        }
        // A gid missing from the group file still names a primary group.
        let primary = primary.unwrap_or_else(|| primary_gid.to_string());
        groups.entry(primary.clone()).or_insert(primary_gid);
        Ok((primary, groups))
    }
}

impl IdentitySource for EtcSource {
    fn by_uid(&self, uid: u32) -> Result<IdentityRecord> {
        match self.find_entry(|e| e.uid == uid)? {
            Some(entry) => self.build(entry),
            None => Err(Error::not_found_account(format!("uid {uid}"))),
        }
    }

    fn by_name(&self, user: &str) -> Result<IdentityRecord> {
        match self.find_entry(|e| e.name == user)? {
            Some(entry) => self.build(entry),
            None => Err(Error::not_found_account(user)),
        }
    }
}

struct PasswdEntry {
    name: String,
    uid: u32,
    gid: u32,
    gecos: String,
    home: PathBuf,
    shell: PathBuf,
}

fn parse_passwd_line(line: &str) -> Option<PasswdEntry> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let mut fields = line.split(':');
    let name = fields.next()?.to_string();
    let _password = fields.next()?;
    let uid = fields.next()?.parse().ok()?;
    let gid = fields.next()?.parse().ok()?;
    let gecos = fields.next()?.to_string();
    let home = PathBuf::from(fields.next()?);
    let shell = PathBuf::from(fields.next()?);
    Some(PasswdEntry {
        name,
        uid,
        gid,
        gecos,
        home,
        shell,
    })
}

struct GroupEntry {
    name: String,
    gid: u32,
    members: Vec<String>,
}

fn parse_group_line(line: &str) -> Option<GroupEntry> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let mut fields = line.split(':');
    let name = fields.next()?.to_string();
    let _password = fields.next()?;
    let gid = fields.next()?.parse().ok()?;
    let members = fields
        .next()
        .map(|m| {
            m.split(',')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();
    Some(GroupEntry { name, gid, members })
}

#[derive(Default)]
struct CacheMaps {
    by_uid: HashMap<u32, Arc<IdentityRecord>>,
    by_name: HashMap<String, Arc<IdentityRecord>>,
}

/// Identity lookups with per-engine caching under both keys.
///
/// A record fetched by uid is immediately findable by username and vice
/// versa. Entries live as long as the cache; accounts changed mid-run are
/// not re-read.
pub struct IdentityCache {
    source: Box<dyn IdentitySource>,
    maps: Mutex<CacheMaps>,
}

impl IdentityCache {
    #[must_use]
    pub fn new(source: Box<dyn IdentitySource>) -> Self {
        IdentityCache {
            source,
            maps: Mutex::new(CacheMaps::default()),
        }
    }

    fn remember(&self, record: IdentityRecord) -> Arc<IdentityRecord> {
        let record = Arc::new(record);
        let mut maps = self.maps.lock().unwrap_or_else(PoisonError::into_inner);
        maps.by_uid.insert(record.uid, Arc::clone(&record));
        maps.by_name.insert(record.user.clone(), Arc::clone(&record));
        record
    }

    /// # Errors
    /// `NotFound` when the uid has no account; `Io` when the source fails.
    pub fn lookup_uid(&self, uid: u32) -> Result<Arc<IdentityRecord>> {
        {
            let maps = self.maps.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(hit) = maps.by_uid.get(&uid) {
                return Ok(Arc::clone(hit));
            }
        }
        Ok(self.remember(self.source.by_uid(uid)?))
    }

    /// # Errors
    /// `NotFound` when the name has no account; `Io` when the source fails.
    pub fn lookup_user(&self, user: &str) -> Result<Arc<IdentityRecord>> {
        {
            let maps = self.maps.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(hit) = maps.by_name.get(user) {
                return Ok(Arc::clone(hit));
            }
        }
        Ok(self.remember(self.source.by_name(user)?))
    }

    /// The account of the real uid.
    ///
    /// # Errors
    /// Propagates lookup failures.
    pub fn current(&self) -> Result<Arc<IdentityRecord>> {
        self.lookup_uid(rustix::process::getuid().as_raw())
    }

    /// The account of the effective uid, which under escalation is root.
    ///
    /// # Errors
    /// Propagates lookup failures.
    pub fn effective(&self) -> Result<Arc<IdentityRecord>> {
        self.lookup_uid(rustix::process::geteuid().as_raw())
    }

    /// Uid 0.
    ///
    /// # Errors
    /// Propagates lookup failures.
    pub fn root(&self) -> Result<Arc<IdentityRecord>> {
        self.lookup_uid(0)
    }

    /// The user who invoked sudo, when running under it; otherwise the
    /// current account. `SUDO_UID` is the kernel-independent trace sudo
    /// leaves behind.
    ///
    /// # Errors
    /// Propagates lookup failures.
    pub fn sudo_caller(&self) -> Result<Arc<IdentityRecord>> {
        if let Some(uid) = std::env::var("SUDO_UID").ok().and_then(|v| v.parse().ok()) {
            return self.lookup_uid(uid);
        }
        self.current()
    }

    /// The account that logged in on this session, surviving `su`/`sudo`.
    /// Falls back to the current account when the audit uid is unset.
    ///
    /// # Errors
    /// Propagates lookup failures.
    pub fn login(&self) -> Result<Arc<IdentityRecord>> {
        if let Some(uid) = read_login_uid(Path::new("/proc/self/loginuid")) {
            return self.lookup_uid(uid);
        }
        self.current()
    }
}

fn read_login_uid(path: &Path) -> Option<u32> {
    let text = std::fs::read_to_string(path).ok()?;
    let uid: u32 = text.trim().parse().ok()?;
    // u32::MAX means no login uid was ever set for this process.
    (uid != u32::MAX).then_some(uid)
}

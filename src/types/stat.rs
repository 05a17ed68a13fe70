//! Snapshot of a path's identity- and permission-relevant state.

use std::fs::Metadata;
use std::os::unix::fs::MetadataExt;

use serde::Serialize;

use crate::constants::MODE_BITS_MASK;

/// Owner, group and mode of an existing path, captured in one stat call.
///
/// Change detection compares these fields against a requested state; the
/// raw [`Metadata`] stays available for anything the flat fields omit.
#[derive(Debug, Clone, Serialize)]
pub struct FileStat {
    pub uid: u32,
    pub gid: u32,
    /// Full `st_mode`, including the file-type bits.
    pub mode: u32,
    pub setuid: bool,
    pub setgid: bool,
    pub sticky: bool,
    #[serde(skip)]
    metadata: Metadata,
}

impl FileStat {
    #[must_use]
    pub fn from_metadata(metadata: Metadata) -> Self {
        let mode = metadata.mode();
        FileStat {
            uid: metadata.uid(),
            gid: metadata.gid(),
            mode,
            setuid: mode & 0o4000 != 0,
            setgid: mode & 0o2000 != 0,
            sticky: mode & 0o1000 != 0,
            metadata,
        }
    }

    /// Permission, set-id and sticky bits only.
    #[must_use]
    pub const fn permissions(&self) -> u32 {
        self.mode & MODE_BITS_MASK
    }

    #[must_use]
    pub const fn owner_is_root(&self) -> bool {
        self.uid == 0
    }

    #[must_use]
    pub fn is_dir(&self) -> bool {
        self.metadata.is_dir()
    }

    #[must_use]
    pub fn is_file(&self) -> bool {
        self.metadata.is_file()
    }

    /// The raw stat payload backing this snapshot.
    #[must_use]
    pub const fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// `ls -l` style rendering, e.g. `-rwsr-xr-x` or `drwxrwxrwt`.
    #[must_use]
    pub fn filemode(&self) -> String {
        let mode = self.mode;
        let kind = match mode & 0o170_000 {
            0o140_000 => 's',
            0o120_000 => 'l',
            0o100_000 => '-',
            0o060_000 => 'b',
            0o040_000 => 'd',
            0o020_000 => 'c',
            0o010_000 => 'p',
            _ => '?',
        };
        let mut out = String::with_capacity(10);
        out.push(kind);
        out.push(if mode & 0o400 != 0 { 'r' } else { '-' });
        out.push(if mode & 0o200 != 0 { 'w' } else { '-' });
        out.push(set_id_char(mode & 0o100 != 0, self.setuid, 's'));
        out.push(if mode & 0o040 != 0 { 'r' } else { '-' });
        out.push(if mode & 0o020 != 0 { 'w' } else { '-' });
        out.push(set_id_char(mode & 0o010 != 0, self.setgid, 's'));
        out.push(if mode & 0o004 != 0 { 'r' } else { '-' });
        out.push(if mode & 0o002 != 0 { 'w' } else { '-' });
        out.push(set_id_char(mode & 0o001 != 0, self.sticky, 't'));
        out
    }
}

fn set_id_char(exec: bool, special: bool, letter: char) -> char {
    match (exec, special) {
        (true, true) => letter,
        (false, true) => letter.to_ascii_uppercase(),
        (true, false) => 'x',
        (false, false) => '-',
    }
}

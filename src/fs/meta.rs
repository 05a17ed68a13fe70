//! Metadata and digest probes. Non-mutating.

use std::io::Read;
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::constants::CHECKSUM_BLOCK_SIZE;
use crate::types::{Error, FileStat, Result};

/// Kind of filesystem node, judged without following symlinks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    File,
    Dir,
    Symlink,
    Missing,
    Unknown,
}

impl NodeKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            NodeKind::File => "file",
            NodeKind::Dir => "dir",
            NodeKind::Symlink => "symlink",
            NodeKind::Missing => "missing",
            NodeKind::Unknown => "unknown",
        }
    }
}

/// Classify the node at `path`.
#[must_use]
pub fn kind_of(path: &Path) -> NodeKind {
    match std::fs::symlink_metadata(path) {
        Ok(md) => {
            let ft = md.file_type();
            if ft.is_symlink() {
                NodeKind::Symlink
            } else if ft.is_file() {
                NodeKind::File
            } else if ft.is_dir() {
                NodeKind::Dir
            } else {
                NodeKind::Unknown
            }
        }
        Err(_) => NodeKind::Missing,
    }
}

/// Stat `path` into a [`FileStat`].
///
/// # Errors
/// `NotFound` when the path (or, with `follow_symlinks`, its target) is
/// absent; `Io` for any other stat failure.
pub fn read_stat(path: &Path, follow_symlinks: bool) -> Result<FileStat> {
    let lookup = if follow_symlinks {
        std::fs::metadata(path)
    } else {
        std::fs::symlink_metadata(path)
    };
    match lookup {
        Ok(md) => Ok(FileStat::from_metadata(md)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(Error::not_found_path(path)),
        Err(e) => Err(Error::io(path, e)),
    }
}

/// SHA-256 of the file at `path` as lowercase hex, streamed in fixed-size
/// blocks so large files never land in memory whole. The file handle is
/// released before returning on every path.
///
/// # Errors
/// `NotFound` when the file is absent; `Io` when it cannot be read.
pub fn sha256_hex_of(path: &Path) -> Result<String> {
    let mut file = match std::fs::File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::not_found_path(path))
        }
        Err(e) => return Err(Error::io(path, e)),
    };
    let mut hasher = Sha256::new();
    let mut block = vec![0u8; CHECKSUM_BLOCK_SIZE];
    loop {
        let n = file.read(&mut block).map_err(|e| Error::io(path, e))?;
        if n == 0 {
            break;
        }
        hasher.update(&block[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

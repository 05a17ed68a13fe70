//! Mutation requests accepted by the engine.
//!
//! Each request names a target and the optional knobs of one mutation kind.
//! Construction never touches the filesystem; validation happens when the
//! engine runs the request.

use std::path::{Path, PathBuf};

use crate::types::identity::OwnerSpec;
use crate::types::mode::{IdBit, ModeSpec};

/// Create a directory and any missing ancestors.
#[derive(Clone, Debug)]
pub struct MakeDirRequest {
    pub path: PathBuf,
    pub mode: Option<ModeSpec>,
    pub owner: Option<OwnerSpec>,
}

impl MakeDirRequest {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        MakeDirRequest {
            path: path.into(),
            mode: None,
            owner: None,
        }
    }

    #[must_use]
    pub fn with_mode(mut self, mode: ModeSpec) -> Self {
        self.mode = Some(mode);
        self
    }

    #[must_use]
    pub fn with_owner(mut self, owner: impl Into<OwnerSpec>) -> Self {
        self.owner = Some(owner.into());
        self
    }
}

/// Ensure a file exists, creating missing parents first.
#[derive(Clone, Debug)]
pub struct TouchRequest {
    pub path: PathBuf,
    pub mode: Option<ModeSpec>,
    pub owner: Option<OwnerSpec>,
}

impl TouchRequest {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        TouchRequest {
            path: path.into(),
            mode: None,
            owner: None,
        }
    }

    #[must_use]
    pub fn with_mode(mut self, mode: ModeSpec) -> Self {
        self.mode = Some(mode);
        self
    }

    #[must_use]
    pub fn with_owner(mut self, owner: impl Into<OwnerSpec>) -> Self {
        self.owner = Some(owner.into());
        self
    }
}

/// Copy a file or tree. Escalation is judged against the destination.
#[derive(Clone, Debug)]
pub struct CopyRequest {
    pub source: PathBuf,
    pub dest: PathBuf,
    /// Copy the contents of a source directory rather than the directory
    /// itself (the `src/.` form).
    pub contents: bool,
    /// Follow symlinks in the source instead of copying the links.
    pub follow_symlinks: bool,
    /// Preserve mode, ownership and timestamps.
    pub preserve: bool,
}

impl CopyRequest {
    #[must_use]
    pub fn new(source: impl Into<PathBuf>, dest: impl Into<PathBuf>) -> Self {
        CopyRequest {
            source: source.into(),
            dest: dest.into(),
            contents: false,
            follow_symlinks: false,
            preserve: false,
        }
    }

    #[must_use]
    pub fn with_contents(mut self, contents: bool) -> Self {
        self.contents = contents;
        self
    }

    #[must_use]
    pub fn with_follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    #[must_use]
    pub fn with_preserve(mut self, preserve: bool) -> Self {
        self.preserve = preserve;
        self
    }
}

/// Remove a path. Missing targets are tolerated unless told otherwise.
#[derive(Clone, Debug)]
pub struct RemoveRequest {
    pub path: PathBuf,
    pub recursive: bool,
    pub missing_ok: bool,
}

impl RemoveRequest {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        RemoveRequest {
            path: path.into(),
            recursive: false,
            missing_ok: true,
        }
    }

    #[must_use]
    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    #[must_use]
    pub fn with_missing_ok(mut self, missing_ok: bool) -> Self {
        self.missing_ok = missing_ok;
        self
    }
}

/// Set permission bits on an existing path.
#[derive(Clone, Debug)]
pub struct ChmodRequest {
    pub path: PathBuf,
    pub mode: ModeSpec,
    pub recursive: bool,
    pub missing_ok: bool,
}

impl ChmodRequest {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, mode: ModeSpec) -> Self {
        ChmodRequest {
            path: path.into(),
            mode,
            recursive: false,
            missing_ok: false,
        }
    }

    #[must_use]
    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    #[must_use]
    pub fn with_missing_ok(mut self, missing_ok: bool) -> Self {
        self.missing_ok = missing_ok;
        self
    }
}

/// Set ownership on an existing path.
#[derive(Clone, Debug)]
pub struct ChownRequest {
    pub path: PathBuf,
    pub owner: OwnerSpec,
    pub recursive: bool,
    pub missing_ok: bool,
}

impl ChownRequest {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, owner: impl Into<OwnerSpec>) -> Self {
        ChownRequest {
            path: path.into(),
            owner: owner.into(),
            recursive: false,
            missing_ok: false,
        }
    }

    #[must_use]
    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    #[must_use]
    pub fn with_missing_ok(mut self, missing_ok: bool) -> Self {
        self.missing_ok = missing_ok;
        self
    }
}

/// Promote a program to a set-id binary owned by a privileged identity.
#[derive(Clone, Debug)]
pub struct SetIdRequest {
    pub path: PathBuf,
    pub bit: IdBit,
    /// Promote a sibling copy under this name instead of the path itself.
    pub copy_as: Option<String>,
    /// Identity the bit impersonates; root when unset.
    pub owner: Option<crate::types::identity::IdentityRecord>,
}

impl SetIdRequest {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, bit: IdBit) -> Self {
        SetIdRequest {
            path: path.into(),
            bit,
            copy_as: None,
            owner: None,
        }
    }

    #[must_use]
    pub fn with_copy_as(mut self, name: impl Into<String>) -> Self {
        self.copy_as = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_owner(mut self, owner: crate::types::identity::IdentityRecord) -> Self {
        self.owner = Some(owner);
        self
    }
}

/// Any mutation the engine can run, used for logging and id derivation.
#[derive(Clone, Debug)]
pub enum MutationRequest {
    MakeDir(MakeDirRequest),
    Touch(TouchRequest),
    Copy(CopyRequest),
    Remove(RemoveRequest),
    Chmod(ChmodRequest),
    Chown(ChownRequest),
    SetId(SetIdRequest),
}

impl MutationRequest {
    /// Stable lowercase label used in facts.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            MutationRequest::MakeDir(_) => "makedir",
            MutationRequest::Touch(_) => "touch",
            MutationRequest::Copy(_) => "copy",
            MutationRequest::Remove(_) => "remove",
            MutationRequest::Chmod(_) => "chmod",
            MutationRequest::Chown(_) => "chown",
            MutationRequest::SetId(_) => "setid",
        }
    }

    /// The path the mutation is judged against.
    #[must_use]
    pub fn target(&self) -> &Path {
        match self {
            MutationRequest::MakeDir(r) => &r.path,
            MutationRequest::Touch(r) => &r.path,
            MutationRequest::Copy(r) => &r.dest,
            MutationRequest::Remove(r) => &r.path,
            MutationRequest::Chmod(r) => &r.path,
            MutationRequest::Chown(r) => &r.path,
            MutationRequest::SetId(r) => &r.path,
        }
    }
}

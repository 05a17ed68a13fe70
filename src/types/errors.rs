//! Error types used across gantry.
use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Captured outcome of a spawned command that did not succeed.
///
/// Carried by [`Error::PermissionDenied`] and [`Error::ExecutionFailed`] so
/// callers can render or inspect the full invocation.
#[derive(Debug, Clone)]
pub struct CommandFailure {
    /// Full argv as invoked, lossily decoded for display.
    pub argv: Vec<String>,
    /// Exit code, when the process terminated normally.
    pub code: Option<i32>,
    /// Terminating signal, when the process was killed.
    pub signal: Option<i32>,
    /// Captured stdout, lossily decoded.
    pub stdout: String,
    /// Captured stderr, lossily decoded.
    pub stderr: String,
}

impl CommandFailure {
    /// Human-readable status: exit code, signal death, or spawn failure.
    #[must_use]
    pub fn status_label(&self) -> String {
        match (self.code, self.signal) {
            (Some(code), _) => format!("exit code {code}"),
            (None, Some(sig)) => format!("died with signal {sig}"),
            (None, None) => "failed to start".to_string(),
        }
    }
}

impl fmt::Display for CommandFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}` {}", self.argv.join(" "), self.status_label())?;
        let stderr = self.stderr.trim();
        if !stderr.is_empty() {
            write!(f, ": {stderr}")?;
        }
        Ok(())
    }
}

/// Error taxonomy for mutation operations.
///
/// Local precondition failures (`NotFound`, `NotADirectory`, `InvalidArgument`)
/// are raised before any external command is spawned; `PermissionDenied` and
/// `ExecutionFailed` report a command that ran and failed. No variant is
/// retried automatically.
#[derive(Debug, Error)]
pub enum Error {
    /// A path or account that must exist does not.
    #[error("not found: {0}")]
    NotFound(String),

    /// A regular file occupies an ancestor slot where a directory is needed.
    #[error("not a directory: {} blocks {}", blocking.display(), path.display())]
    NotADirectory {
        /// The path the operation was asked to produce.
        path: PathBuf,
        /// The existing non-directory entry in its ancestor chain.
        blocking: PathBuf,
    },

    /// Malformed input such as a bad mode expression or owner specifier.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A spawned command failed and its output indicates missing rights.
    #[error("permission denied: {0}")]
    PermissionDenied(CommandFailure),

    /// A spawned command failed for any other reason, or could not start.
    #[error("command failed: {0}")]
    ExecutionFailed(CommandFailure),

    /// Local I/O failure while statting, reading, or digesting a path.
    #[error("io error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn not_found_path(path: &std::path::Path) -> Self {
        Error::NotFound(path.display().to_string())
    }

    pub(crate) fn not_found_account(spec: impl Into<String>) -> Self {
        let spec = spec.into();
        Error::NotFound(format!("account {spec}"))
    }

    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Error::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Stable identifier emitted in facts for this error.
    #[must_use]
    pub const fn id(&self) -> ErrorId {
        match self {
            Error::NotFound(_) => ErrorId::E_NOT_FOUND,
            Error::NotADirectory { .. } => ErrorId::E_NOT_A_DIRECTORY,
            Error::InvalidArgument(_) => ErrorId::E_INVALID_ARGUMENT,
            Error::PermissionDenied(_) => ErrorId::E_PERMISSION,
            Error::ExecutionFailed(_) => ErrorId::E_EXECUTION,
            Error::Io { .. } => ErrorId::E_IO,
        }
    }
}

/// Convenient alias for results returning a `types::Error`.
pub type Result<T> = std::result::Result<T, Error>;

// Stable identifiers, kept in SCREAMING_SNAKE_CASE to match emitted IDs.
#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorId {
    E_NOT_FOUND,
    E_NOT_A_DIRECTORY,
    E_INVALID_ARGUMENT,
    E_PERMISSION,
    E_EXECUTION,
    E_IO,
}

#[must_use]
pub const fn id_str(id: ErrorId) -> &'static str {
    match id {
        ErrorId::E_NOT_FOUND => "E_NOT_FOUND",
        ErrorId::E_NOT_A_DIRECTORY => "E_NOT_A_DIRECTORY",
        ErrorId::E_INVALID_ARGUMENT => "E_INVALID_ARGUMENT",
        ErrorId::E_PERMISSION => "E_PERMISSION",
        ErrorId::E_EXECUTION => "E_EXECUTION",
        ErrorId::E_IO => "E_IO",
    }
}

#[must_use]
pub const fn exit_code_for(id: ErrorId) -> i32 {
    match id {
        ErrorId::E_NOT_FOUND => 10,
        ErrorId::E_NOT_A_DIRECTORY => 20,
        ErrorId::E_INVALID_ARGUMENT => 30,
        ErrorId::E_PERMISSION => 40,
        ErrorId::E_EXECUTION => 50,
        ErrorId::E_IO => 1,
    }
}

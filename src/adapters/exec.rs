//! Command execution boundary.
//!
//! The engine never talks to `std::process` directly; it hands a full argv
//! to a [`CommandRunner`]. Tests substitute a recording runner to assert
//! which commands would run without mutating anything.

use std::ffi::OsString;
use std::io;
use std::process::Command;

/// Captured outcome of one spawned command.
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// Exit code when the process terminated normally.
    pub code: Option<i32>,
    /// Terminating signal when it did not.
    pub signal: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl RunOutput {
    /// A zero exit. Signal deaths are never successes.
    #[must_use]
    pub fn ok() -> Self {
        RunOutput {
            code: Some(0),
            signal: None,
            stdout: Vec::new(),
            stderr: Vec::new(),
        }
    }

    #[must_use]
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    #[must_use]
    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    #[must_use]
    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

/// Runs an argv without a shell and captures its output.
///
/// Implementations must not interpret the argv; the first element is the
/// program, the rest are its arguments exactly as given.
pub trait CommandRunner: Send + Sync {
    /// # Errors
    /// An `io::Error` means the process could not be spawned at all;
    /// non-zero exits are reported through [`RunOutput`], not here.
    fn run(&self, argv: &[OsString]) -> io::Result<RunOutput>;
}

/// Runner backed by `std::process::Command`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    fn run(&self, argv: &[OsString]) -> io::Result<RunOutput> {
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "empty argv"))?;
        let out = Command::new(program).args(args).output()?;
        let signal = {
            use std::os::unix::process::ExitStatusExt;
            out.status.signal()
        };
        Ok(RunOutput {
            code: out.status.code(),
            signal,
            stdout: out.stdout,
            stderr: out.stderr,
        })
    }
}

//! Argv synthesis for mutation commands.
//!
//! Every mutation shells out to a coreutils tool; the escalation prefix
//! (possibly empty) always goes first. Argument vectors are built as
//! `OsString` so non-UTF-8 paths survive intact.

use std::ffi::{OsStr, OsString};
use std::path::Path;

use crate::types::ModeSpec;

fn base(prefix: &[OsString], tool: &str) -> Vec<OsString> {
    let mut argv = prefix.to_vec();
    argv.push(OsString::from(tool));
    argv
}

fn push_path(argv: &mut Vec<OsString>, path: &Path) {
    argv.push(path.as_os_str().to_os_string());
}

pub(crate) fn make_dir(prefix: &[OsString], path: &Path, mode: Option<&ModeSpec>) -> Vec<OsString> {
    let mut argv = base(prefix, "mkdir");
    argv.push(OsString::from("-p"));
    if let Some(mode) = mode {
        argv.push(OsString::from("-m"));
        argv.push(OsString::from(mode.to_argument()));
    }
    push_path(&mut argv, path);
    argv
}

pub(crate) fn touch(prefix: &[OsString], path: &Path) -> Vec<OsString> {
    let mut argv = base(prefix, "touch");
    push_path(&mut argv, path);
    argv
}

pub(crate) fn copy(
    prefix: &[OsString],
    source: &Path,
    dest: &Path,
    recursive: bool,
    follow_symlinks: bool,
    preserve: bool,
) -> Vec<OsString> {
    let mut argv = base(prefix, "cp");
    if recursive {
        argv.push(OsString::from("-R"));
    }
    argv.push(OsString::from(if follow_symlinks { "-L" } else { "-P" }));
    if preserve {
        argv.push(OsString::from("-p"));
    }
    push_path(&mut argv, source);
    push_path(&mut argv, dest);
    argv
}

pub(crate) fn remove(prefix: &[OsString], path: &Path, recursive: bool) -> Vec<OsString> {
    let mut argv = base(prefix, "rm");
    if recursive {
        argv.push(OsString::from("-r"));
    }
    argv.push(OsString::from("-f"));
    push_path(&mut argv, path);
    argv
}

pub(crate) fn chmod(prefix: &[OsString], path: &Path, mode: &str, recursive: bool) -> Vec<OsString> {
    let mut argv = base(prefix, "chmod");
    if recursive {
        argv.push(OsString::from("-R"));
    }
    argv.push(OsString::from(mode));
    push_path(&mut argv, path);
    argv
}

pub(crate) fn chown(prefix: &[OsString], path: &Path, owner: &str, recursive: bool) -> Vec<OsString> {
    let mut argv = base(prefix, "chown");
    if recursive {
        argv.push(OsString::from("-R"));
    }
    argv.push(OsString::from(owner));
    push_path(&mut argv, path);
    argv
}

/// One shell invocation chaining chown and chmod, so the bits are never
/// installed on a file whose ownership change failed.
pub(crate) fn set_id_promote(
    prefix: &[OsString],
    target: &Path,
    owner: &str,
    mode_clause: &str,
) -> Vec<OsString> {
    let mut script = OsString::from("chown ");
    script.push(shell_quote(OsStr::new(owner)));
    script.push(" ");
    script.push(shell_quote(target.as_os_str()));
    script.push(" && chmod ");
    script.push(mode_clause);
    script.push(" ");
    script.push(shell_quote(target.as_os_str()));

    let mut argv = base(prefix, "sh");
    argv.push(OsString::from("-c"));
    argv.push(script);
    argv
}

/// Single-quote `arg` for `sh -c`, byte-preserving.
pub(crate) fn shell_quote(arg: &OsStr) -> OsString {
    use std::os::unix::ffi::{OsStrExt, OsStringExt};
    let mut quoted = Vec::with_capacity(arg.len() + 2);
    quoted.push(b'\'');
    for &byte in arg.as_bytes() {
        if byte == b'\'' {
            quoted.extend_from_slice(b"'\\''");
        } else {
            quoted.push(byte);
        }
    }
    quoted.push(b'\'');
    OsString::from_vec(quoted)
}

/// Lossy rendering for facts and error messages.
pub(crate) fn render(argv: &[OsString]) -> Vec<String> {
    argv.iter()
        .map(|a| a.to_string_lossy().into_owned())
        .collect()
}

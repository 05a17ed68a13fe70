//! Per-operation executors.
//!
//! Every executor runs the same sequence: validate locally, short-circuit
//! when the goal state already holds, resolve the escalation prefix, run
//! the synthesized argv, translate the outcome. Local failures surface
//! before any command is spawned; command failures carry the captured
//! output verbatim and are never retried.

pub(crate) mod chmod;
pub(crate) mod chown;
pub(crate) mod copy;
pub(crate) mod make_dir;
pub(crate) mod remove;
pub(crate) mod set_id;
pub(crate) mod touch;

use std::ffi::OsString;

use log::Level;
use serde_json::json;

use crate::adapters::exec::RunOutput;
use crate::api::cmd;
use crate::api::Gantry;
use crate::logging::audit::OpLogger;
use crate::logging::{AuditSink, FactsEmitter};
use crate::types::errors::{exit_code_for, id_str, CommandFailure};
use crate::types::{Error, OwnerSpec, Result};

/// Runs one synthesized argv through the engine's runner and translates
/// failures into the error taxonomy.
pub(crate) fn execute<E: FactsEmitter, A: AuditSink>(
    api: &Gantry<E, A>,
    argv: &[OsString],
) -> Result<RunOutput> {
    let rendered = cmd::render(argv);
    api.audit
        .log(Level::Debug, &format!("exec: {}", rendered.join(" ")));
    let out = match api.runner.run(argv) {
        Ok(out) => out,
        Err(e) => {
            // The process never started; there is no exit status to report.
            return Err(Error::ExecutionFailed(CommandFailure {
                argv: rendered,
                code: None,
                signal: None,
                stdout: String::new(),
                stderr: e.to_string(),
            }));
        }
    };
    if out.success() {
        return Ok(out);
    }
    Err(classify_failure(rendered, &out))
}

/// A non-zero exit whose stderr names a rights problem becomes
/// `PermissionDenied`; everything else is a plain `ExecutionFailed`.
/// The sudo `-n` refusal counts as a rights problem: escalation exists
/// but is unavailable to this caller.
fn classify_failure(argv: Vec<String>, out: &RunOutput) -> Error {
    let failure = CommandFailure {
        argv,
        code: out.code,
        signal: out.signal,
        stdout: out.stdout_lossy(),
        stderr: out.stderr_lossy(),
    };
    let stderr = failure.stderr.to_lowercase();
    if stderr.contains("permission denied")
        || stderr.contains("operation not permitted")
        || stderr.contains("a password is required")
    {
        Error::PermissionDenied(failure)
    } else {
        Error::ExecutionFailed(failure)
    }
}

/// The `user:group` token handed to `chown`.
///
/// # Errors
/// `InvalidArgument` when a raw string lacks the `:` separator.
pub(crate) fn owner_argument(spec: &OwnerSpec) -> Result<String> {
    match spec {
        OwnerSpec::Record(record) => Ok(record.owner_arg()),
        OwnerSpec::Names(names) if names.contains(':') => Ok(names.clone()),
        OwnerSpec::Names(names) => Err(Error::InvalidArgument(format!(
            "owner must be user:group, got {names:?}"
        ))),
    }
}

/// Desired uid/gid when both sides are resolvable without running anything:
/// a full record, or a numeric `uid:gid` string. Name-based strings resolve
/// inside `chown` itself, so requests carrying them always execute.
pub(crate) fn owner_ids(spec: &OwnerSpec) -> Option<(u32, u32)> {
    match spec {
        OwnerSpec::Record(record) => Some((record.uid, record.gid)),
        OwnerSpec::Names(names) => {
            let (user, group) = names.split_once(':')?;
            Some((user.parse().ok()?, group.parse().ok()?))
        }
    }
}

/// Failure fact shared by every operation.
pub(crate) fn emit_failure(logger: &OpLogger<'_>, err: &Error) {
    let id = err.id();
    logger
        .result()
        .field("error_id", json!(id_str(id)))
        .field("exit_code", json!(exit_code_for(id)))
        .field("msg", json!(err.to_string()))
        .emit_failure();
}

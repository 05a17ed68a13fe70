//! `mkdir -p` semantics with an optional follow-up chown.

use std::path::PathBuf;

use serde_json::json;

use crate::api::cmd;
use crate::api::Gantry;
use crate::fs::meta::{kind_of, NodeKind};
use crate::fs::paths::{blocking_file_in_ancestors, resolve_target};
use crate::logging::audit::OpLogger;
use crate::logging::{AuditSink, FactsEmitter};
use crate::types::{AccessMode, Error, MakeDirRequest, Result};

pub(crate) fn run<E: FactsEmitter, A: AuditSink>(
    api: &Gantry<E, A>,
    logger: &OpLogger<'_>,
    req: &MakeDirRequest,
) -> Result<PathBuf> {
    if let Some(mode) = &req.mode {
        mode.validate()?;
    }
    let owner_arg = match &req.owner {
        Some(owner) => Some(super::owner_argument(owner)?),
        None => None,
    };
    let path = resolve_target(&req.path, api.policy.access.follow_symlinks);

    if kind_of(&path) == NodeKind::Dir {
        logger
            .skip()
            .field("reason", json!("already_dir"))
            .emit_success();
        return Ok(path);
    }
    if let Some(blocking) = blocking_file_in_ancestors(&path) {
        return Err(Error::NotADirectory { path, blocking });
    }

    let prefix = api
        .resolver()
        .escalation_prefix(&path, AccessMode::WRITE, false);
    logger
        .attempt()
        .field("mode", json!(req.mode.as_ref().map(|m| m.to_argument())))
        .field("owner", json!(owner_arg))
        .field("escalated", json!(!prefix.is_empty()))
        .emit_success();

    let mkdir = cmd::make_dir(&prefix, &path, req.mode.as_ref());
    super::execute(api, &mkdir)?;
    let mut commands = vec![cmd::render(&mkdir)];

    // Ownership cannot be expressed through mkdir; a fresh directory always
    // needs the follow-up, so the walk is skipped for it.
    if let Some(owner) = owner_arg {
        let force = api
            .resolver()
            .escalation_prefix(&path, AccessMode::WRITE, true);
        let chown = cmd::chown(&force, &path, &owner, false);
        super::execute(api, &chown)?;
        commands.push(cmd::render(&chown));
    }

    logger
        .result()
        .field("commands", json!(commands))
        .emit_success();
    Ok(path)
}

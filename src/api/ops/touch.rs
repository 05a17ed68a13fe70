//! File creation, including missing parents and follow-up metadata.

use std::path::PathBuf;

use serde_json::json;

use crate::api::cmd;
use crate::api::Gantry;
use crate::fs::meta::{kind_of, NodeKind};
use crate::fs::paths::{blocking_file_in_ancestors, resolve_target};
use crate::logging::audit::OpLogger;
use crate::logging::{AuditSink, FactsEmitter};
use crate::types::{AccessMode, Error, Result, TouchRequest};

pub(crate) fn run<E: FactsEmitter, A: AuditSink>(
    api: &Gantry<E, A>,
    logger: &OpLogger<'_>,
    req: &TouchRequest,
) -> Result<PathBuf> {
    if let Some(mode) = &req.mode {
        mode.validate()?;
    }
    let owner_arg = match &req.owner {
        Some(owner) => Some(super::owner_argument(owner)?),
        None => None,
    };
    let path = resolve_target(&req.path, api.policy.access.follow_symlinks);

    // An existing file or directory already satisfies the goal; requested
    // mode and owner are not applied retroactively.
    if matches!(kind_of(&path), NodeKind::File | NodeKind::Dir) {
        logger
            .skip()
            .field("reason", json!("exists"))
            .emit_success();
        return Ok(path);
    }
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("/"),
    };
    if let Some(blocking) = blocking_file_in_ancestors(&parent) {
        return Err(Error::NotADirectory { path, blocking });
    }

    // The target is missing, so the walk decides at its first existing
    // ancestor; the parent mkdir would land on the same decision.
    let prefix = api
        .resolver()
        .escalation_prefix(&path, AccessMode::WRITE, false);
    logger
        .attempt()
        .field("mode", json!(req.mode.as_ref().map(|m| m.to_argument())))
        .field("owner", json!(owner_arg))
        .field("escalated", json!(!prefix.is_empty()))
        .emit_success();

    let mut commands = Vec::new();
    if kind_of(&parent) != NodeKind::Dir {
        let mkdir = cmd::make_dir(&prefix, &parent, None);
        super::execute(api, &mkdir)?;
        commands.push(cmd::render(&mkdir));
    }
    let touch = cmd::touch(&prefix, &path);
    super::execute(api, &touch)?;
    commands.push(cmd::render(&touch));

    if let Some(mode) = &req.mode {
        let force = api
            .resolver()
            .escalation_prefix(&path, AccessMode::WRITE, true);
        let chmod = cmd::chmod(&force, &path, &mode.to_argument(), false);
        super::execute(api, &chmod)?;
        commands.push(cmd::render(&chmod));
    }
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

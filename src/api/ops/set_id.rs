//! Set-id promotion: install a set-uid or set-gid bit on a target,
//! optionally via a privileged sibling copy.
//!
//! The kernel honors set-id bits only relative to the file's owner, so
//! installing a bit means chowning to the impersonated identity first.
//! Both changes ride one `sh -c` chain: a failed chown must abort the
//! chmod, or the bit would grant the wrong identity.

use std::path::PathBuf;

use serde_json::json;

use crate::api::cmd;
use crate::api::Gantry;
use crate::fs::diff::content_equal;
use crate::fs::meta::{kind_of, read_stat, NodeKind};
use crate::fs::paths::{exists_no_follow, resolve_target};
use crate::logging::audit::OpLogger;
use crate::logging::{AuditSink, FactsEmitter};
use crate::types::{AccessMode, Error, IdBit, Result, SetIdRequest};

pub(crate) fn run<E: FactsEmitter, A: AuditSink>(
    api: &Gantry<E, A>,
    logger: &OpLogger<'_>,
    req: &SetIdRequest,
) -> Result<PathBuf> {
    let source = resolve_target(&req.path, api.policy.access.follow_symlinks);
    if !exists_no_follow(&source) {
        return Err(Error::not_found_path(&source));
    }
    let target = match &req.copy_as {
        Some(name) => source.with_file_name(name),
        None => source.clone(),
    };
    let (desired_uid, desired_gid) = req.owner.as_ref().map_or((0, 0), |o| (o.uid, o.gid));
    let owner_arg = req
        .owner
        .as_ref()
        .map_or_else(|| "0:0".to_string(), |o| o.owner_arg());
    let mask = req.bit.mode_mask();

    // The copy is skipped when an earlier promotion already left identical
    // bytes under the target name. Detection never blocks the operation: an
    // unreadable target just means the copy runs again.
    let need_copy = match &req.copy_as {
        Some(_) if !exists_no_follow(&target) => true,
        Some(_) => {
            let both_files =
                kind_of(&source) == NodeKind::File && kind_of(&target) == NodeKind::File;
            !(both_files && content_equal(&source, &target).unwrap_or(false))
        }
        None => false,
    };
    // The bit impersonates the owner for set-uid and the group for set-gid;
    // the matching id decides whether ownership is already right.
    let needs_promote = if need_copy {
        true
    } else {
        match read_stat(&target, true) {
            Ok(stat) => {
                let owned = match req.bit {
                    IdBit::SetUid => stat.uid == desired_uid,
                    IdBit::SetGid => stat.gid == desired_gid,
                };
                stat.permissions() & mask != mask || !owned
            }
            Err(_) => true,
        }
    };
    if !need_copy && !needs_promote {
        logger
            .skip()
            .field("reason", json!("already_promoted"))
            .emit_success();
        return Ok(target);
    }

    logger
        .attempt()
        .field("bit", json!(bit_label(req.bit)))
        .field("target", json!(target.display().to_string()))
        .field("owner", json!(owner_arg))
        .field("copying", json!(need_copy))
        .emit_success();

    let mut commands = Vec::new();
    if need_copy {
        let prefix = api
            .resolver()
            .escalation_prefix(&target, AccessMode::WRITE, false);
        let recursive = std::fs::metadata(&source).map(|m| m.is_dir()).unwrap_or(false);
        let cp = cmd::copy(&prefix, &source, &target, recursive, false, false);
        super::execute(api, &cp)?;
        commands.push(cmd::render(&cp));
    }

    let force = api
        .resolver()
        .escalation_prefix(&target, AccessMode::WRITE, true);
    let promote = cmd::set_id_promote(&force, &target, &owner_arg, req.bit.symbolic_clause());
    super::execute(api, &promote)?;
    commands.push(cmd::render(&promote));

    logger
        .result()
        .field("commands", json!(commands))
        .field("target", json!(target.display().to_string()))
        .emit_success();
    Ok(target)
}

fn bit_label(bit: IdBit) -> &'static str {
    match bit {
        IdBit::SetUid => "setuid",
        IdBit::SetGid => "setgid",
    }
}

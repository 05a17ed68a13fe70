//! Ownership changes. Always escalated when a mechanism exists: handing a
//! file to another account requires root even on paths the caller owns.

use serde_json::json;

use crate::api::cmd;
use crate::api::Gantry;
use crate::fs::diff::needs_change;
use crate::fs::meta::read_stat;
use crate::fs::paths::{exists_no_follow, resolve_target};
use crate::logging::audit::OpLogger;
use crate::logging::{AuditSink, FactsEmitter};
use crate::types::{AccessMode, ChownRequest, Error, Result};

pub(crate) fn run<E: FactsEmitter, A: AuditSink>(
    api: &Gantry<E, A>,
    logger: &OpLogger<'_>,
    req: &ChownRequest,
) -> Result<()> {
    let owner = super::owner_argument(&req.owner)?;
    let path = resolve_target(&req.path, api.policy.access.follow_symlinks);

    if !exists_no_follow(&path) {
        if !req.missing_ok {
            return Err(Error::not_found_path(&path));
        }
        logger
            .skip()
            .field("reason", json!("missing"))
            .emit_success();
        return Ok(());
    }

    if !req.recursive {
        if let (Some((uid, gid)), Ok(stat)) = (super::owner_ids(&req.owner), read_stat(&path, true))
        {
            if !needs_change(&stat, None, Some((uid, gid))) {
                logger
                    .skip()
                    .field("reason", json!("owner_match"))
                    .emit_success();
                return Ok(());
            }
        }
    }

    let prefix = api
        .resolver()
        .escalation_prefix(&path, AccessMode::WRITE, true);
    logger
        .attempt()
        .field("owner", json!(owner))
        .field("recursive", json!(req.recursive))
        .field("escalated", json!(!prefix.is_empty()))
        .emit_success();

    let argv = cmd::chown(&prefix, &path, &owner, req.recursive);
    super::execute(api, &argv)?;

    logger
        .result()
        .field("commands", json!([cmd::render(&argv)]))
        .emit_success();
    Ok(())
}

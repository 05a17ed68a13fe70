//! Permission bits, numeric or symbolic. Mode changes need ownership of
//! the target no matter how permissive it is, so the prefix is forced.

use serde_json::json;

use crate::api::cmd;
use crate::api::Gantry;
use crate::fs::diff::needs_change;
use crate::fs::meta::read_stat;
use crate::fs::paths::{exists_no_follow, resolve_target};
use crate::logging::audit::OpLogger;
use crate::logging::{AuditSink, FactsEmitter};
use crate::types::{AccessMode, ChmodRequest, Error, Result};

pub(crate) fn run<E: FactsEmitter, A: AuditSink>(
    api: &Gantry<E, A>,
    logger: &OpLogger<'_>,
    req: &ChmodRequest,
) -> Result<()> {
    req.mode.validate()?;
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

    // Detection handles the flat numeric case only. Symbolic expressions
    // resolve against the live mode inside chmod, and recursion would need
    // a stat per descendant; both always execute. A failed stat also falls
    // through to execution.
    if !req.recursive {
        if let (Some(bits), Ok(stat)) = (req.mode.as_bits(), read_stat(&path, true)) {
            if !needs_change(&stat, Some(bits), None) {
                logger
                    .skip()
                    .field("reason", json!("mode_match"))
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
        .field("mode", json!(req.mode.to_argument()))
        .field("recursive", json!(req.recursive))
        .field("escalated", json!(!prefix.is_empty()))
        .emit_success();

    let argv = cmd::chmod(&prefix, &path, &req.mode.to_argument(), req.recursive);
    super::execute(api, &argv)?;

    logger
        .result()
        .field("commands", json!([cmd::render(&argv)]))
        .emit_success();
    Ok(())
}

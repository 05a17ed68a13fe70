//! Path removal. Deleting is judged by the parent's rights, not the
//! target's, so the resolver is forced past the access walk.

use serde_json::json;

use crate::api::cmd;
use crate::api::Gantry;
use crate::fs::paths::{absolutize, exists_no_follow};
use crate::logging::audit::OpLogger;
use crate::logging::{AuditSink, FactsEmitter};
use crate::types::{AccessMode, Error, RemoveRequest, Result};

pub(crate) fn run<E: FactsEmitter, A: AuditSink>(
    api: &Gantry<E, A>,
    logger: &OpLogger<'_>,
    req: &RemoveRequest,
) -> Result<()> {
    // rm operates on the link itself; symlinks are never followed here.
    let path = absolutize(&req.path);

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

    let prefix = api
        .resolver()
        .escalation_prefix(&path, AccessMode::WRITE, true);
    logger
        .attempt()
        .field("recursive", json!(req.recursive))
        .field("escalated", json!(!prefix.is_empty()))
        .emit_success();

    let argv = cmd::remove(&prefix, &path, req.recursive);
    super::execute(api, &argv)?;

    logger
        .result()
        .field("commands", json!([cmd::render(&argv)]))
        .emit_success();
    Ok(())
}

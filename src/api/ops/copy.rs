//! Copy with content-aware short-circuiting.

use std::path::PathBuf;

use serde_json::json;

use crate::api::cmd;
use crate::api::Gantry;
use crate::fs::diff::content_equal;
use crate::fs::meta::{kind_of, NodeKind};
use crate::fs::paths::{absolutize, exists_no_follow};
use crate::logging::audit::OpLogger;
use crate::logging::{AuditSink, FactsEmitter};
use crate::types::{AccessMode, CopyRequest, Error, Result};

pub(crate) fn run<E: FactsEmitter, A: AuditSink>(
    api: &Gantry<E, A>,
    logger: &OpLogger<'_>,
    req: &CopyRequest,
) -> Result<PathBuf> {
    let source = absolutize(&req.source);
    let dest = absolutize(&req.dest);

    let present = if req.follow_symlinks {
        source.exists()
    } else {
        exists_no_follow(&source)
    };
    if !present {
        return Err(Error::not_found_path(&source));
    }
    let recursive = std::fs::metadata(&source).map(|m| m.is_dir()).unwrap_or(false);

    // A plain file-to-file copy whose destination already holds the same
    // bytes is complete. Preserve mode re-applies metadata and contents mode
    // merges trees, so both always run. An unreadable side forfeits the skip
    // and defers to cp, which may hold more rights once escalated.
    if !req.preserve && !req.contents && !recursive {
        let effective = match (kind_of(&dest), source.file_name()) {
            (NodeKind::Dir, Some(name)) => dest.join(name),
            _ => dest.clone(),
        };
        if kind_of(&source) == NodeKind::File
            && kind_of(&effective) == NodeKind::File
            && content_equal(&source, &effective).unwrap_or(false)
        {
            logger
                .skip()
                .field("reason", json!("content_match"))
                .emit_success();
            return Ok(dest);
        }
    }

    let prefix = api
        .resolver()
        .escalation_prefix(&dest, AccessMode::WRITE, false);
    logger
        .attempt()
        .field("source", json!(source.display().to_string()))
        .field("recursive", json!(recursive))
        .field("contents", json!(req.contents))
        .field("preserve", json!(req.preserve))
        .field("escalated", json!(!prefix.is_empty()))
        .emit_success();

    // `src/.` copies what is inside the directory instead of the directory.
    let src_arg = if req.contents {
        source.join(".")
    } else {
        source.clone()
    };
    let argv = cmd::copy(
        &prefix,
        &src_arg,
        &dest,
        recursive,
        req.follow_symlinks,
        req.preserve,
    );
    super::execute(api, &argv)?;

    logger
        .result()
        .field("commands", json!([cmd::render(&argv)]))
        .emit_success();
    Ok(dest)
}

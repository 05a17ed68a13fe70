//! Deterministic UUIDv5 identifiers for mutation operations.
//!
//! The UUID namespace is derived from a stable tag (`NS_TAG`) so that the
//! same request always produces the same `op_id`, which lets log consumers
//! correlate retries and idempotent re-runs.
use uuid::Uuid;

use super::identity::OwnerSpec;
use super::request::MutationRequest;
use crate::constants::NS_TAG;

fn namespace() -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_URL, NS_TAG.as_bytes())
}

fn lossy(p: &std::path::Path) -> String {
    p.to_string_lossy().into_owned()
}

fn owner_label(owner: Option<&OwnerSpec>) -> String {
    match owner {
        Some(OwnerSpec::Record(r)) => r.owner_arg(),
        Some(OwnerSpec::Names(s)) => s.clone(),
        None => String::new(),
    }
}

/// Serialize a request into a stable, human-readable string used for
/// UUIDv5 input. Every field that changes the commands the engine would
/// run must appear here.
fn serialize_request(req: &MutationRequest) -> String {
    match req {
        MutationRequest::MakeDir(r) => format!(
            "D:{}:{:?}:{}",
            lossy(&r.path),
            r.mode.as_ref().map(super::mode::ModeSpec::to_argument),
            owner_label(r.owner.as_ref())
        ),
        MutationRequest::Touch(r) => format!(
            "T:{}:{:?}:{}",
            lossy(&r.path),
            r.mode.as_ref().map(super::mode::ModeSpec::to_argument),
            owner_label(r.owner.as_ref())
        ),
        MutationRequest::Copy(r) => format!(
            "C:{}->{}:{}{}{}",
            lossy(&r.source),
            lossy(&r.dest),
            u8::from(r.contents),
            u8::from(r.follow_symlinks),
            u8::from(r.preserve)
        ),
        MutationRequest::Remove(r) => {
            format!("R:{}:{}", lossy(&r.path), u8::from(r.recursive))
        }
        MutationRequest::Chmod(r) => format!(
            "PM:{}:{}:{}",
            lossy(&r.path),
            r.mode.to_argument(),
            u8::from(r.recursive)
        ),
        MutationRequest::Chown(r) => format!(
            "PO:{}:{}:{}",
            lossy(&r.path),
            owner_label(Some(&r.owner)),
            u8::from(r.recursive)
        ),
        MutationRequest::SetId(r) => format!(
            "S:{}:{:?}:{:?}:{}",
            lossy(&r.path),
            r.bit,
            r.copy_as,
            r.owner
                .as_ref()
                .map_or_else(String::new, super::identity::IdentityRecord::owner_arg)
        ),
    }
}

/// Compute a deterministic UUIDv5 for one mutation request.
#[must_use]
pub fn op_id(req: &MutationRequest) -> Uuid {
    Uuid::new_v5(&namespace(), serialize_request(req).as_bytes())
}

//! Shared crate-wide constants for gantry.
//!
//! Centralizes magic values used across modules. Adjusting these here will
//! propagate through the crate.

/// Block size in bytes for streaming file digests (see `fs::meta`).
pub const CHECKSUM_BLOCK_SIZE: usize = 64 * 1024;

/// Escalation mechanisms probed in order when policy does not name one.
/// The first candidate found on `PATH` wins.
pub const ESCALATION_CANDIDATES: &[&str] = &["sudo", "doas"];

/// Filename prefix for set-id copies of the current executable.
/// `set_id_current_exe` promotes `tool` as `rtool` unless told otherwise.
pub const SETID_COPY_PREFIX: &str = "r";

/// Schema version stamped into every emitted fact envelope.
pub const FACTS_SCHEMA_VERSION: i64 = 1;

/// UUIDv5 namespace tag for deterministic operation IDs.
pub const NS_TAG: &str = "https://gantry/mutation";

/// Permission, set-id and sticky bits of `st_mode`.
pub const MODE_BITS_MASK: u32 = 0o7777;

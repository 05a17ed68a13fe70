pub mod access;
pub mod diff;
pub mod meta;
pub mod paths;

pub use access::{AccessProbe, SyscallProbe};
pub use diff::{content_equal, mode_differs, needs_change, owner_differs};
pub use meta::{kind_of, read_stat, sha256_hex_of, NodeKind};
pub use paths::{absolutize, blocking_file_in_ancestors, exists_no_follow, resolve_target};

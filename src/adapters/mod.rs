pub mod exec;
pub mod identity;
pub mod locate;

pub use exec::{CommandRunner, ProcessRunner, RunOutput};
pub use identity::{EtcSource, IdentityCache, IdentitySource};
pub use locate::{CommandLocator, PathLocator};

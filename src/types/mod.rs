pub mod access;
pub mod errors;
pub mod identity;
pub mod ids;
pub mod mode;
pub mod request;
pub mod stat;

pub use access::*;
pub use errors::*;
pub use identity::*;
pub use ids::*;
pub use mode::*;
pub use request::*;
pub use stat::*;

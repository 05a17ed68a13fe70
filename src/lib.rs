#![forbid(unsafe_code)]
//! Gantry: privilege-aware filesystem mutations.
//!
//! Privilege model highlights:
//! - Mutations shell out to coreutils with an escalation prefix (`sudo`-style) prepended only when an ancestor-walk access probe says the caller lacks rights at the nearest existing ancestor.
//! - Goal states are checked first (mode/owner bits, streamed content digests); a mutation whose effect already holds issues no command at all.
//! - This crate forbids `unsafe` and uses `rustix` for syscalls.

pub mod constants;
pub mod adapters;
pub mod api;
pub mod fs;
pub mod logging;
pub mod policy;
pub mod types;

pub use api::*;

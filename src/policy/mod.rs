//! Policy configuration and escalation decisions.
//!
//! The `policy` module centralizes the knobs governing when mutations run
//! under an escalation prefix and how access probes behave. Consumers
//! typically construct a [`Policy`](crate::policy::Policy) (default or via
//! `unattended_preset`), customize fields, and hand it to a
//! [`Gantry`](crate::Gantry) instance.
//!
//! Submodules:
//! - `config`: policy struct and presets
//! - `escalate`: the walk-to-first-existing-ancestor resolver

pub mod config;
pub mod escalate;

pub use config::{AccessPolicy, EscalationPolicy, Policy};
pub use escalate::{Credentials, EscalationMode, PrivilegeResolver};

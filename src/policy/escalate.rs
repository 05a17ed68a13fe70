//! Escalation decisions: whether a mutation needs a privilege prefix.
//!
//! The resolver never asks "am I root" first; it asks the filesystem. A
//! probe of the target, or of the first existing ancestor when the target
//! does not exist yet, decides whether the caller could perform the
//! mutation unaided.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::adapters::locate::CommandLocator;
use crate::constants::ESCALATION_CANDIDATES;
use crate::fs::access::AccessProbe;
use crate::fs::paths::absolutize;
use crate::policy::config::Policy;
use crate::types::{AccessMode, AccessResult};

/// When the resolver considers escalating at all.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EscalationMode {
    /// Decide per path via the ancestor walk.
    #[default]
    Auto,
    /// Never prefix, even when a probe says access is denied.
    Never,
    /// Prefix every mutation without probing.
    Always,
}

/// Real and effective uid of the caller, injectable for tests.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Credentials {
    pub uid: u32,
    pub euid: u32,
}

impl Credentials {
    #[must_use]
    pub fn current() -> Self {
        Credentials {
            uid: rustix::process::getuid().as_raw(),
            euid: rustix::process::geteuid().as_raw(),
        }
    }

    #[must_use]
    pub const fn new(uid: u32, euid: u32) -> Self {
        Credentials { uid, euid }
    }
}

/// Decides the escalation prefix for one mutation.
pub struct PrivilegeResolver<'a> {
    probe: &'a dyn AccessProbe,
    locator: &'a dyn CommandLocator,
    policy: &'a Policy,
    caller: Credentials,
}

impl<'a> PrivilegeResolver<'a> {
    #[must_use]
    pub fn new(
        probe: &'a dyn AccessProbe,
        locator: &'a dyn CommandLocator,
        policy: &'a Policy,
    ) -> Self {
        PrivilegeResolver {
            probe,
            locator,
            policy,
            caller: Credentials::current(),
        }
    }

    #[must_use]
    pub fn with_caller(mut self, caller: Credentials) -> Self {
        self.caller = caller;
        self
    }

    /// Argv tokens to place before a mutation command; empty when
    /// escalation is unnecessary or impossible.
    ///
    /// Empty comes back when policy says `Never`, when no mechanism is
    /// installed (the command then runs plain and fails on its own if
    /// rights are missing), when the caller already holds root, or when a
    /// probe of the walk's deciding ancestor allows the requested access.
    /// `force` skips the walk for mutations that touch metadata the access
    /// check cannot predict.
    #[must_use]
    pub fn escalation_prefix(&self, path: &Path, mode: AccessMode, force: bool) -> Vec<OsString> {
        match self.policy.escalation.mode {
            EscalationMode::Never => return Vec::new(),
            EscalationMode::Auto | EscalationMode::Always => {}
        }
        let Some(mechanism) = self.mechanism() else {
            return Vec::new();
        };
        let acting_uid = if self.policy.access.effective_ids {
            self.caller.euid
        } else {
            self.caller.uid
        };
        if acting_uid == 0 {
            return Vec::new();
        }
        if force || self.policy.escalation.mode == EscalationMode::Always {
            return self.prefix_tokens(&mechanism);
        }

        // Walk upward until some existing entry yields a definitive answer.
        // Nothing existing all the way up is treated as denied: no access
        // fact can be established, so fail safe.
        let mut candidate = absolutize(path);
        loop {
            match self.probe.probe(
                &candidate,
                mode,
                self.policy.access.effective_ids,
                self.policy.access.follow_symlinks,
            ) {
                AccessResult::Allowed => return Vec::new(),
                AccessResult::Denied => return self.prefix_tokens(&mechanism),
                AccessResult::NotFound => match candidate.parent() {
                    Some(parent)
                        if !parent.as_os_str().is_empty() && parent != Path::new("/") =>
                    {
                        candidate = parent.to_path_buf();
                    }
                    _ => return self.prefix_tokens(&mechanism),
                },
            }
        }
    }

    fn mechanism(&self) -> Option<PathBuf> {
        match &self.policy.escalation.command {
            Some(name) => self.locator.locate(name),
            None => ESCALATION_CANDIDATES
                .iter()
                .find_map(|name| self.locator.locate(name)),
        }
    }

    fn prefix_tokens(&self, mechanism: &Path) -> Vec<OsString> {
        let mut tokens = Vec::with_capacity(1 + self.policy.escalation.args.len());
        tokens.push(mechanism.as_os_str().to_os_string());
        tokens.extend(self.policy.escalation.args.iter().map(OsString::from));
        tokens
    }
}

// Facade for the mutation engine; operations live under src/api/ops/

use std::path::{Path, PathBuf};

use log::Level;

use crate::adapters::exec::{CommandRunner, ProcessRunner};
use crate::adapters::identity::{EtcSource, IdentityCache, IdentitySource};
use crate::adapters::locate::{CommandLocator, PathLocator};
use crate::constants::SETID_COPY_PREFIX;
use crate::fs::access::{AccessProbe, SyscallProbe};
use crate::logging::audit::{OpCtx, OpLogger};
use crate::logging::{AuditSink, FactsEmitter};
use crate::policy::escalate::{Credentials, PrivilegeResolver};
use crate::policy::Policy;
use crate::types::ids::op_id;
use crate::types::{
    ChmodRequest, ChownRequest, CopyRequest, Error, IdBit, MakeDirRequest, MutationRequest,
    RemoveRequest, Result, SetIdRequest, TouchRequest,
};

pub(crate) mod cmd;
mod ops;

/// Privilege-aware mutation engine.
///
/// Every operation follows the same pipeline: detect whether the goal state
/// already holds, resolve an escalation prefix against the target's ancestor
/// chain, synthesize one or more coreutils invocations, run them, and emit
/// facts for each stage. Adapters for running commands, locating binaries,
/// probing access and resolving accounts are injectable for tests and for
/// embedders with their own process machinery.
pub struct Gantry<E: FactsEmitter, A: AuditSink> {
    facts: E,
    audit: A,
    policy: Policy,
    runner: Box<dyn CommandRunner>,
    locator: Box<dyn CommandLocator>,
    probe: Box<dyn AccessProbe>,
    identity: IdentityCache,
    caller: Credentials,
}

impl<E: FactsEmitter, A: AuditSink> Gantry<E, A> {
    pub fn new(facts: E, audit: A, policy: Policy) -> Self {
        Self {
            facts,
            audit,
            policy,
            runner: Box::new(ProcessRunner),
            locator: Box::new(PathLocator::new()),
            probe: Box::new(SyscallProbe),
            identity: IdentityCache::new(Box::new(EtcSource::new())),
            caller: Credentials::current(),
        }
    }

    #[must_use]
    pub fn with_runner(mut self, runner: Box<dyn CommandRunner>) -> Self {
        self.runner = runner;
        self
    }

    #[must_use]
    pub fn with_locator(mut self, locator: Box<dyn CommandLocator>) -> Self {
        self.locator = locator;
        self
    }

    #[must_use]
    pub fn with_probe(mut self, probe: Box<dyn AccessProbe>) -> Self {
        self.probe = probe;
        self
    }

    #[must_use]
    pub fn with_identity_source(mut self, source: Box<dyn IdentitySource>) -> Self {
        self.identity = IdentityCache::new(source);
        self
    }

    #[must_use]
    pub fn with_credentials(mut self, caller: Credentials) -> Self {
        self.caller = caller;
        self
    }

    /// Account lookups backed by the engine's cache.
    pub fn identity(&self) -> &IdentityCache {
        &self.identity
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    fn resolver(&self) -> PrivilegeResolver<'_> {
        PrivilegeResolver::new(self.probe.as_ref(), self.locator.as_ref(), &self.policy)
            .with_caller(self.caller)
    }

    /// Create a directory and all missing parents.
    ///
    /// # Errors
    /// `NotADirectory` when a file blocks the hierarchy; command failures
    /// per the taxonomy.
    pub fn make_dir(&self, req: MakeDirRequest) -> Result<PathBuf> {
        self.dispatch(MutationRequest::MakeDir(req.clone()), |logger| {
            ops::make_dir::run(self, logger, &req)
        })
    }

    /// Ensure a regular file exists, creating missing parents first.
    ///
    /// # Errors
    /// `NotADirectory` when a file blocks the hierarchy; command failures
    /// per the taxonomy.
    pub fn touch(&self, req: TouchRequest) -> Result<PathBuf> {
        self.dispatch(MutationRequest::Touch(req.clone()), |logger| {
            ops::touch::run(self, logger, &req)
        })
    }

    /// Copy a file or tree and return the destination path.
    ///
    /// # Errors
    /// `NotFound` when the source is absent; command failures per the
    /// taxonomy.
    pub fn copy(&self, req: CopyRequest) -> Result<PathBuf> {
        self.dispatch(MutationRequest::Copy(req.clone()), |logger| {
            ops::copy::run(self, logger, &req)
        })
    }

    /// Remove a path.
    ///
    /// # Errors
    /// `NotFound` when the path is absent and `missing_ok` was disabled;
    /// command failures per the taxonomy.
    pub fn remove(&self, req: RemoveRequest) -> Result<()> {
        self.dispatch(MutationRequest::Remove(req.clone()), |logger| {
            ops::remove::run(self, logger, &req)
        })
    }

    /// Set permission bits.
    ///
    /// # Errors
    /// `InvalidArgument` for malformed modes, `NotFound` for missing paths
    /// unless tolerated; command failures per the taxonomy.
    pub fn chmod(&self, req: ChmodRequest) -> Result<()> {
        self.dispatch(MutationRequest::Chmod(req.clone()), |logger| {
            ops::chmod::run(self, logger, &req)
        })
    }

    /// Set ownership.
    ///
    /// # Errors
    /// `InvalidArgument` for owner strings without `:`, `NotFound` for
    /// missing paths unless tolerated; command failures per the taxonomy.
    pub fn chown(&self, req: ChownRequest) -> Result<()> {
        self.dispatch(MutationRequest::Chown(req.clone()), |logger| {
            ops::chown::run(self, logger, &req)
        })
    }

    /// Install a set-id bit, optionally on a privileged sibling copy, and
    /// return the promoted path.
    ///
    /// # Errors
    /// `NotFound` when the source is absent; command failures per the
    /// taxonomy.
    pub fn set_id(&self, req: SetIdRequest) -> Result<PathBuf> {
        self.dispatch(MutationRequest::SetId(req.clone()), |logger| {
            ops::set_id::run(self, logger, &req)
        })
    }

    /// Promote the running executable itself as a set-id sibling copy,
    /// named `r<exe>` unless an explicit name is given.
    ///
    /// # Errors
    /// `Io` when the executable path cannot be read; otherwise as
    /// [`Gantry::set_id`].
    pub fn set_id_current_exe(&self, name: Option<&str>, bit: IdBit) -> Result<PathBuf> {
        let exe =
            std::env::current_exe().map_err(|e| Error::io(Path::new("/proc/self/exe"), e))?;
        let copy_as = match name {
            Some(n) => n.to_string(),
            None => {
                let file = exe
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                format!("{SETID_COPY_PREFIX}{file}")
            }
        };
        self.set_id(SetIdRequest::new(exe, bit).with_copy_as(copy_as))
    }

    /// Shared wrapper: one audit line in, a failure fact and one audit line
    /// out on error. Skip and success facts are emitted by the operation,
    /// which knows its own fields.
    fn dispatch<T>(
        &self,
        request: MutationRequest,
        f: impl FnOnce(&OpLogger<'_>) -> Result<T>,
    ) -> Result<T> {
        let kind = request.kind();
        let path = request.target().display().to_string();
        self.audit.log(Level::Info, &format!("{kind}: {path}"));
        let ctx = OpCtx::new(&self.facts, op_id(&request).to_string(), kind, path);
        let logger = OpLogger::new(&ctx);
        match f(&logger) {
            Ok(v) => Ok(v),
            Err(e) => {
                ops::emit_failure(&logger, &e);
                self.audit.log(Level::Warn, &format!("{kind} failed: {e}"));
                Err(e)
            }
        }
    }
}

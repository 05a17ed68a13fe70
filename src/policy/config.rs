use super::escalate::EscalationMode;

/// Policy governs when mutations escalate and how access is probed.
///
/// Grouped fields provide clearer ownership and ergonomics.
#[derive(Clone, Debug, Default)]
pub struct Policy {
    pub escalation: EscalationPolicy,
    pub access: AccessPolicy,
}

/// How the escalation prefix is chosen.
#[derive(Clone, Debug)]
pub struct EscalationPolicy {
    /// `Auto` walks the ancestor chain; `Never` and `Always` skip it.
    pub mode: EscalationMode,
    /// Explicit mechanism name or path. `None` probes the built-in
    /// candidates (`sudo`, then `doas`) on `PATH`.
    pub command: Option<String>,
    /// Extra argv tokens inserted after the mechanism, e.g. `-n` to forbid
    /// password prompts in unattended runs.
    pub args: Vec<String>,
}

impl Default for EscalationPolicy {
    fn default() -> Self {
        EscalationPolicy {
            mode: EscalationMode::Auto,
            command: None,
            args: Vec::new(),
        }
    }
}

/// Defaults applied to access probes and path handling.
#[derive(Clone, Copy, Debug, Default)]
pub struct AccessPolicy {
    /// Probe with the effective uid/gid instead of the real ids.
    pub effective_ids: bool,
    /// Resolve symlinks before probing and mutating.
    pub follow_symlinks: bool,
}

impl Policy {
    /// Policy for unattended runs: never block on a password prompt.
    ///
    /// # Example
    /// ```rust
    /// use gantry::policy::Policy;
    /// use gantry::{Gantry, logging::JsonlSink};
    ///
    /// let api = Gantry::new(
    ///     JsonlSink::default(),
    ///     JsonlSink::default(),
    ///     Policy::unattended_preset(),
    /// );
    /// # let _ = api;
    /// ```
    #[must_use]
    pub fn unattended_preset() -> Self {
        let mut p = Self::default();
        p.escalation.args = vec!["-n".to_string()];
        p
    }
}

//! Permission-mode expressions accepted by chmod-style operations.

use crate::constants::MODE_BITS_MASK;
use crate::types::errors::{Error, Result};

/// A permission specification: either absolute bits or a symbolic
/// expression in `chmod(1)` syntax such as `u+s,+x`.
///
/// Symbolic expressions are validated for shape, never evaluated; the
/// external `chmod` applies them against the current mode.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ModeSpec {
    Bits(u32),
    Symbolic(String),
}

impl ModeSpec {
    #[must_use]
    pub fn bits(mode: u32) -> Self {
        ModeSpec::Bits(mode)
    }

    #[must_use]
    pub fn symbolic(expr: impl Into<String>) -> Self {
        ModeSpec::Symbolic(expr.into())
    }

    /// Absolute bits when the spec is numeric; symbolic specs resolve only
    /// against a live mode, so they yield `None`.
    #[must_use]
    pub fn as_bits(&self) -> Option<u32> {
        match self {
            ModeSpec::Bits(b) => Some(*b),
            ModeSpec::Symbolic(_) => None,
        }
    }

    /// Checks the spec before any command is spawned.
    ///
    /// # Errors
    /// `InvalidArgument` for out-of-range bits or a malformed symbolic
    /// expression.
    pub fn validate(&self) -> Result<()> {
        match self {
            ModeSpec::Bits(b) if *b & !MODE_BITS_MASK != 0 => Err(Error::InvalidArgument(format!(
                "mode bits out of range: {b:#o}"
            ))),
            ModeSpec::Bits(_) => Ok(()),
            ModeSpec::Symbolic(expr) => validate_symbolic(expr),
        }
    }

    /// The argument handed to `chmod`.
    #[must_use]
    pub fn to_argument(&self) -> String {
        match self {
            ModeSpec::Bits(b) => format!("{b:o}"),
            ModeSpec::Symbolic(expr) => expr.clone(),
        }
    }
}

/// Shape check for `chmod(1)` symbolic clauses:
/// `[ugoa]*([-+=]([rwxXst]*|[ugo]))+`, comma-separated.
fn validate_symbolic(expr: &str) -> Result<()> {
    let bad = |detail: &str| Error::InvalidArgument(format!("bad mode expression {expr:?}: {detail}"));
    if expr.is_empty() {
        return Err(bad("empty"));
    }
    for clause in expr.split(',') {
        let rest = clause.trim_start_matches(|c| matches!(c, 'u' | 'g' | 'o' | 'a'));
        if rest.is_empty() {
            return Err(bad("clause has no operator"));
        }
        let mut chars = rest.chars().peekable();
        while let Some(&c) = chars.peek() {
            if !matches!(c, '+' | '-' | '=') {
                return Err(bad("expected one of '+-='"));
            }
            chars.next();
            match chars.peek() {
                // copy the permissions of another class, a single letter
                Some('u' | 'g' | 'o') => {
                    chars.next();
                }
                _ => {
                    while matches!(chars.peek(), Some('r' | 'w' | 'x' | 'X' | 's' | 't')) {
                        chars.next();
                    }
                }
            }
        }
    }
    Ok(())
}

/// Which set-id bit a promotion installs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IdBit {
    SetUid,
    SetGid,
}

impl IdBit {
    /// The id bit plus all three execute bits; a set-id program must be
    /// executable for the bit to mean anything.
    #[must_use]
    pub const fn mode_mask(self) -> u32 {
        match self {
            IdBit::SetUid => 0o4111,
            IdBit::SetGid => 0o2111,
        }
    }

    /// Symbolic clause handed to `chmod` when installing the bit.
    #[must_use]
    pub const fn symbolic_clause(self) -> &'static str {
        match self {
            IdBit::SetUid => "u+s,+x",
            IdBit::SetGid => "g+s,+x",
        }
    }
}

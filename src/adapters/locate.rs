//! Executable lookup for escalation mechanisms and mutation tools.

use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Where a named command lives, or `None` when it is not installed.
/// Implementations must be pure lookups; the resolver treats `None` as
/// "escalation impossible, run plain".
pub trait CommandLocator: Send + Sync {
    fn locate(&self, name: &str) -> Option<PathBuf>;
}

/// `PATH`-scanning locator with per-instance memoization. Negative results
/// are cached too: a host without sudo should not be re-scanned for every
/// mutation.
#[derive(Debug, Default)]
pub struct PathLocator {
    cache: Mutex<HashMap<String, Option<PathBuf>>>,
}

impl PathLocator {
    #[must_use]
    pub fn new() -> Self {
        PathLocator::default()
    }
}

impl CommandLocator for PathLocator {
    fn locate(&self, name: &str) -> Option<PathBuf> {
        let mut cache = self.cache.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        if let Some(hit) = cache.get(name) {
            return hit.clone();
        }
        let found = which_on_path(name);
        cache.insert(name.to_string(), found.clone());
        found
    }
}

fn which_on_path(bin: &str) -> Option<PathBuf> {
    // Names carrying a slash are taken as paths and checked directly.
    if bin.contains('/') {
        let cand = Path::new(bin);
        return (cand.exists() && is_executable(cand)).then(|| cand.to_path_buf());
    }
    let path = env::var_os("PATH")?;
    for dir in env::split_paths(&path) {
        let cand = dir.join(bin);
        if cand.exists() && is_executable(&cand) {
            return Some(cand);
        }
    }
    None
}

fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    if let Ok(md) = std::fs::metadata(path) {
        let mode = md.permissions().mode();
        return (mode & 0o111) != 0;
    }
    false
}

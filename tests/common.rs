//! Shared test doubles for the gantry integration tests.

use log::Level;
use serde_json::Value;
use std::collections::HashMap;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use gantry::adapters::{CommandLocator, CommandRunner, ProcessRunner, RunOutput};
use gantry::fs::access::AccessProbe;
use gantry::logging::{AuditSink, FactsEmitter};
use gantry::types::{AccessMode, AccessResult};

/// A simple in-memory emitter to capture facts during tests.
#[derive(Clone, Default, Debug)]
pub struct TestEmitter {
    pub events: Arc<Mutex<Vec<(String, String, String, Value)>>>,
}

impl TestEmitter {
    pub fn events(&self) -> Vec<(String, String, String, Value)> {
        self.events.lock().unwrap().clone()
    }
}

impl FactsEmitter for TestEmitter {
    fn emit(&self, subsystem: &str, event: &str, decision: &str, fields: Value) {
        self.events
            .lock()
            .unwrap()
            .push((subsystem.into(), event.into(), decision.into(), fields));
    }
}

/// A no-op audit sink for tests.
#[derive(Clone, Default)]
pub struct TestAudit;

impl AuditSink for TestAudit {
    fn log(&self, _level: Level, _msg: &str) {}
}

/// Runner that records every argv and answers from a script instead of
/// spawning anything. An exhausted script keeps answering success.
#[derive(Clone, Default)]
pub struct RecordingRunner {
    pub calls: Arc<Mutex<Vec<Vec<String>>>>,
    outcomes: Arc<Mutex<Vec<RunOutput>>>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        RecordingRunner::default()
    }

    pub fn with_outcomes(outcomes: Vec<RunOutput>) -> Self {
        RecordingRunner {
            calls: Arc::default(),
            outcomes: Arc::new(Mutex::new(outcomes)),
        }
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, argv: &[OsString]) -> io::Result<RunOutput> {
        self.calls
            .lock()
            .unwrap()
            .push(argv.iter().map(|a| a.to_string_lossy().into_owned()).collect());
        let mut outcomes = self.outcomes.lock().unwrap();
        if outcomes.is_empty() {
            Ok(RunOutput::ok())
        } else {
            Ok(outcomes.remove(0))
        }
    }
}

/// Shorthand for a scripted non-zero exit with the given stderr.
pub fn failed_run(code: i32, stderr: &str) -> RunOutput {
    RunOutput {
        code: Some(code),
        signal: None,
        stdout: Vec::new(),
        stderr: stderr.as_bytes().to_vec(),
    }
}

/// Runner whose spawns never start, as if the tool were not installed.
#[derive(Clone, Copy, Default)]
pub struct BrokenRunner;

impl CommandRunner for BrokenRunner {
    fn run(&self, _argv: &[OsString]) -> io::Result<RunOutput> {
        Err(io::Error::new(io::ErrorKind::NotFound, "no such tool"))
    }
}

/// Runner that really executes while keeping a transcript.
#[derive(Clone, Default)]
pub struct CountingRunner {
    inner: ProcessRunner,
    pub calls: Arc<Mutex<Vec<Vec<String>>>>,
}

impl CountingRunner {
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }
}

impl CommandRunner for CountingRunner {
    fn run(&self, argv: &[OsString]) -> io::Result<RunOutput> {
        self.calls
            .lock()
            .unwrap()
            .push(argv.iter().map(|a| a.to_string_lossy().into_owned()).collect());
        self.inner.run(argv)
    }
}

/// Locator answering from a fixed table. `none()` simulates a host with no
/// escalation mechanism installed.
#[derive(Clone, Default)]
pub struct StubLocator {
    known: HashMap<String, PathBuf>,
}

impl StubLocator {
    pub fn none() -> Self {
        StubLocator::default()
    }

    pub fn with(name: &str, path: &str) -> Self {
        StubLocator::default().and(name, path)
    }

    pub fn and(mut self, name: &str, path: &str) -> Self {
        self.known.insert(name.to_string(), PathBuf::from(path));
        self
    }
}

impl CommandLocator for StubLocator {
    fn locate(&self, name: &str) -> Option<PathBuf> {
        self.known.get(name).cloned()
    }
}

/// Probe answering from a path table, recording every query in order.
/// Unlisted paths probe as `NotFound`.
#[derive(Clone, Default)]
pub struct ScriptedProbe {
    answers: HashMap<PathBuf, AccessResult>,
    pub probed: Arc<Mutex<Vec<PathBuf>>>,
}

impl ScriptedProbe {
    pub fn new() -> Self {
        ScriptedProbe::default()
    }

    pub fn answer(mut self, path: impl Into<PathBuf>, result: AccessResult) -> Self {
        self.answers.insert(path.into(), result);
        self
    }

    pub fn probed(&self) -> Vec<PathBuf> {
        self.probed.lock().unwrap().clone()
    }
}

impl AccessProbe for ScriptedProbe {
    fn probe(
        &self,
        path: &Path,
        _mode: AccessMode,
        _effective_ids: bool,
        _follow_symlinks: bool,
    ) -> AccessResult {
        self.probed.lock().unwrap().push(path.to_path_buf());
        self.answers
            .get(path)
            .copied()
            .unwrap_or(AccessResult::NotFound)
    }
}

/// Create a temporary root directory for filesystem-backed tests.
pub fn with_temp_root() -> tempfile::TempDir {
    tempfile::tempdir().expect("tempdir")
}

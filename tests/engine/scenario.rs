//! End-to-end runs against a real temp root with real coreutils.
//!
//! No escalation mechanism is wired in, so every command runs plain and
//! the temp root keeps everything inside the test's own rights.

use std::os::unix::fs::PermissionsExt;

use gantry::policy::Policy;
use gantry::types::{
    ChmodRequest, CopyRequest, Error, MakeDirRequest, ModeSpec, RemoveRequest, TouchRequest,
};
use gantry::Gantry;

use crate::common::{with_temp_root, CountingRunner, StubLocator, TestAudit, TestEmitter};

fn engine(runner: &CountingRunner) -> (Gantry<TestEmitter, TestAudit>, TestEmitter) {
    let facts = TestEmitter::default();
    let api = Gantry::new(facts.clone(), TestAudit, Policy::default())
        .with_runner(Box::new(runner.clone()))
        .with_locator(Box::new(StubLocator::none()));
    (api, facts)
}

#[test]
fn nested_directories_and_files_converge_to_no_ops() {
    let td = with_temp_root();
    let root = td.path();
    let runner = CountingRunner::default();
    let (api, facts) = engine(&runner);

    // Fresh hierarchy: one mkdir -p covers all four levels.
    let dir = api
        .make_dir(MakeDirRequest::new(root.join("1/2/3/4")))
        .unwrap();
    assert!(dir.is_dir());
    assert_eq!(runner.calls().len(), 1);

    // Re-running changes nothing and spawns nothing.
    api.make_dir(MakeDirRequest::new(root.join("1/2/3/4")))
        .unwrap();
    assert_eq!(runner.calls().len(), 1);

    // Touch below the tree creates the two missing parents, then the file.
    let file = api
        .touch(TouchRequest::new(root.join("1/2/3/4/5/6/7.py")))
        .unwrap();
    assert!(file.is_file());
    let calls = runner.calls();
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[1][0], "mkdir");
    assert_eq!(calls[2][0], "touch");

    api.touch(TouchRequest::new(root.join("1/2/3/4/5/6/7.py")))
        .unwrap();
    assert_eq!(runner.calls().len(), 3);

    // A file in the ancestor chain blocks deeper hierarchy.
    let err = api
        .touch(TouchRequest::new(root.join("1/2/3/4/5/6/7.py/8/9.py")))
        .unwrap_err();
    match err {
        Error::NotADirectory { blocking, .. } => {
            assert_eq!(blocking.file_name().unwrap(), "7.py");
        }
        other => panic!("expected NotADirectory, got {other:?}"),
    }
    assert_eq!(runner.calls().len(), 3);

    let skips: Vec<_> = facts
        .events()
        .into_iter()
        .filter(|e| e.1 == "mutate.skip")
        .collect();
    assert_eq!(skips.len(), 2);
}

#[test]
fn chmod_converges_after_one_command() {
    let td = with_temp_root();
    let file = td.path().join("conf");
    std::fs::write(&file, b"x").unwrap();
    let runner = CountingRunner::default();
    let (api, _facts) = engine(&runner);

    api.chmod(ChmodRequest::new(&file, ModeSpec::bits(0o600)))
        .unwrap();
    let mode = std::fs::metadata(&file).unwrap().permissions().mode() & 0o7777;
    assert_eq!(mode, 0o600);
    assert_eq!(runner.calls().len(), 1);

    api.chmod(ChmodRequest::new(&file, ModeSpec::bits(0o600)))
        .unwrap();
    assert_eq!(runner.calls().len(), 1);
}

#[test]
fn copy_converges_once_the_bytes_match() {
    let td = with_temp_root();
    let src = td.path().join("src.conf");
    let dest = td.path().join("dest.conf");
    std::fs::write(&src, b"payload").unwrap();
    let runner = CountingRunner::default();
    let (api, _facts) = engine(&runner);

    api.copy(CopyRequest::new(&src, &dest)).unwrap();
    assert_eq!(std::fs::read(&dest).unwrap(), b"payload");
    assert_eq!(runner.calls().len(), 1);

    api.copy(CopyRequest::new(&src, &dest)).unwrap();
    assert_eq!(runner.calls().len(), 1);

    // Divergent destination bytes trigger a fresh copy.
    std::fs::write(&dest, b"drifted").unwrap();
    api.copy(CopyRequest::new(&src, &dest)).unwrap();
    assert_eq!(std::fs::read(&dest).unwrap(), b"payload");
    assert_eq!(runner.calls().len(), 2);
}

#[test]
fn remove_deletes_then_tolerates_absence() {
    let td = with_temp_root();
    let file = td.path().join("victim");
    std::fs::write(&file, b"x").unwrap();
    let runner = CountingRunner::default();
    let (api, _facts) = engine(&runner);

    api.remove(RemoveRequest::new(&file)).unwrap();
    assert!(!file.exists());
    assert_eq!(runner.calls().len(), 1);

    api.remove(RemoveRequest::new(&file)).unwrap();
    assert_eq!(runner.calls().len(), 1);

    let err = api
        .remove(RemoveRequest::new(&file).with_missing_ok(false))
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[test]
fn directory_removal_requires_explicit_recursion() {
    let td = with_temp_root();
    let dir = td.path().join("tree");
    std::fs::create_dir(&dir).unwrap();
    std::fs::write(dir.join("f"), b"x").unwrap();
    let runner = CountingRunner::default();
    let (api, _facts) = engine(&runner);

    // Plain rm refuses directories; the failure carries the real exit.
    let err = api.remove(RemoveRequest::new(&dir)).unwrap_err();
    match err {
        Error::ExecutionFailed(failure) => {
            assert_eq!(failure.code, Some(1));
            assert!(!failure.stderr.is_empty());
        }
        other => panic!("expected ExecutionFailed, got {other:?}"),
    }
    assert!(dir.is_dir());

    api.remove(RemoveRequest::new(&dir).with_recursive(true))
        .unwrap();
    assert!(!dir.exists());
}

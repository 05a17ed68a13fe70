use std::collections::BTreeMap;
use std::os::unix::fs::MetadataExt;
use std::path::PathBuf;

use gantry::policy::{Credentials, Policy};
use gantry::types::{ChownRequest, Error, IdentityRecord, OwnerSpec};
use gantry::Gantry;

use crate::common::{with_temp_root, RecordingRunner, ScriptedProbe, StubLocator, TestAudit, TestEmitter};

fn engine(runner: &RecordingRunner) -> (Gantry<TestEmitter, TestAudit>, TestEmitter) {
    let facts = TestEmitter::default();
    let api = Gantry::new(facts.clone(), TestAudit, Policy::default())
        .with_runner(Box::new(runner.clone()))
        .with_locator(Box::new(StubLocator::none()));
    (api, facts)
}

fn record(user: &str, uid: u32, group: &str, gid: u32) -> IdentityRecord {
    IdentityRecord {
        uid,
        user: user.to_string(),
        gid,
        group: group.to_string(),
        groups: BTreeMap::from([(group.to_string(), gid)]),
        gecos: String::new(),
        home: PathBuf::from("/"),
        shell: PathBuf::from("/bin/sh"),
    }
}

#[test]
fn numeric_owner_matching_the_file_is_a_skip() {
    let td = with_temp_root();
    let target = td.path().join("subject");
    std::fs::write(&target, b"x").unwrap();
    let md = std::fs::metadata(&target).unwrap();
    let runner = RecordingRunner::new();
    let (api, facts) = engine(&runner);

    api.chown(ChownRequest::new(
        &target,
        OwnerSpec::names(format!("{}:{}", md.uid(), md.gid())),
    ))
    .unwrap();

    assert!(runner.calls().is_empty());
    let events = facts.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].1, "mutate.skip");
    assert_eq!(events[0].3.get("reason").unwrap(), "owner_match");
}

#[test]
fn resolved_records_compare_ids_too() {
    let td = with_temp_root();
    let target = td.path().join("subject");
    std::fs::write(&target, b"x").unwrap();
    let md = std::fs::metadata(&target).unwrap();
    let runner = RecordingRunner::new();
    let (api, facts) = engine(&runner);

    // Same ids as the file: nothing to do.
    api.chown(ChownRequest::new(
        &target,
        record("me", md.uid(), "mine", md.gid()),
    ))
    .unwrap();
    assert!(runner.calls().is_empty());
    assert_eq!(facts.events()[0].3.get("reason").unwrap(), "owner_match");

    // Different uid: the command runs with the record's names.
    api.chown(ChownRequest::new(
        &target,
        record("svc", md.uid() + 1, "svc", md.gid()),
    ))
    .unwrap();
    let calls = runner.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0], ["chown", "svc:svc", target.to_str().unwrap()]);
}

#[test]
fn name_owners_cannot_be_compared_and_always_run() {
    let td = with_temp_root();
    let target = td.path().join("subject");
    std::fs::write(&target, b"x").unwrap();
    let runner = RecordingRunner::new();
    let (api, _facts) = engine(&runner);

    api.chown(ChownRequest::new(&target, OwnerSpec::names("root:root")))
        .unwrap();

    let calls = runner.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0], ["chown", "root:root", target.to_str().unwrap()]);
}

#[test]
fn recursive_requests_always_run_with_the_flag() {
    let td = with_temp_root();
    let target = td.path().join("tree");
    std::fs::create_dir(&target).unwrap();
    let md = std::fs::metadata(&target).unwrap();
    let runner = RecordingRunner::new();
    let (api, _facts) = engine(&runner);

    // Matching ids would skip flat, but recursion cannot be verified cheaply.
    api.chown(
        ChownRequest::new(&target, OwnerSpec::names(format!("{}:{}", md.uid(), md.gid())))
            .with_recursive(true),
    )
    .unwrap();

    let calls = runner.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0][..2], ["chown", "-R"]);
}

#[test]
fn owner_without_separator_is_rejected_locally() {
    let td = with_temp_root();
    let target = td.path().join("subject");
    std::fs::write(&target, b"x").unwrap();
    let runner = RecordingRunner::new();
    let (api, _facts) = engine(&runner);

    let err = api
        .chown(ChownRequest::new(&target, OwnerSpec::names("justauser")))
        .unwrap_err();

    assert!(matches!(err, Error::InvalidArgument(_)));
    assert!(runner.calls().is_empty());
}

#[test]
fn missing_path_errs_unless_tolerated() {
    let td = with_temp_root();
    let ghost = td.path().join("ghost");
    let runner = RecordingRunner::new();
    let (api, _facts) = engine(&runner);

    let err = api
        .chown(ChownRequest::new(&ghost, OwnerSpec::names("root:root")))
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));

    api.chown(
        ChownRequest::new(&ghost, OwnerSpec::names("root:root")).with_missing_ok(true),
    )
    .unwrap();
    assert!(runner.calls().is_empty());
}

#[test]
fn ownership_changes_escalate_without_probing() {
    let td = with_temp_root();
    let target = td.path().join("subject");
    std::fs::write(&target, b"x").unwrap();
    let runner = RecordingRunner::new();
    let probe = ScriptedProbe::new();
    let api = Gantry::new(TestEmitter::default(), TestAudit, Policy::default())
        .with_runner(Box::new(runner.clone()))
        .with_locator(Box::new(StubLocator::with("sudo", "/usr/bin/sudo")))
        .with_probe(Box::new(probe.clone()))
        .with_credentials(Credentials::new(1000, 1000));

    api.chown(ChownRequest::new(&target, OwnerSpec::names("root:root")))
        .unwrap();

    assert!(probe.probed().is_empty());
    let calls = runner.calls();
    assert_eq!(
        calls[0],
        ["/usr/bin/sudo", "chown", "root:root", target.to_str().unwrap()]
    );
}

use std::collections::BTreeMap;
use std::os::unix::fs::{MetadataExt, PermissionsExt};
use std::path::PathBuf;

use gantry::policy::Policy;
use gantry::types::{Error, IdBit, IdentityRecord, SetIdRequest};
use gantry::Gantry;

use crate::common::{with_temp_root, RecordingRunner, StubLocator, TestAudit, TestEmitter};

fn engine(runner: &RecordingRunner) -> (Gantry<TestEmitter, TestAudit>, TestEmitter) {
    let facts = TestEmitter::default();
    let api = Gantry::new(facts.clone(), TestAudit, Policy::default())
        .with_runner(Box::new(runner.clone()))
        .with_locator(Box::new(StubLocator::none()));
    (api, facts)
}

fn tool(dir: &std::path::Path, mode: u32) -> PathBuf {
    let p = dir.join("tool");
    std::fs::write(&p, b"#!/bin/sh\nexit 0\n").unwrap();
    std::fs::set_permissions(&p, std::fs::Permissions::from_mode(mode)).unwrap();
    p
}

#[test]
fn promotion_in_place_chains_chown_and_chmod() {
    let td = with_temp_root();
    let target = tool(td.path(), 0o755);
    let runner = RecordingRunner::new();
    let (api, _facts) = engine(&runner);

    let got = api.set_id(SetIdRequest::new(&target, IdBit::SetUid)).unwrap();

    assert_eq!(got, target);
    let calls = runner.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0][..2], ["sh", "-c"]);
    let script = &calls[0][2];
    assert!(script.starts_with("chown '0:0'"), "script: {script}");
    assert!(script.contains(" && chmod u+s,+x "), "script: {script}");
}

#[test]
fn sibling_copy_is_made_before_promotion() {
    let td = with_temp_root();
    let source = tool(td.path(), 0o755);
    let target = td.path().join("rtool");
    let runner = RecordingRunner::new();
    let (api, facts) = engine(&runner);

    let got = api
        .set_id(SetIdRequest::new(&source, IdBit::SetUid).with_copy_as("rtool"))
        .unwrap();

    assert_eq!(got, target);
    let calls = runner.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(
        calls[0],
        ["cp", "-P", source.to_str().unwrap(), target.to_str().unwrap()]
    );
    assert_eq!(calls[1][..2], ["sh", "-c"]);
    let attempt = &facts.events()[0];
    assert_eq!(attempt.1, "mutate.attempt");
    assert_eq!(attempt.3.get("copying").unwrap(), &serde_json::json!(true));
}

#[test]
fn identical_existing_copy_skips_the_cp() {
    let td = with_temp_root();
    let source = tool(td.path(), 0o755);
    let target = td.path().join("rtool");
    std::fs::copy(&source, &target).unwrap();
    let runner = RecordingRunner::new();
    let (api, facts) = engine(&runner);

    api.set_id(SetIdRequest::new(&source, IdBit::SetUid).with_copy_as("rtool"))
        .unwrap();

    let calls = runner.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0][..2], ["sh", "-c"]);
    let attempt = &facts.events()[0];
    assert_eq!(attempt.3.get("copying").unwrap(), &serde_json::json!(false));
}

#[test]
fn promoted_target_with_right_owner_is_a_skip() {
    let td = with_temp_root();
    let target = tool(td.path(), 0o4755);
    let md = std::fs::metadata(&target).unwrap();
    let owner = IdentityRecord {
        uid: md.uid(),
        user: "me".to_string(),
        gid: md.gid(),
        group: "mine".to_string(),
        groups: BTreeMap::from([("mine".to_string(), md.gid())]),
        gecos: String::new(),
        home: PathBuf::from("/"),
        shell: PathBuf::from("/bin/sh"),
    };
    let runner = RecordingRunner::new();
    let (api, facts) = engine(&runner);

    api.set_id(SetIdRequest::new(&target, IdBit::SetUid).with_owner(owner))
        .unwrap();

    assert!(runner.calls().is_empty());
    let events = facts.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].1, "mutate.skip");
    assert_eq!(events[0].3.get("reason").unwrap(), "already_promoted");
}

#[test]
fn wrong_owner_forces_the_promotion_again() {
    let td = with_temp_root();
    // Bits are present but the file belongs to someone other than the
    // identity the bit should impersonate.
    let target = tool(td.path(), 0o4755);
    let md = std::fs::metadata(&target).unwrap();
    let owner = IdentityRecord {
        uid: md.uid() + 1,
        user: "svc".to_string(),
        gid: md.gid(),
        group: "svc".to_string(),
        groups: BTreeMap::from([("svc".to_string(), md.gid())]),
        gecos: String::new(),
        home: PathBuf::from("/"),
        shell: PathBuf::from("/bin/sh"),
    };
    let runner = RecordingRunner::new();
    let (api, _facts) = engine(&runner);

    api.set_id(SetIdRequest::new(&target, IdBit::SetUid).with_owner(owner))
        .unwrap();

    let calls = runner.calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0][2].starts_with("chown 'svc:svc'"));
}

#[test]
fn setgid_uses_its_own_clause() {
    let td = with_temp_root();
    let target = tool(td.path(), 0o755);
    let runner = RecordingRunner::new();
    let (api, _facts) = engine(&runner);

    api.set_id(SetIdRequest::new(&target, IdBit::SetGid)).unwrap();

    let script = &runner.calls()[0][2];
    assert!(script.contains(" && chmod g+s,+x "), "script: {script}");
}

#[test]
fn missing_source_is_not_found() {
    let td = with_temp_root();
    let runner = RecordingRunner::new();
    let (api, _facts) = engine(&runner);

    let err = api
        .set_id(SetIdRequest::new(td.path().join("ghost"), IdBit::SetUid))
        .unwrap_err();

    assert!(matches!(err, Error::NotFound(_)));
    assert!(runner.calls().is_empty());
}

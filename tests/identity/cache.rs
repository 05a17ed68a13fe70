use std::os::unix::fs::MetadataExt;
use std::path::PathBuf;
use std::sync::Arc;

use serial_test::serial;

use gantry::adapters::EtcSource;
use gantry::policy::Policy;
use gantry::types::Error;
use gantry::Gantry;

use crate::common::{with_temp_root, StubLocator, TestAudit, TestEmitter};

/// Write a passwd/group pair naming the calling account "me" plus a
/// service account, and return the source reading them.
fn fixture(dir: &std::path::Path) -> (EtcSource, u32, u32) {
    let marker = dir.join("marker");
    std::fs::write(&marker, b"x").unwrap();
    let md = std::fs::metadata(&marker).unwrap();
    let (uid, gid) = (md.uid(), md.gid());

    let passwd = dir.join("passwd");
    let group = dir.join("group");
    std::fs::write(
        &passwd,
        format!("me:x:{uid}:{gid}:Caller:/home/me:/bin/sh\nsvc:x:7777:7777:Service:/srv:/bin/sh\n"),
    )
    .unwrap();
    std::fs::write(&group, format!("mine:x:{gid}:\nsvc:x:7777:\nops:x:90:me,svc\n")).unwrap();
    (EtcSource::with_files(passwd, group), uid, gid)
}

fn engine(source: EtcSource) -> Gantry<TestEmitter, TestAudit> {
    Gantry::new(TestEmitter::default(), TestAudit, Policy::default())
        .with_locator(Box::new(StubLocator::none()))
        .with_identity_source(Box::new(source))
}

#[test]
fn lookups_share_one_cached_record() {
    let td = with_temp_root();
    let (source, _, _) = fixture(td.path());
    let api = engine(source);

    let by_name = api.identity().lookup_user("svc").unwrap();
    let by_uid = api.identity().lookup_uid(7777).unwrap();
    assert!(Arc::ptr_eq(&by_name, &by_uid));
    assert_eq!(by_uid.user, "svc");
    assert_eq!(by_uid.group, "svc");
}

#[test]
fn the_effective_account_resolves_from_the_source() {
    let td = with_temp_root();
    let (source, uid, gid) = fixture(td.path());
    let api = engine(source);

    let me = api.identity().effective().unwrap();
    assert_eq!(me.uid, uid);
    assert_eq!(me.gid, gid);
    assert_eq!(me.user, "me");
    assert_eq!(me.home, PathBuf::from("/home/me"));
    assert!(me.is_member_of("ops"));
}

#[test]
#[serial]
fn sudo_caller_follows_the_environment_trace() {
    let td = with_temp_root();
    let (source, _, _) = fixture(td.path());
    let api = engine(source);

    std::env::set_var("SUDO_UID", "7777");
    let caller = api.identity().sudo_caller().unwrap();
    std::env::remove_var("SUDO_UID");
    assert_eq!(caller.user, "svc");
}

#[test]
fn unknown_accounts_are_not_found() {
    let td = with_temp_root();
    let (source, _, _) = fixture(td.path());
    let api = engine(source);

    assert!(matches!(
        api.identity().lookup_user("ghost"),
        Err(Error::NotFound(_))
    ));
    assert!(matches!(
        api.identity().lookup_uid(424_242),
        Err(Error::NotFound(_))
    ));
}

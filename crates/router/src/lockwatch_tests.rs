// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use taskbus_core::FakeClock;
use taskbus_storage::list_outbox;
use tempfile::tempdir;

#[test]
fn pure_numeric_pid_is_not_broken() {
    let tmp = tempdir().unwrap();
    let pid_path = tmp.path().join("pid");
    std::fs::write(&pid_path, "12345").unwrap();
    assert!(!confirm_global_lock_pid_broken(&pid_path));
}

#[test]
fn non_numeric_pid_bytes_are_broken() {
    let tmp = tempdir().unwrap();
    let pid_path = tmp.path().join("pid");
    std::fs::write(&pid_path, "not-a-pid").unwrap();
    assert!(confirm_global_lock_pid_broken(&pid_path));
}

#[test]
fn missing_pid_file_is_broken() {
    let tmp = tempdir().unwrap();
    let pid_path = tmp.path().join("pid");
    assert!(confirm_global_lock_pid_broken(&pid_path));
}

#[test]
fn a_directory_named_pid_is_broken() {
    let tmp = tempdir().unwrap();
    let pid_path = tmp.path().join("pid");
    std::fs::create_dir(&pid_path).unwrap();
    assert!(confirm_global_lock_pid_broken(&pid_path));
}

#[test]
fn matches_only_einval_on_a_pid_path() {
    let other_err = io::Error::other("denied");
    let einval = io::Error::from_raw_os_error(22);
    assert!(!is_global_lock_pid_einval(Path::new("/x/pid"), &other_err));
    assert!(is_global_lock_pid_einval(Path::new("/x/pid"), &einval));
    assert!(!is_global_lock_pid_einval(Path::new("/x/lockdir"), &einval));
}

#[test]
fn quarantines_the_lock_dir_and_writes_a_warn_receipt() {
    let tmp = tempdir().unwrap();
    let paths = SessionPaths::new(tmp.path());
    std::fs::create_dir_all(paths.global_lockdir()).unwrap();
    std::fs::write(paths.global_lockdir().join("pid"), "garbage").unwrap();

    let mut ring = DiagnosticRing::new();
    ring.push("create_dir autopilot.global.lockdir failed: EINVAL");
    let clock = FakeClock::new();

    quarantine_global_lock(&paths, &clock, &ring).unwrap();

    assert!(!paths.global_lockdir().exists());
    let bad_locks = std::fs::read_dir(paths.router_bad_locks_dir()).unwrap().count();
    assert_eq!(bad_locks, 1);

    let outbox = list_outbox(&paths).unwrap();
    assert_eq!(outbox.len(), 1);
}

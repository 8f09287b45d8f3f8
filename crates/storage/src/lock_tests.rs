// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn acquire_then_release_allows_reacquire() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let lock_dir = tmp.path().join("x.lockdir");
    let stale = tmp.path().join("_stale");
    {
        let guard = acquire(&lock_dir, &stale, Duration::from_millis(200), Duration::from_secs(3600))
            .expect("first acquire");
        assert!(lock_dir.join("pid").exists());
        drop(guard);
    }
    assert!(!lock_dir.exists());
    let _guard = acquire(&lock_dir, &stale, Duration::from_millis(200), Duration::from_secs(3600))
        .expect("second acquire after release");
}

#[test]
fn concurrent_acquire_times_out() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let lock_dir = tmp.path().join("x.lockdir");
    let stale = tmp.path().join("_stale");
    let _held = acquire(&lock_dir, &stale, Duration::from_millis(200), Duration::from_secs(3600))
        .expect("first acquire");
    let result = acquire(&lock_dir, &stale, Duration::from_millis(150), Duration::from_secs(3600));
    assert!(matches!(result, Err(LockError::Timeout { .. })));
}

#[test]
fn stale_lock_with_dead_pid_is_reclaimed() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let lock_dir = tmp.path().join("x.lockdir");
    let stale = tmp.path().join("_stale");
    fs::create_dir_all(&lock_dir).expect("mkdir");
    // A pid astronomically unlikely to be alive in any container.
    fs::write(lock_dir.join("pid"), "2147483000").expect("write pid");

    let guard = acquire(&lock_dir, &stale, Duration::from_millis(500), Duration::from_secs(999_999))
        .expect("reclaim stale lock");
    assert_eq!(
        fs::read_to_string(lock_dir.join("pid")).expect("pid"),
        std::process::id().to_string()
    );
    drop(guard);
}

#[test]
fn lock_with_nonnumeric_pid_is_stale() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let lock_dir = tmp.path().join("x.lockdir");
    let stale = tmp.path().join("_stale");
    fs::create_dir_all(&lock_dir).expect("mkdir");
    fs::write(lock_dir.join("pid"), "not-a-pid").expect("write pid");

    let _guard = acquire(&lock_dir, &stale, Duration::from_millis(500), Duration::from_secs(999_999))
        .expect("reclaim malformed lock");
}

#[test]
fn empty_lockdir_with_no_pid_file_is_stale() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let lock_dir = tmp.path().join("x.lockdir");
    let stale = tmp.path().join("_stale");
    fs::create_dir_all(&lock_dir).expect("mkdir");

    let _guard = acquire(&lock_dir, &stale, Duration::from_millis(500), Duration::from_secs(999_999))
        .expect("reclaim lockdir missing pid file");
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Directory-mutex primitive (spec §4.1 C2).
//!
//! Ported from `task_board.py`'s `DirLock`/`_cleanup_lockdir` and reused
//! for the task-board lock, per-message processing locks, and the
//! global serialization lock — one mechanism, three stale thresholds
//! and timeouts supplied by the caller.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use nix::errno::Errno;
use nix::sys::signal::kill;
use nix::unistd::Pid;

use taskbus_core::LockError;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// A held directory lock. Releases (deletes `pid` then the directory)
/// on drop.
pub struct DirLockGuard {
    lock_dir: PathBuf,
    stale_root: PathBuf,
}

impl DirLockGuard {
    pub fn path(&self) -> &Path {
        &self.lock_dir
    }
}

impl Drop for DirLockGuard {
    fn drop(&mut self) {
        cleanup_lockdir(&self.lock_dir, &self.stale_root);
    }
}

/// Acquire the lock directory at `lock_dir`, reclaiming it if it is
/// stale, polling every ~100ms until `timeout` elapses.
pub fn acquire(
    lock_dir: impl Into<PathBuf>,
    stale_root: impl Into<PathBuf>,
    timeout: Duration,
    stale_after: Duration,
) -> Result<DirLockGuard, LockError> {
    let lock_dir = lock_dir.into();
    let stale_root = stale_root.into();
    if let Some(parent) = lock_dir.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let _ = fs::create_dir_all(&stale_root);

    let started = Instant::now();
    loop {
        match fs::create_dir(&lock_dir) {
            Ok(()) => {
                let pid_path = lock_dir.join("pid");
                fs::write(&pid_path, std::process::id().to_string()).map_err(|source| {
                    LockError::Io { path: lock_dir.display().to_string(), source }
                })?;
                return Ok(DirLockGuard { lock_dir, stale_root });
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                if is_stale(&lock_dir, stale_after) {
                    cleanup_lockdir(&lock_dir, &stale_root);
                    continue;
                }
                if started.elapsed() > timeout {
                    return Err(LockError::Timeout { path: lock_dir.display().to_string() });
                }
                std::thread::sleep(POLL_INTERVAL);
            }
            Err(source) => {
                return Err(LockError::Io { path: lock_dir.display().to_string(), source })
            }
        }
    }
}

fn read_lock_pid(lock_dir: &Path) -> Option<i32> {
    let pid_path = lock_dir.join("pid");
    let meta = fs::symlink_metadata(&pid_path).ok()?;
    if !meta.is_file() {
        return None;
    }
    let raw = fs::read_to_string(&pid_path).ok()?;
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    raw.parse().ok()
}

fn pid_alive(pid: i32) -> bool {
    match kill(Pid::from_raw(pid), None) {
        Ok(()) => true,
        Err(Errno::ESRCH) => false,
        // EPERM and anything else: the process exists, we just can't signal it.
        Err(_) => true,
    }
}

fn lock_age(lock_dir: &Path) -> Duration {
    fs::metadata(lock_dir)
        .and_then(|m| m.modified())
        .ok()
        .and_then(|mtime| SystemTime::now().duration_since(mtime).ok())
        .unwrap_or(Duration::MAX)
}

fn is_stale(lock_dir: &Path, stale_after: Duration) -> bool {
    match read_lock_pid(lock_dir) {
        Some(pid) if pid > 0 => !pid_alive(pid) || lock_age(lock_dir) >= stale_after,
        _ => true,
    }
}

/// Remove `pid`, then the directory; on `rmdir` failure quarantine into
/// `stale_root`; on rename failure, recursively remove as a last resort.
fn cleanup_lockdir(lock_dir: &Path, stale_root: &Path) {
    if !lock_dir.exists() {
        return;
    }
    let pid_path = lock_dir.join("pid");
    if let Ok(meta) = fs::symlink_metadata(&pid_path) {
        if meta.is_file() {
            let _ = fs::remove_file(&pid_path);
        }
    }
    if fs::remove_dir(lock_dir).is_ok() {
        return;
    }
    let _ = fs::create_dir_all(stale_root);
    let ts = SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0);
    let name = lock_dir.file_name().and_then(|n| n.to_str()).unwrap_or("lockdir");
    let target = stale_root.join(format!("{name}.{ts}.{}", std::process::id()));
    if fs::rename(lock_dir, &target).is_ok() {
        return;
    }
    let _ = fs::remove_dir_all(lock_dir);
}

#[cfg(test)]
#[path = "lock_tests.rs"]
mod tests;

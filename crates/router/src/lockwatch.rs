// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errno-22 (invalid argument) handling for the global serialization
//! lock's pid file (spec §4.5 "Errno-22" paragraph).
//!
//! Corruption of `artifacts/locks/autopilot.global.lockdir/pid` has been
//! observed to cause cascading lock acquisition failures across every
//! worker; this module isolates it so the rest of the session keeps
//! making progress.

use std::fs;
use std::io;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use taskbus_core::{Clock, Intent, MessageId, Receipt, ReceiptStatus, Risk, Role};
use taskbus_storage::{write_receipt, SessionPaths};

use crate::diagnostics::DiagnosticRing;
use crate::error::RouterError;

/// Whether `io_error` is the specific EINVAL failure this paragraph
/// names: a filesystem call against `.../autopilot.global.lockdir/pid`.
pub fn is_global_lock_pid_einval(path: &Path, io_error: &io::Error) -> bool {
    io_error.raw_os_error() == Some(22) && path.file_name().map(|n| n == "pid").unwrap_or(false)
}

/// Probe the pid file itself: broken if it is not a regular file, is
/// not a pure numeric string of 1-20 characters, or cannot be read.
///
/// Named explicitly (`confirm_global_lock_pid_broken`) so it is
/// unit-testable against the documented scenario independent of any
/// particular syscall failure.
pub fn confirm_global_lock_pid_broken(pid_path: &Path) -> bool {
    let meta = match fs::symlink_metadata(pid_path) {
        Ok(meta) => meta,
        Err(_) => return true,
    };
    if !meta.is_file() {
        return true;
    }
    let raw = match fs::read_to_string(pid_path) {
        Ok(raw) => raw,
        Err(_) => return true,
    };
    let raw = raw.trim();
    if raw.is_empty() || raw.len() > 20 || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return true;
    }
    false
}

/// Quarantine the entire global lock directory: atomic rename into
/// `state/router/bad-locks/<ts>-<name>` (fallback to copy+remove), then
/// write a diagnostic `warn` receipt carrying the recent-operations
/// ring buffer. The receipt's `request_from` is `"router"` so it is
/// never re-forwarded (loop prevention, spec §4.5 step 3).
pub fn quarantine_global_lock(
    paths: &SessionPaths,
    clock: &impl Clock,
    ring: &DiagnosticRing,
) -> Result<(), RouterError> {
    let lock_dir = paths.global_lockdir();
    if lock_dir.exists() {
        let dest_dir = paths.router_bad_locks_dir();
        fs::create_dir_all(&dest_dir)
            .map_err(|source| RouterError::Io { path: dest_dir.display().to_string(), source })?;
        let ts = SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0);
        let name = lock_dir.file_name().and_then(|n| n.to_str()).unwrap_or("autopilot.global.lockdir");
        let dest = dest_dir.join(format!("{ts}-{name}"));
        if fs::rename(&lock_dir, &dest).is_err() {
            copy_dir_then_remove(&lock_dir, &dest)
                .map_err(|source| RouterError::Io { path: dest.display().to_string(), source })?;
        }
    }

    let receipt = Receipt {
        id: MessageId::new(),
        role: Role::new("router"),
        thread: "main".to_string(),
        request_from: Role::new("router"),
        request_to: Role::lead(),
        request_intent: Intent::Info,
        task_id: None,
        status: ReceiptStatus::Warn,
        codex_rc: 0,
        finished_at: taskbus_core::time_fmt::now_rfc3339(clock),
        body: format!(
            "global lock pid file was broken; quarantined the lock directory.\n\nrecent operations:\n{}",
            ring.render()
        ),
    };
    write_receipt(paths, &receipt)?;
    Ok(())
}

fn copy_dir_then_remove(from: &Path, to: &Path) -> io::Result<()> {
    fs::create_dir_all(to)?;
    for entry in fs::read_dir(from)? {
        let entry = entry?;
        let target = to.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir_then_remove(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    fs::remove_dir_all(from)
}

#[cfg(test)]
#[path = "lockwatch_tests.rs"]
mod tests;

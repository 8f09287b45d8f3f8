// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `artifacts/autopilot/pids.txt`, atomically rewritten on every spawn
//! (spec §4.6, §6).

use taskbus_storage::{atomic_write, SessionPaths};

use crate::child::ManagedChild;
use crate::error::DaemonError;

/// One `<name> <pid>` line per currently-managed child.
pub fn write_pids(paths: &SessionPaths, children: &[ManagedChild]) -> Result<(), DaemonError> {
    let text: String = children.iter().map(|c| format!("{} {}\n", c.name, c.pid())).collect();
    let path = paths.pids_file();
    atomic_write(&path, &text).map_err(|source| DaemonError::Io { path: path.display().to_string(), source })
}

#[cfg(test)]
#[path = "pidfile_tests.rs"]
mod tests;

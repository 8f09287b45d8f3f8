// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One supervised child process: Router or a single role's Worker (spec
//! §4.6). Each child's stdout/stderr is appended to its own log file
//! under `artifacts/autopilot/<name>.log`.

use std::fs::OpenOptions;
use std::path::Path;
use std::process::{Child, Command, Stdio};

use crate::error::DaemonError;

pub struct ManagedChild {
    pub name: String,
    child: Child,
}

impl ManagedChild {
    pub fn pid(&self) -> u32 {
        self.child.id()
    }

    /// Non-blocking exit check; `Ok(None)` means still running.
    pub fn try_wait(&mut self) -> std::io::Result<Option<std::process::ExitStatus>> {
        self.child.try_wait()
    }

    pub fn kill(&mut self) -> std::io::Result<()> {
        self.child.kill()
    }
}

/// Spawn `exe name args...` with stdout/stderr appended to `log_path`.
pub fn spawn_child(
    exe: &Path,
    name: &str,
    args: &[String],
    log_path: &Path,
    extra_env: &[(&str, String)],
) -> Result<ManagedChild, DaemonError> {
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| DaemonError::Io { path: parent.display().to_string(), source })?;
    }
    let stdout_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .map_err(|source| DaemonError::Io { path: log_path.display().to_string(), source })?;
    let stderr_file = stdout_file
        .try_clone()
        .map_err(|source| DaemonError::Io { path: log_path.display().to_string(), source })?;

    let mut cmd = Command::new(exe);
    cmd.args(args).stdout(Stdio::from(stdout_file)).stderr(Stdio::from(stderr_file));
    for (key, value) in extra_env {
        cmd.env(key, value);
    }

    let child = cmd.spawn().map_err(|source| DaemonError::Spawn { name: name.to_string(), source })?;
    Ok(ManagedChild { name: name.to_string(), child })
}

#[cfg(test)]
#[path = "child_tests.rs"]
mod tests;

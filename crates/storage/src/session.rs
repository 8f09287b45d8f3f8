// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The on-disk session directory contract (spec §2 C1, §6).
//!
//! `SessionPaths` is constructed once at process start and passed into
//! every operation, replacing the original prototype's module-global
//! path variables (per `spec.md` §9's re-architecture guidance).

use std::path::{Path, PathBuf};

use taskbus_core::Role;

/// Resolved path layout for one session rooted at `<repo>/sessions/<sid>/`.
#[derive(Debug, Clone)]
pub struct SessionPaths {
    root: PathBuf,
}

impl SessionPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn session_md(&self) -> PathBuf {
        self.root.join("SESSION.md")
    }

    pub fn shared_task_md(&self) -> PathBuf {
        self.root.join("shared").join("task.md")
    }

    pub fn role_prompt(&self, role: &Role) -> PathBuf {
        self.root.join("roles").join(role.as_str()).join("prompt.md")
    }

    /// Every role directory present under `roles/`, in no particular
    /// order; callers apply [`taskbus_core::sort_roles`] themselves.
    pub fn discover_roles(&self) -> std::io::Result<Vec<Role>> {
        let dir = self.root.join("roles");
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut roles = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                if let Some(name) = entry.file_name().to_str() {
                    roles.push(Role::new(name));
                }
            }
        }
        Ok(roles)
    }

    pub fn inbox_dir(&self, role: &Role) -> PathBuf {
        self.root.join("bus").join("inbox").join(role.as_str())
    }

    pub fn inbox_message(&self, role: &Role, message_id: &str) -> PathBuf {
        self.inbox_dir(role).join(format!("{message_id}.md"))
    }

    pub fn outbox_dir(&self) -> PathBuf {
        self.root.join("bus").join("outbox")
    }

    pub fn outbox_receipt(&self, message_id: &str, role: &Role) -> PathBuf {
        self.outbox_dir().join(format!("{message_id}.{role}.md"))
    }

    pub fn deadletter_dir(&self, role: &Role) -> PathBuf {
        self.root.join("bus").join("deadletter").join(role.as_str())
    }

    pub fn deadletter_message(&self, role: &Role, message_id: &str) -> PathBuf {
        self.deadletter_dir(role).join(format!("{message_id}.md"))
    }

    pub fn processing_dir(&self) -> PathBuf {
        self.root.join("state").join("processing")
    }

    pub fn processing_lockdir(&self, message_id: &str, role: &Role) -> PathBuf {
        self.processing_dir().join(format!("{message_id}.{role}.lockdir"))
    }

    pub fn processing_retries(&self, message_id: &str, role: &Role) -> PathBuf {
        self.processing_dir().join(format!("{message_id}.{role}.retries.json"))
    }

    pub fn processing_stale_dir(&self) -> PathBuf {
        self.processing_dir().join("_stale_lockdirs")
    }

    pub fn done_dir(&self) -> PathBuf {
        self.root.join("state").join("done")
    }

    pub fn done_sentinel(&self, message_id: &str, role: &Role) -> PathBuf {
        self.done_dir().join(format!("{message_id}.{role}.ok"))
    }

    pub fn archive_dir(&self, role: &Role) -> PathBuf {
        self.root.join("state").join("archive").join(role.as_str())
    }

    pub fn archive_message(&self, role: &Role, message_id: &str) -> PathBuf {
        self.archive_dir(role).join(format!("{message_id}.md"))
    }

    pub fn tasks_dir(&self) -> PathBuf {
        self.root.join("state").join("tasks")
    }

    pub fn tasks_file(&self) -> PathBuf {
        self.tasks_dir().join("tasks.json")
    }

    pub fn tasks_lockdir(&self) -> PathBuf {
        self.tasks_dir().join("tasks.lockdir")
    }

    pub fn tasks_stale_dir(&self) -> PathBuf {
        self.tasks_dir().join("_stale_lockdirs")
    }

    pub fn router_processed_dir(&self) -> PathBuf {
        self.root.join("state").join("router").join("processed")
    }

    pub fn router_processed_hash(&self, receipt_file_name: &str) -> PathBuf {
        self.router_processed_dir().join(format!("{receipt_file_name}.sha256"))
    }

    pub fn router_bad_receipts_dir(&self) -> PathBuf {
        self.root.join("state").join("router").join("bad-receipts")
    }

    pub fn router_bad_locks_dir(&self) -> PathBuf {
        self.root.join("state").join("router").join("bad-locks")
    }

    pub fn role_memory(&self, role: &Role) -> PathBuf {
        self.root.join("state").join("memory").join(format!("{role}.md"))
    }

    pub fn global_lockdir(&self) -> PathBuf {
        self.root.join("artifacts").join("locks").join("autopilot.global.lockdir")
    }

    pub fn global_lock_stale_dir(&self) -> PathBuf {
        self.root.join("artifacts").join("locks").join("_stale_lockdirs")
    }

    pub fn component_log(&self, component: &str) -> PathBuf {
        self.root.join("artifacts").join("autopilot").join(format!("{component}.log"))
    }

    pub fn pids_file(&self) -> PathBuf {
        self.root.join("artifacts").join("autopilot").join("pids.txt")
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;

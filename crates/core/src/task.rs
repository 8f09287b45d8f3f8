// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Task Board's unit of work (spec §3, §6 JSON schema).
//!
//! This module defines the data shape only; the state-machine
//! operations (`add_task`, `claim_task`, `set_dispatch`, ...) and their
//! concurrency discipline live in `taskbus-storage::task_board`, which is
//! the single writer of `state/tasks/tasks.json`.

use crate::intent::{Intent, Risk};
use crate::message::MessageId;
use crate::role::Role;

crate::define_id! {
    /// Unique task id: `T<ts>-<rand>` in the original tool; any string fits.
    pub struct TaskId("T-");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

crate::simple_display! {
    TaskStatus {
        Pending => "pending",
        InProgress => "in_progress",
        Completed => "completed",
        Failed => "failed",
    }
}

/// One append-only history entry recorded on every task state change.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct HistoryEntry {
    pub at: String,
    pub action: Action,
    pub by: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Created,
    Dispatched,
    Claimed,
    Completed,
    Failed,
    RetryError,
}

crate::simple_display! {
    Action {
        Created => "created",
        Dispatched => "dispatched",
        Claimed => "claimed",
        Completed => "completed",
        Failed => "failed",
        RetryError => "retry_error",
    }
}

/// Binds a task to the message that dispatched it (spec §3 `dispatch`).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Dispatch {
    pub from: Role,
    pub to: Role,
    pub intent: Intent,
    pub message_id: MessageId,
    pub at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub status: TaskStatus,
    pub owner: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claimed_by: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claimed_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claim_message_id: Option<MessageId>,
    pub work_type: String,
    pub risk: Risk,
    pub intent: Intent,
    #[serde(default)]
    pub acceptance: Vec<String>,
    #[serde(default)]
    pub depends_on: Vec<TaskId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_message_id: Option<MessageId>,
    pub created_by: String,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dispatch: Option<Dispatch>,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
    #[serde(default)]
    pub evidence: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_by: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error_by: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error_at: Option<String>,
}

impl Task {
    /// A task is dispatchable iff all of `depends_on` are `completed`.
    pub fn deps_satisfied(&self, completed: impl Fn(&TaskId) -> bool) -> bool {
        self.depends_on.iter().all(completed)
    }

    /// A fixed-width one-line summary, matching `task_board.py::format_task_brief`.
    pub fn format_brief(&self) -> String {
        format!(
            "{:<26} {:<12} {:<12} {}",
            self.id.as_str(),
            self.status.to_string(),
            self.owner.as_str(),
            self.title
        )
    }

    pub fn push_history(&mut self, action: Action, by: impl Into<String>, note: Option<String>, at: impl Into<String>) {
        self.history.push(HistoryEntry { at: at.into(), action, by: by.into(), note });
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;

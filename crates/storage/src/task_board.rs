// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The durable Task Board (spec §4.3 C4).
//!
//! Single-writer, multi-reader: every mutation acquires the task-board
//! directory lock, reads the JSON snapshot (or a default on corruption),
//! mutates in memory, and atomically rewrites the file before releasing.
//! Readers bypass the lock and may observe a stale snapshot. Ported in
//! meaning from `task_board.py`, whose exact reason strings are
//! preserved as [`TaskOutcomeKind`] variants.

use std::fs;
use std::path::Path;
use std::time::Duration;

use taskbus_core::{
    Action, Clock, Dispatch, HistoryEntry, Intent, Risk, Role, Task, TaskId, TaskOutcomeKind,
    TaskStatus,
};

use crate::config::Config;
use crate::lock;
use crate::session::SessionPaths;

#[derive(Debug, thiserror::Error)]
pub enum TaskBoardError {
    #[error("task board lock: {0}")]
    Lock(#[from] taskbus_core::LockError),
    #[error("io error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("task title must not be empty")]
    EmptyTitle,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Board {
    pub version: u32,
    pub created_at: String,
    pub updated_at: String,
    pub tasks: Vec<Task>,
}

impl Board {
    fn default_at(now: &str) -> Self {
        Self { version: 1, created_at: now.to_string(), updated_at: now.to_string(), tasks: Vec::new() }
    }

    fn index_of(&self, task_id: &TaskId) -> Option<usize> {
        self.tasks.iter().position(|t| &t.id == task_id)
    }
}

fn atomic_write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), TaskBoardError> {
    let text = serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string());
    crate::fsutil::atomic_write(path, &(text + "\n"))
        .map_err(|source| TaskBoardError::Io { path: path.display().to_string(), source })
}

fn read_board(path: &Path, now: &str) -> Board {
    let Ok(text) = fs::read_to_string(path) else {
        return Board::default_at(now);
    };
    serde_json::from_str(&text).unwrap_or_else(|_| Board::default_at(now))
}

/// Create `state/tasks/tasks.json` with an empty board if it is absent.
pub fn ensure_task_board(paths: &SessionPaths, clock: &impl Clock) -> Result<(), TaskBoardError> {
    let file = paths.tasks_file();
    if file.exists() {
        return Ok(());
    }
    let now = taskbus_core::time_fmt::now_rfc3339(clock);
    atomic_write_json(&file, &Board::default_at(&now))
}

fn with_board_lock<R>(
    paths: &SessionPaths,
    cfg: &Config,
    clock: &impl Clock,
    mutate: impl FnOnce(&mut Board) -> (R, bool),
) -> Result<R, TaskBoardError> {
    ensure_task_board(paths, clock)?;
    let _guard = lock::acquire(
        paths.tasks_lockdir(),
        paths.tasks_stale_dir(),
        cfg.task_board_lock_timeout,
        cfg.task_board_lock_stale_after,
    )?;
    let now = taskbus_core::time_fmt::now_rfc3339(clock);
    let mut board = read_board(&paths.tasks_file(), &now);
    let (result, changed) = mutate(&mut board);
    if changed {
        board.updated_at = now;
        atomic_write_json(&paths.tasks_file(), &board)?;
    }
    Ok(result)
}

fn deps_satisfied(board: &Board, task: &Task) -> (bool, Vec<String>) {
    let mut missing = Vec::new();
    for dep in &task.depends_on {
        let ok = board
            .tasks
            .iter()
            .any(|t| &t.id == dep && t.status == TaskStatus::Completed);
        if !ok {
            missing.push(dep.as_str().to_string());
        }
    }
    (missing.is_empty(), missing)
}

fn sorted_indices(board: &Board) -> Vec<usize> {
    let mut idx: Vec<usize> = (0..board.tasks.len()).collect();
    idx.sort_by(|&a, &b| {
        (board.tasks[a].created_at.as_str(), board.tasks[a].id.as_str())
            .cmp(&(board.tasks[b].created_at.as_str(), board.tasks[b].id.as_str()))
    });
    idx
}

#[allow(clippy::too_many_arguments)]
pub fn add_task(
    paths: &SessionPaths,
    cfg: &Config,
    clock: &impl Clock,
    title: &str,
    owner: Option<&Role>,
    work_type: &str,
    risk: Risk,
    acceptance: Vec<String>,
    depends_on: Vec<TaskId>,
    intent: Intent,
    created_by: &str,
    source_message_id: Option<String>,
) -> Result<Task, TaskBoardError> {
    if title.trim().is_empty() {
        return Err(TaskBoardError::EmptyTitle);
    }
    with_board_lock(paths, cfg, clock, |board| {
        let now = taskbus_core::time_fmt::now_rfc3339(clock);
        let mut task = Task {
            id: TaskId::new(),
            title: title.to_string(),
            status: TaskStatus::Pending,
            owner: owner.cloned().unwrap_or_else(|| Role::new("")),
            claimed_by: None,
            claimed_at: None,
            claim_message_id: None,
            work_type: work_type.to_string(),
            risk,
            intent,
            acceptance,
            depends_on,
            source_message_id: source_message_id.map(taskbus_core::MessageId::from_string),
            created_by: created_by.to_string(),
            created_at: now.clone(),
            updated_at: now.clone(),
            dispatch: None,
            history: Vec::new(),
            evidence: Vec::new(),
            completed_by: None,
            completed_at: None,
            receipt_file: None,
            last_error: None,
            last_error_by: None,
            last_error_at: None,
        };
        task.push_history(Action::Created, created_by, None, now);
        board.tasks.push(task.clone());
        (task, true)
    })
}

/// Whether prior dispatch evidence for `message_id` still exists: an
/// inbox file, an archived file, or a done sentinel for any role.
fn dispatch_evidence_exists(paths: &SessionPaths, message_id: &str) -> bool {
    let roles = paths.discover_roles().unwrap_or_default();
    for role in &roles {
        if paths.inbox_message(role, message_id).exists() {
            return true;
        }
        if paths.archive_message(role, message_id).exists() {
            return true;
        }
        if paths.done_sentinel(message_id, role).exists() {
            return true;
        }
    }
    false
}

fn dispatch_is_stale(
    paths: &SessionPaths,
    clock: &impl Clock,
    stale_after: Duration,
    prior: &Dispatch,
) -> bool {
    if dispatch_evidence_exists(paths, prior.message_id.as_str()) {
        return false;
    }
    if stale_after.is_zero() {
        return true;
    }
    match chrono::DateTime::parse_from_rfc3339(&prior.at) {
        Ok(dt) => {
            let age_ms = clock.epoch_ms().saturating_sub(dt.timestamp_millis().max(0) as u64);
            Duration::from_millis(age_ms) >= stale_after
        }
        Err(_) => true,
    }
}

pub fn set_dispatch(
    paths: &SessionPaths,
    cfg: &Config,
    clock: &impl Clock,
    task_id: &TaskId,
    from: &Role,
    to: &Role,
    intent: Intent,
    message_id: &str,
) -> Result<(TaskOutcomeKind, Option<Task>), TaskBoardError> {
    with_board_lock(paths, cfg, clock, |board| {
        let Some(idx) = board.index_of(task_id) else {
            return ((TaskOutcomeKind::NotFound, None), false);
        };
        if let Some(prev) = board.tasks[idx].dispatch.clone() {
            if prev.message_id.as_str() == message_id {
                let task = board.tasks[idx].clone();
                return ((TaskOutcomeKind::AlreadyDispatchedSame, Some(task)), false);
            }
            if !dispatch_is_stale(paths, clock, cfg.dispatch_stale_after, &prev) {
                let task = board.tasks[idx].clone();
                return ((TaskOutcomeKind::AlreadyDispatched, Some(task)), false);
            }
        }
        let now = taskbus_core::time_fmt::now_rfc3339(clock);
        let task = &mut board.tasks[idx];
        task.dispatch = Some(Dispatch {
            from: from.clone(),
            to: to.clone(),
            intent,
            message_id: taskbus_core::MessageId::from_string(message_id),
            at: now.clone(),
        });
        task.updated_at = now.clone();
        task.push_history(Action::Dispatched, from.as_str(), Some(message_id.to_string()), now);
        ((TaskOutcomeKind::Ok, Some(task.clone())), true)
    })
}

pub fn claim_task(
    paths: &SessionPaths,
    cfg: &Config,
    clock: &impl Clock,
    task_id: &TaskId,
    role: &Role,
    message_id: Option<&str>,
) -> Result<(TaskOutcomeKind, Option<Task>), TaskBoardError> {
    with_board_lock(paths, cfg, clock, |board| {
        let Some(idx) = board.index_of(task_id) else {
            return ((TaskOutcomeKind::NotFound, None), false);
        };
        match board.tasks[idx].status {
            TaskStatus::Completed => {
                return ((TaskOutcomeKind::Completed, Some(board.tasks[idx].clone())), false)
            }
            TaskStatus::Failed => {
                return ((TaskOutcomeKind::Failed, Some(board.tasks[idx].clone())), false)
            }
            TaskStatus::InProgress => {
                let task = board.tasks[idx].clone();
                return if task.claimed_by.as_ref() == Some(role) {
                    ((TaskOutcomeKind::AlreadyClaimed, Some(task)), false)
                } else {
                    ((TaskOutcomeKind::ClaimedByOther, Some(task)), false)
                };
            }
            TaskStatus::Pending => {}
        }
        let owner = board.tasks[idx].owner.clone();
        if !owner.as_str().is_empty() && &owner != role {
            return ((TaskOutcomeKind::OwnerMismatch, Some(board.tasks[idx].clone())), false);
        }
        let (ok, missing) = deps_satisfied(board, &board.tasks[idx]);
        if !ok {
            return ((TaskOutcomeKind::DepsBlocked(missing), Some(board.tasks[idx].clone())), false);
        }
        let now = taskbus_core::time_fmt::now_rfc3339(clock);
        let task = &mut board.tasks[idx];
        task.status = TaskStatus::InProgress;
        task.claimed_by = Some(role.clone());
        task.claimed_at = Some(now.clone());
        if let Some(mid) = message_id {
            task.claim_message_id = Some(taskbus_core::MessageId::from_string(mid));
        }
        task.updated_at = now.clone();
        task.push_history(Action::Claimed, role.as_str(), message_id.map(str::to_string), now);
        ((TaskOutcomeKind::Claimed, Some(task.clone())), true)
    })
}

pub fn claim_next_task(
    paths: &SessionPaths,
    cfg: &Config,
    clock: &impl Clock,
    role: &Role,
    message_id: Option<&str>,
) -> Result<(TaskOutcomeKind, Option<Task>), TaskBoardError> {
    with_board_lock(paths, cfg, clock, |board| {
        let order = sorted_indices(board);
        let mut chosen = None;
        let mut reason = TaskOutcomeKind::NoneAvailable;
        for idx in order {
            let task = &board.tasks[idx];
            if task.status != TaskStatus::Pending {
                continue;
            }
            if !task.owner.as_str().is_empty() && &task.owner != role {
                reason = TaskOutcomeKind::OwnerMismatch;
                continue;
            }
            let (ok, missing) = deps_satisfied(board, task);
            if !ok {
                reason = TaskOutcomeKind::DepsBlocked(missing);
                continue;
            }
            chosen = Some(idx);
            break;
        }
        let Some(idx) = chosen else {
            return ((reason, None), false);
        };
        let now = taskbus_core::time_fmt::now_rfc3339(clock);
        let task = &mut board.tasks[idx];
        task.status = TaskStatus::InProgress;
        task.claimed_by = Some(role.clone());
        task.claimed_at = Some(now.clone());
        if let Some(mid) = message_id {
            task.claim_message_id = Some(taskbus_core::MessageId::from_string(mid));
        }
        task.updated_at = now.clone();
        task.push_history(Action::Claimed, role.as_str(), message_id.map(str::to_string), now);
        ((TaskOutcomeKind::Claimed, Some(task.clone())), true)
    })
}

pub fn complete_task(
    paths: &SessionPaths,
    cfg: &Config,
    clock: &impl Clock,
    task_id: &TaskId,
    role: &Role,
    evidence: Option<&str>,
    receipt_file: Option<&str>,
) -> Result<(TaskOutcomeKind, Option<Task>), TaskBoardError> {
    with_board_lock(paths, cfg, clock, |board| {
        let Some(idx) = board.index_of(task_id) else {
            return ((TaskOutcomeKind::NotFound, None), false);
        };
        let task = &board.tasks[idx];
        if task.status == TaskStatus::Completed {
            return ((TaskOutcomeKind::AlreadyCompleted, Some(task.clone())), false);
        }
        if task.status != TaskStatus::InProgress {
            return ((TaskOutcomeKind::NotInProgress, Some(task.clone())), false);
        }
        if let Some(claimed_by) = &task.claimed_by {
            if claimed_by != role {
                return ((TaskOutcomeKind::ClaimedByOther, Some(task.clone())), false);
            }
        }
        let now = taskbus_core::time_fmt::now_rfc3339(clock);
        let task = &mut board.tasks[idx];
        task.status = TaskStatus::Completed;
        task.completed_by = Some(role.clone());
        task.completed_at = Some(now.clone());
        task.updated_at = now.clone();
        if let Some(ev) = evidence {
            if !ev.trim().is_empty() {
                task.evidence.push(ev.to_string());
            }
        }
        if let Some(rf) = receipt_file {
            if !rf.trim().is_empty() {
                task.receipt_file = Some(rf.to_string());
            }
        }
        let note = evidence.filter(|e| !e.trim().is_empty()).or(receipt_file).map(str::to_string);
        task.push_history(Action::Completed, role.as_str(), note, now);
        ((TaskOutcomeKind::Completed, Some(task.clone())), true)
    })
}

pub fn mark_task_failed(
    paths: &SessionPaths,
    cfg: &Config,
    clock: &impl Clock,
    task_id: &TaskId,
    role: &Role,
    error: &str,
    terminal: bool,
) -> Result<(TaskOutcomeKind, Option<Task>), TaskBoardError> {
    with_board_lock(paths, cfg, clock, |board| {
        let Some(idx) = board.index_of(task_id) else {
            return ((TaskOutcomeKind::NotFound, None), false);
        };
        if board.tasks[idx].status == TaskStatus::Completed {
            return ((TaskOutcomeKind::Completed, Some(board.tasks[idx].clone())), false);
        }
        let now = taskbus_core::time_fmt::now_rfc3339(clock);
        let task = &mut board.tasks[idx];
        let action = if terminal {
            task.status = TaskStatus::Failed;
            Action::Failed
        } else {
            Action::RetryError
        };
        task.last_error = Some(error.to_string());
        task.last_error_by = Some(role.clone());
        task.last_error_at = Some(now.clone());
        task.updated_at = now.clone();
        let note = (!error.trim().is_empty()).then(|| error.to_string());
        task.push_history(action, role.as_str(), note, now);
        ((TaskOutcomeKind::Updated, Some(task.clone())), true)
    })
}

pub fn list_tasks(paths: &SessionPaths, clock: &impl Clock) -> Vec<Task> {
    let now = taskbus_core::time_fmt::now_rfc3339(clock);
    let board = read_board(&paths.tasks_file(), &now);
    let order = sorted_indices(&board);
    order.into_iter().map(|i| board.tasks[i].clone()).collect()
}

pub fn get_task(paths: &SessionPaths, clock: &impl Clock, task_id: &TaskId) -> Option<Task> {
    list_tasks(paths, clock).into_iter().find(|t| &t.id == task_id)
}

pub fn list_dispatchable_tasks(
    paths: &SessionPaths,
    clock: &impl Clock,
    owner: Option<&Role>,
) -> Vec<Task> {
    let now = taskbus_core::time_fmt::now_rfc3339(clock);
    let board = read_board(&paths.tasks_file(), &now);
    let order = sorted_indices(&board);
    let mut out = Vec::new();
    for idx in order {
        let task = &board.tasks[idx];
        if task.status != TaskStatus::Pending {
            continue;
        }
        if task.owner.as_str().is_empty() {
            continue;
        }
        if let Some(owner) = owner {
            if &task.owner != owner {
                continue;
            }
        }
        if task.dispatch.as_ref().map(|d| !d.message_id.as_str().is_empty()).unwrap_or(false) {
            continue;
        }
        let (ok, _) = deps_satisfied(&board, task);
        if !ok {
            continue;
        }
        out.push(task.clone());
    }
    out
}

#[cfg(test)]
#[path = "task_board_tests.rs"]
mod tests;

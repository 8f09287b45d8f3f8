// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Worker Loop (spec §4.4 C5): selection, invocation, retry,
//! completion, and dispatch, for one role.
//!
//! `process_next` handles exactly one inbox message per call, mirroring
//! `autopilot.py::process_one`; the caller (`run_forever` in this module,
//! or the `taskbus worker` CLI subcommand) loops over it.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use taskbus_core::{Clock, Intent, Message, Role, Task, TaskId, TaskOutcomeKind};
use taskbus_storage::{
    archive_message, claim_task, complete_task, deadletter_message, done_sentinel_exists,
    mark_task_failed, read_retry_count, write_done_sentinel, write_receipt, write_retry_count,
    Config, RoleBoundaryMode, SessionPaths,
};
use taskbus_adapters::{
    assemble_prompt, boundary, role_memory, ExternalTool, ToolInvocation,
};

use crate::dispatch::dispatch_ready_tasks;
use crate::error::WorkerError;

const MAX_RETRIES: u32 = 3;
const BOUNDARY_VIOLATION_RC: i32 = 97;
const MAX_RETRIES_RC: i32 = 99;

/// Everything one worker invocation needs, generic over the clock (so
/// tests can pin time with a `FakeClock`) and the external tool (so
/// tests can substitute `taskbus_adapters::FakeTool`).
pub struct WorkerContext<C: Clock, T: ExternalTool> {
    pub paths: SessionPaths,
    pub cfg: Config,
    pub clock: C,
    pub tool: Arc<T>,
    pub role: Role,
    pub role_cwd: PathBuf,
    pub dry_run: bool,
}

/// What `process_next` did with the selected message, for callers and
/// tests that need to branch on the result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// No candidate message was available (inbox empty, or every entry
    /// is locked by a live worker).
    NoWork,
    /// A `lead`/`bootstrap` message created the initial task set.
    Bootstrapped(Vec<TaskId>),
    /// A message that was already fully handled (done sentinel, or its
    /// bound task already terminal) was archived without re-invoking.
    AlreadyDone,
    /// The external tool ran successfully; message archived, task
    /// completed if one was claimed.
    Completed,
    /// The external tool failed; under the retry budget, message stays
    /// in the inbox for a future scan.
    Retried { attempt: u32 },
    /// The external tool failed again after three prior retries; message
    /// moved to the deadletter directory.
    Deadlettered,
    /// A role-boundary violation was detected under `enforce` mode;
    /// message deadlettered immediately, task failed terminally.
    BoundaryViolation { paths: Vec<String> },
}

fn lock_stale_root(paths: &SessionPaths) -> PathBuf {
    paths.processing_stale_dir()
}

/// Select the next processable inbox message: skip entries whose
/// `(message_id, role)` pair already has a done sentinel (crash
/// recovery: archive and move on), and entries currently locked by a
/// live worker. Returns the message id and a held lock guard, or `None`
/// if nothing is currently processable.
fn select_next(
    paths: &SessionPaths,
    cfg: &Config,
    role: &Role,
) -> Result<Option<(PathBuf, String, taskbus_storage::DirLockGuard)>, WorkerError> {
    let entries = taskbus_storage::list_inbox(paths, role)?;
    for entry in entries {
        let Some(mid) = entry.file_stem().and_then(|s| s.to_str()).map(str::to_string) else {
            continue;
        };
        if done_sentinel_exists(paths, &mid, role) {
            let _ = archive_message(paths, role, &mid, &entry);
            continue;
        }
        match taskbus_storage::acquire_lock(
            paths.processing_lockdir(&mid, role),
            lock_stale_root(paths),
            Duration::ZERO,
            cfg.lock_stale_after,
        ) {
            Ok(guard) => return Ok(Some((entry, mid, guard))),
            // Timeout (owned by a live worker) and Io (transient) both
            // mean "try the next candidate", not "fail the scan".
            Err(_) => continue,
        }
    }
    Ok(None)
}

fn build_task_context(task: Option<&Task>) -> String {
    let Some(task) = task else {
        return String::new();
    };
    let mut out = format!("Task {}: {}\n", task.id.as_str(), task.title);
    if !task.acceptance.is_empty() {
        out.push_str("Acceptance:\n");
        for item in &task.acceptance {
            out.push_str(&format!("- {item}\n"));
        }
    }
    out
}

fn enforces_boundary(cfg: &Config, role: &Role) -> bool {
    cfg.role_boundary_mode != RoleBoundaryMode::Off && !role.as_str().starts_with("builder") && !role.is_lead()
}

/// Handle exactly one inbox message for `ctx.role`. Returns
/// [`ProcessOutcome::NoWork`] if nothing is currently processable.
pub async fn process_next<C: Clock, T: ExternalTool>(
    ctx: &WorkerContext<C, T>,
) -> Result<ProcessOutcome, WorkerError> {
    let Some((inbox_path, mid, _guard)) = select_next(&ctx.paths, &ctx.cfg, &ctx.role)? else {
        return Ok(ProcessOutcome::NoWork);
    };

    let message = taskbus_storage::read_message(&inbox_path)?;

    if ctx.role.is_lead() && message.intent == Intent::Bootstrap {
        let created = crate::bootstrap::maybe_bootstrap(&ctx.paths, &ctx.cfg, &ctx.clock, &message)?;
        write_done_sentinel(&ctx.paths, &mid, &ctx.role)?;
        archive_message(&ctx.paths, &ctx.role, &mid, &inbox_path)?;
        dispatch_ready_tasks(&ctx.paths, &ctx.cfg, &ctx.clock, &ctx.role, None)?;
        return Ok(ProcessOutcome::Bootstrapped(created.iter().map(|t| t.id).collect()));
    }

    let claimed_task = match &message.task_id {
        Some(task_id) => {
            let (outcome, task) =
                claim_task(&ctx.paths, &ctx.cfg, &ctx.clock, task_id, &ctx.role, Some(mid.as_str()))?;
            match outcome {
                TaskOutcomeKind::Claimed | TaskOutcomeKind::AlreadyClaimed => task,
                TaskOutcomeKind::Completed | TaskOutcomeKind::AlreadyCompleted | TaskOutcomeKind::Failed => {
                    write_done_sentinel(&ctx.paths, &mid, &ctx.role)?;
                    archive_message(&ctx.paths, &ctx.role, &mid, &inbox_path)?;
                    return Ok(ProcessOutcome::AlreadyDone);
                }
                TaskOutcomeKind::ClaimedByOther
                | TaskOutcomeKind::OwnerMismatch
                | TaskOutcomeKind::DepsBlocked(_)
                | TaskOutcomeKind::NotFound => None,
                _ => None,
            }
        }
        None => None,
    };

    let role_prompt = std::fs::read_to_string(ctx.paths.role_prompt(&ctx.role)).unwrap_or_default();
    let memory_path = ctx.paths.role_memory(&ctx.role);
    let memory_text = std::fs::read_to_string(&memory_path).unwrap_or_default();
    let memory_tail = role_memory::tail(&memory_text, role_memory::trim_bound(ctx.cfg.role_memory_prompt_lines));
    let task_context = build_task_context(claimed_task.as_ref());
    let prompt = assemble_prompt(&role_prompt, &memory_tail, &task_context, &message.body);

    let before = if enforces_boundary(&ctx.cfg, &ctx.role) {
        boundary::snapshot(&ctx.role_cwd).ok()
    } else {
        None
    };

    let outcome = if ctx.dry_run {
        taskbus_adapters::ToolOutcome { rc: 0, last_message: "(dry-run)".to_string() }
    } else {
        let invocation = ToolInvocation {
            bin: ctx.cfg.codegen_bin.clone(),
            model: ctx.cfg.model.clone().unwrap_or_else(|| taskbus_adapters::tool::DEFAULT_MODEL.to_string()),
            session_root: ctx.paths.root().to_path_buf(),
            role_cwd: ctx.role_cwd.clone(),
            prompt,
        };
        ctx.tool.invoke(&invocation).await?
    };

    if let Some(before) = before {
        if let Ok(after) = boundary::snapshot(&ctx.role_cwd) {
            let violations = boundary::boundary_violations(&before, &after);
            if !violations.is_empty() {
                if ctx.cfg.role_boundary_mode == RoleBoundaryMode::Warn {
                    tracing::warn!(role = %ctx.role, ?violations, "role boundary violation (warn mode)");
                } else {
                    return fail_boundary(ctx, &mid, &inbox_path, &message, claimed_task.as_ref(), violations);
                }
            }
        }
    }

    if outcome.rc == 0 {
        complete_success(ctx, &mid, &inbox_path, &message, claimed_task.as_ref(), &outcome.last_message, &memory_text)
    } else {
        fail_retry(ctx, &mid, &inbox_path, &message, claimed_task.as_ref(), outcome.rc)
    }
}

fn fail_boundary<C: Clock, T: ExternalTool>(
    ctx: &WorkerContext<C, T>,
    mid: &str,
    inbox_path: &std::path::Path,
    message: &Message,
    task: Option<&Task>,
    violations: Vec<String>,
) -> Result<ProcessOutcome, WorkerError> {
    let error = format!("role boundary violation: {}", violations.join(", "));
    if let Some(task) = task {
        mark_task_failed(&ctx.paths, &ctx.cfg, &ctx.clock, &task.id, &ctx.role, &error, true)?;
    }
    write_terminal_receipt(ctx, mid, message, taskbus_core::ReceiptStatus::Deadletter, BOUNDARY_VIOLATION_RC, &error)?;
    deadletter_message(&ctx.paths, &ctx.role, mid, inbox_path)?;
    Ok(ProcessOutcome::BoundaryViolation { paths: violations })
}

fn complete_success<C: Clock, T: ExternalTool>(
    ctx: &WorkerContext<C, T>,
    mid: &str,
    inbox_path: &std::path::Path,
    message: &Message,
    task: Option<&Task>,
    last_message: &str,
    memory_text: &str,
) -> Result<ProcessOutcome, WorkerError> {
    let receipt_file = format!("{mid}.{}.md", ctx.role);
    if let Some(task) = task {
        complete_task(&ctx.paths, &ctx.cfg, &ctx.clock, &task.id, &ctx.role, Some(last_message), Some(&receipt_file))?;
    }
    write_terminal_receipt(ctx, mid, message, taskbus_core::ReceiptStatus::Done, 0, last_message)?;
    write_done_sentinel(&ctx.paths, mid, &ctx.role)?;
    archive_message(&ctx.paths, &ctx.role, mid, inbox_path)?;
    let _ = std::fs::remove_file(ctx.paths.processing_retries(mid, &ctx.role));

    let record = format!("[{}] {}: {}", taskbus_core::time_fmt::now_rfc3339(&ctx.clock), ctx.role, last_message);
    let updated = role_memory::append_record(memory_text, &record, ctx.cfg.role_memory_max_bytes);
    let _ = taskbus_storage::atomic_write(&ctx.paths.role_memory(&ctx.role), &updated);

    if ctx.role.is_lead() {
        dispatch_ready_tasks(&ctx.paths, &ctx.cfg, &ctx.clock, &ctx.role, None)?;
    }
    Ok(ProcessOutcome::Completed)
}

fn fail_retry<C: Clock, T: ExternalTool>(
    ctx: &WorkerContext<C, T>,
    mid: &str,
    inbox_path: &std::path::Path,
    message: &Message,
    task: Option<&Task>,
    rc: i32,
) -> Result<ProcessOutcome, WorkerError> {
    let retry_count = read_retry_count(&ctx.paths, mid, &ctx.role);
    let error = format!("external tool exited with status {rc}");

    if retry_count >= MAX_RETRIES {
        if let Some(task) = task {
            mark_task_failed(&ctx.paths, &ctx.cfg, &ctx.clock, &task.id, &ctx.role, "Exceeded max retries.", true)?;
        }
        write_terminal_receipt(ctx, mid, message, taskbus_core::ReceiptStatus::Deadletter, MAX_RETRIES_RC, "Exceeded max retries.")?;
        deadletter_message(&ctx.paths, &ctx.role, mid, inbox_path)?;
        let _ = std::fs::remove_file(ctx.paths.processing_retries(mid, &ctx.role));
        Ok(ProcessOutcome::Deadlettered)
    } else {
        let attempt = retry_count + 1;
        write_retry_count(&ctx.paths, mid, &ctx.role, attempt)?;
        if let Some(task) = task {
            mark_task_failed(&ctx.paths, &ctx.cfg, &ctx.clock, &task.id, &ctx.role, &error, false)?;
        }
        write_terminal_receipt(ctx, mid, message, taskbus_core::ReceiptStatus::Retry, rc, &error)?;
        Ok(ProcessOutcome::Retried { attempt })
    }
}

fn write_terminal_receipt<C: Clock, T: ExternalTool>(
    ctx: &WorkerContext<C, T>,
    mid: &str,
    message: &Message,
    status: taskbus_core::ReceiptStatus,
    codex_rc: i32,
    body: &str,
) -> Result<(), WorkerError> {
    let receipt = taskbus_core::Receipt {
        id: taskbus_core::MessageId::from_string(mid),
        role: ctx.role.clone(),
        thread: message.thread.clone(),
        request_from: message.from.clone(),
        request_to: message.to.clone(),
        request_intent: message.intent.clone(),
        task_id: message.task_id,
        status,
        codex_rc,
        finished_at: taskbus_core::time_fmt::now_rfc3339(&ctx.clock),
        body: body.to_string(),
    };
    write_receipt(&ctx.paths, &receipt)?;
    Ok(())
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;

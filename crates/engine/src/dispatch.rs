// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dispatch-of-ready-tasks (spec §4.4): for every pending, owned,
//! dependency-satisfied, not-yet-dispatched task, enqueue a message to
//! its owner and bind the dispatch via `set_dispatch`.

use taskbus_core::{Clock, Message, MessageId, Role, TaskOutcomeKind};
use taskbus_storage::{enqueue_message, list_dispatchable_tasks, set_dispatch, Config, SessionPaths};

use crate::error::WorkerError;

/// Dispatch up to `cfg.dispatch_max_per_scan` ready tasks owned by
/// `owner` (or any owner if `None`), sent from `from`. Returns the
/// number of tasks actually dispatched.
pub fn dispatch_ready_tasks(
    paths: &SessionPaths,
    cfg: &Config,
    clock: &impl Clock,
    from: &Role,
    owner: Option<&Role>,
) -> Result<usize, WorkerError> {
    let candidates = list_dispatchable_tasks(paths, clock, owner);
    let mut dispatched = 0;

    for task in candidates.into_iter().take(cfg.dispatch_max_per_scan) {
        let message = Message {
            id: MessageId::new(),
            from: from.clone(),
            to: task.owner.clone(),
            intent: task.intent.clone(),
            thread: "main".to_string(),
            risk: task.risk,
            task_id: Some(task.id),
            acceptance: task.acceptance.clone(),
            body: task.title.clone(),
        };
        let inbox_path = enqueue_message(paths, &message)?;

        let (outcome, _) =
            set_dispatch(paths, cfg, clock, &task.id, from, &task.owner, task.intent.clone(), message.id.as_str())?;

        match outcome {
            TaskOutcomeKind::Ok => dispatched += 1,
            TaskOutcomeKind::AlreadyDispatched | TaskOutcomeKind::AlreadyDispatchedSame => {
                let _ = std::fs::remove_file(&inbox_path);
            }
            _ => {
                let _ = std::fs::remove_file(&inbox_path);
            }
        }
    }

    Ok(dispatched)
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;

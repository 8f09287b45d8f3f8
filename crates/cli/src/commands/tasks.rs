// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `taskbus tasks init|list|add|show|dispatchable|claim|complete|fail|dispatch`
//! (spec §6, §4.3): a thin, session-scoped front end over
//! `taskbus_storage::task_board`, for operator inspection and for
//! scripting a session without a running worker.

use std::str::FromStr;

use taskbus_core::{Intent, Risk, Role, SystemClock, Task, TaskId, TaskOutcomeKind};
use taskbus_storage::{
    add_task, claim_task, complete_task, ensure_task_board, get_task, list_dispatchable_tasks,
    list_tasks, mark_task_failed, set_dispatch, Config,
};

use crate::cli::TasksCommand;
use crate::exit_error::ExitError;
use crate::session::resolve_session;

fn print_task(task: &Task) {
    println!("{}", serde_json::to_string_pretty(task).unwrap_or_else(|_| task.format_brief()));
}

fn print_tasks(tasks: &[Task]) {
    println!("{}", serde_json::to_string_pretty(tasks).unwrap_or_default());
}

pub async fn run(command: TasksCommand) -> Result<(), ExitError> {
    let clock = SystemClock;

    match command {
        TasksCommand::Init { session } => {
            let paths = resolve_session(&session)?;
            ensure_task_board(&paths, &clock).map_err(|source| ExitError::new(2, format!("could not initialize task board: {source}")))?;
            Ok(())
        }

        TasksCommand::List { session } => {
            let paths = resolve_session(&session)?;
            print_tasks(&list_tasks(&paths, &clock));
            Ok(())
        }

        TasksCommand::Add { session, title, owner, work_type, risk, acceptance, depends_on, intent, created_by } => {
            let paths = resolve_session(&session)?;
            let cfg = Config::from_env();
            let owner_role = owner.map(Role::new);
            let risk = Risk::from_str(&risk).map_err(|source| ExitError::new(2, source.to_string()))?;
            let depends_on: Vec<TaskId> = depends_on.iter().map(TaskId::from_string).collect();
            let intent = Intent::from_str(&intent).unwrap_or(Intent::Other(intent));
            let task = add_task(
                &paths, &cfg, &clock, &title, owner_role.as_ref(), &work_type, risk, acceptance, depends_on,
                intent, &created_by, None,
            )
            .map_err(|source| ExitError::new(2, format!("could not add task: {source}")))?;
            print_task(&task);
            Ok(())
        }

        TasksCommand::Show { session, task_id } => {
            let paths = resolve_session(&session)?;
            let task_id = TaskId::from_string(task_id);
            match get_task(&paths, &clock, &task_id) {
                Some(task) => {
                    print_task(&task);
                    Ok(())
                }
                None => Err(ExitError::new(3, format!("task {} not found", task_id.as_str()))),
            }
        }

        TasksCommand::Dispatchable { session, owner } => {
            let paths = resolve_session(&session)?;
            let owner = owner.map(Role::new);
            print_tasks(&list_dispatchable_tasks(&paths, &clock, owner.as_ref()));
            Ok(())
        }

        TasksCommand::Claim { session, task_id, role, message_id } => {
            let paths = resolve_session(&session)?;
            let cfg = Config::from_env();
            let task_id = TaskId::from_string(task_id);
            let role = Role::new(role);
            let (outcome, task) = claim_task(&paths, &cfg, &clock, &task_id, &role, message_id.as_deref())
                .map_err(|source| ExitError::new(4, format!("claim failed: {source}")))?;
            match outcome {
                TaskOutcomeKind::Claimed | TaskOutcomeKind::AlreadyClaimed => {
                    if let Some(t) = &task {
                        print_task(t);
                    }
                    Ok(())
                }
                TaskOutcomeKind::NotFound => Err(ExitError::new(3, format!("task {} not found", task_id.as_str()))),
                other => Err(ExitError::new(4, format!("claim failed: {other}"))),
            }
        }

        TasksCommand::Complete { session, task_id, role, evidence, receipt_file } => {
            let paths = resolve_session(&session)?;
            let cfg = Config::from_env();
            let task_id = TaskId::from_string(task_id);
            let role = Role::new(role);
            let (outcome, task) = complete_task(&paths, &cfg, &clock, &task_id, &role, evidence.as_deref(), receipt_file.as_deref())
                .map_err(|source| ExitError::new(5, format!("complete failed: {source}")))?;
            match outcome {
                TaskOutcomeKind::Completed | TaskOutcomeKind::AlreadyCompleted => {
                    if let Some(t) = &task {
                        print_task(t);
                    }
                    Ok(())
                }
                TaskOutcomeKind::NotFound => Err(ExitError::new(3, format!("task {} not found", task_id.as_str()))),
                other => Err(ExitError::new(5, format!("complete failed: {other}"))),
            }
        }

        TasksCommand::Fail { session, task_id, role, error, terminal } => {
            let paths = resolve_session(&session)?;
            let cfg = Config::from_env();
            let task_id = TaskId::from_string(task_id);
            let role = Role::new(role);
            let (outcome, task) = mark_task_failed(&paths, &cfg, &clock, &task_id, &role, &error, terminal)
                .map_err(|source| ExitError::new(6, format!("fail update failed: {source}")))?;
            match outcome {
                TaskOutcomeKind::Updated => {
                    if let Some(t) = &task {
                        print_task(t);
                    }
                    Ok(())
                }
                TaskOutcomeKind::NotFound => Err(ExitError::new(3, format!("task {} not found", task_id.as_str()))),
                other => Err(ExitError::new(6, format!("fail update failed: {other}"))),
            }
        }

        TasksCommand::Dispatch { session, task_id, from, to, intent, message_id } => {
            let paths = resolve_session(&session)?;
            let cfg = Config::from_env();
            let task_id = TaskId::from_string(task_id);
            let from = Role::new(from);
            let to = Role::new(to);
            let intent = Intent::from_str(&intent).unwrap_or(Intent::Other(intent));
            let (outcome, task) = set_dispatch(&paths, &cfg, &clock, &task_id, &from, &to, intent, &message_id)
                .map_err(|source| ExitError::new(7, format!("dispatch update failed: {source}")))?;
            match outcome {
                TaskOutcomeKind::Ok | TaskOutcomeKind::AlreadyDispatchedSame => {
                    if let Some(t) = &task {
                        print_task(t);
                    }
                    Ok(())
                }
                TaskOutcomeKind::NotFound => Err(ExitError::new(3, format!("task {} not found", task_id.as_str()))),
                other => Err(ExitError::new(7, format!("dispatch update failed: {other}"))),
            }
        }
    }
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `taskbus worker daemon|once` (spec §6, §4.4).

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use taskbus_adapters::{parse_role_worktrees, ProcessTool};
use taskbus_core::{Role, SystemClock};
use taskbus_engine::{process_next, run_forever, ProcessOutcome, WorkerContext};
use taskbus_storage::{Config, SessionPaths};

use crate::cli::WorkerCommand;
use crate::exit_error::ExitError;
use crate::session::{resolve_role, resolve_session};

/// `roles/<role>/` if the session has no `SESSION.md` worktree section
/// (or the role isn't listed there), per `taskbus_adapters::worktree`'s
/// documented fallback contract.
fn resolve_role_cwd(paths: &SessionPaths, role: &Role) -> PathBuf {
    let session_md = std::fs::read_to_string(paths.session_md()).unwrap_or_default();
    parse_role_worktrees(&session_md)
        .ok()
        .and_then(|map| map.get(role).cloned())
        .unwrap_or_else(|| paths.root().join("roles").join(role.as_str()))
}

fn build_context(paths: SessionPaths, role: Role, dry_run: bool, model: Option<String>) -> WorkerContext<SystemClock, ProcessTool> {
    let mut cfg = Config::from_env();
    if model.is_some() {
        cfg.model = model;
    }
    let role_cwd = resolve_role_cwd(&paths, &role);
    WorkerContext { paths, cfg, clock: SystemClock, tool: Arc::new(ProcessTool::new()), role, role_cwd, dry_run }
}

pub async fn run(command: WorkerCommand) -> Result<(), ExitError> {
    match command {
        WorkerCommand::Daemon { session, role, poll, dry_run, model } => {
            let paths = resolve_session(&session)?;
            let role = resolve_role(&paths, &role)?;
            let ctx = build_context(paths, role, dry_run, model);
            run_forever(ctx, Duration::from_secs(poll), crate::commands::shutdown_signal())
                .await
                .map_err(|source| ExitError::new(1, format!("worker loop failed: {source}")))?;
            Err(ExitError::new(crate::commands::INTERRUPTED, "worker interrupted"))
        }
        WorkerCommand::Once { session, role, dry_run, model } => {
            let paths = resolve_session(&session)?;
            let role = resolve_role(&paths, &role)?;
            let ctx = build_context(paths, role, dry_run, model);
            let outcome = process_next(&ctx).await.map_err(|source| ExitError::new(1, format!("worker step failed: {source}")))?;
            match outcome {
                ProcessOutcome::NoWork => Err(ExitError::new(3, "nothing to do")),
                other => {
                    println!("{other:?}");
                    Ok(())
                }
            }
        }
    }
}

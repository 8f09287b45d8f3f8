// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The worker daemon loop: drain the inbox, dispatch ready tasks, then
//! sleep until woken by a filesystem event, a poll timeout, or (for
//! `lead`) the periodic dispatch-scan timer (spec §4.4).

use std::sync::Arc;
use std::time::Duration;

use taskbus_adapters::ExternalTool;
use taskbus_core::Clock;
use tokio::sync::Notify;

use crate::dispatch::dispatch_ready_tasks;
use crate::error::WorkerError;
use crate::worker::{process_next, ProcessOutcome, WorkerContext};

/// Watch `dir` for filesystem events on a dedicated thread, signaling
/// the returned [`Notify`] on every event. If the watch cannot be
/// established (unsupported filesystem, permissions), the thread exits
/// quietly and the caller falls back to its poll timeout alone.
fn watch_inbox(dir: std::path::PathBuf) -> Arc<Notify> {
    let notify = Arc::new(Notify::new());
    let signal = notify.clone();
    std::thread::spawn(move || {
        use notify::{RecursiveMode, Watcher};
        let (tx, rx) = std::sync::mpsc::channel();
        let mut watcher = match notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            let _ = tx.send(res);
        }) {
            Ok(w) => w,
            Err(_) => return,
        };
        if watcher.watch(&dir, RecursiveMode::NonRecursive).is_err() {
            return;
        }
        for _event in rx {
            signal.notify_one();
        }
    });
    notify
}

/// Drive the worker loop until `shutdown` resolves.
///
/// Each iteration drains every currently processable inbox message (via
/// repeated [`process_next`] calls until it reports
/// [`ProcessOutcome::NoWork`]), then attempts a dispatch-of-ready-tasks
/// scan — `lead` scans the whole board, other roles scan only their own
/// tasks as a self-dispatch failover for when `lead` is unavailable —
/// before waiting for the next wake-up signal.
pub async fn run_forever<C, T, F>(
    ctx: WorkerContext<C, T>,
    poll_interval: Duration,
    shutdown: F,
) -> Result<(), WorkerError>
where
    C: Clock,
    T: ExternalTool,
    F: std::future::Future<Output = ()>,
{
    tokio::pin!(shutdown);
    let woken = watch_inbox(ctx.paths.inbox_dir(&ctx.role));
    let mut dispatch_ticker = tokio::time::interval(ctx.cfg.dispatch_scan_interval);
    dispatch_ticker.tick().await; // first tick fires immediately; consume it

    loop {
        while process_next(&ctx).await? != ProcessOutcome::NoWork {}

        if ctx.role.is_lead() {
            dispatch_ready_tasks(&ctx.paths, &ctx.cfg, &ctx.clock, &ctx.role, None)?;
        } else {
            dispatch_ready_tasks(&ctx.paths, &ctx.cfg, &ctx.clock, &ctx.role, Some(&ctx.role))?;
        }

        tokio::select! {
            _ = &mut shutdown => return Ok(()),
            _ = woken.notified() => {}
            _ = tokio::time::sleep(poll_interval) => {}
            _ = dispatch_ticker.tick(), if ctx.role.is_lead() => {}
        }
    }
}

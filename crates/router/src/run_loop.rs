// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The router daemon loop: drain the outbox, then sleep until woken by
//! a filesystem event or a poll timeout (spec §4.5).

use std::sync::Arc;
use std::time::Duration;

use taskbus_core::Clock;
use taskbus_storage::SessionPaths;
use tokio::sync::Notify;

use crate::diagnostics::DiagnosticRing;
use crate::error::RouterError;
use crate::lockwatch::{confirm_global_lock_pid_broken, quarantine_global_lock};
use crate::router::scan_outbox;

fn watch_outbox(dir: std::path::PathBuf) -> Arc<Notify> {
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

/// Drive the router loop until `shutdown` resolves. Before each scan,
/// checks the global lock's pid file (if the lock directory exists) and
/// quarantines it when broken, per the errno-22 paragraph (spec §4.5) —
/// this guards the path proactively rather than waiting for a worker to
/// hit the syscall failure first.
pub async fn run_forever<C, F>(
    paths: SessionPaths,
    clock: C,
    poll_interval: Duration,
    shutdown: F,
) -> Result<(), RouterError>
where
    C: Clock,
    F: std::future::Future<Output = ()>,
{
    tokio::pin!(shutdown);
    let woken = watch_outbox(paths.outbox_dir());
    let mut ring = DiagnosticRing::new();

    loop {
        let pid_path = paths.global_lockdir().join("pid");
        if pid_path.exists() {
            ring.push(format!("checked global lock pid file at {}", pid_path.display()));
            if confirm_global_lock_pid_broken(&pid_path) {
                tracing::warn!(path = %pid_path.display(), "global lock pid file is broken; quarantining");
                quarantine_global_lock(&paths, &clock, &ring)?;
            }
        }

        for outcome in scan_outbox(&paths)? {
            ring.push(format!("{outcome:?}"));
        }

        tokio::select! {
            _ = &mut shutdown => return Ok(()),
            _ = woken.notified() => {}
            _ = tokio::time::sleep(poll_interval) => {}
        }
    }
}

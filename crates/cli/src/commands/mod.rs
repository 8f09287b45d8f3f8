// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI command implementations.

pub mod router;
pub mod supervisor;
pub mod tasks;
pub mod worker;

/// Resolves once either SIGINT or SIGTERM arrives; used as the shutdown
/// future for every long-running daemon subcommand (spec §7's `Signal`
/// error kind: "log exit context and return `128+signum`").
pub async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(_) => std::future::pending().await,
    };
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = sigterm.recv() => {}
    }
}

/// Exit code for a process terminated by a signal (spec §7).
pub const INTERRUPTED: i32 = 130;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Worker Loop's error seam (spec §4.4, §6).

#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    #[error("task board: {0}")]
    TaskBoard(#[from] taskbus_storage::TaskBoardError),
    #[error("bus: {0}")]
    Bus(#[from] taskbus_storage::BusError),
    #[error("lock: {0}")]
    Lock(#[from] taskbus_core::LockError),
    #[error("external tool: {0}")]
    Tool(#[from] taskbus_adapters::ToolError),
    #[error("io error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("role {0:?} has no worktree entry in SESSION.md")]
    MissingWorktree(String),
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;

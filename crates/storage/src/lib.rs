// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Filesystem-backed storage primitives: session layout, the directory
//! lock, runtime configuration, the task board, and the message bus
//! (spec §2 C1/C2/C4, §4.1-§4.3, §4.5).

pub mod bus;
pub mod config;
pub mod fsutil;
pub mod lock;
pub mod session;
pub mod task_board;

pub use bus::{
    archive_message, deadletter_message, done_sentinel_exists, enqueue_message, list_inbox,
    list_outbox, quarantine_bad_receipt, read_message, read_receipt, read_retry_count,
    router_receipt_processed, sha256_text, write_done_sentinel, write_receipt,
    write_retry_count, write_router_processed, BusError,
};
pub use config::{Config, InvalidRoleBoundaryMode, RoleBoundaryMode};
pub use fsutil::atomic_write;
pub use lock::{acquire as acquire_lock, DirLockGuard};
pub use session::SessionPaths;
pub use task_board::{
    add_task, claim_next_task, claim_task, complete_task, ensure_task_board, get_task,
    list_dispatchable_tasks, list_tasks, mark_task_failed, set_dispatch, Board, TaskBoardError,
};

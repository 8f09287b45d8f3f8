// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Worker Loop (spec §4.4 C5): one role's selection, invocation,
//! retry, completion, bootstrap, and dispatch logic.
//!
//! `taskbus-engine` is the only crate that sequences `taskbus-storage`'s
//! task-board/bus primitives with `taskbus-adapters`' tool invocation —
//! neither of those crates knows about the other.

pub mod bootstrap;
pub mod dispatch;
pub mod error;
pub mod run_loop;
pub mod worker;

pub use bootstrap::maybe_bootstrap;
pub use dispatch::dispatch_ready_tasks;
pub use error::WorkerError;
pub use run_loop::run_forever;
pub use worker::{process_next, ProcessOutcome, WorkerContext};

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Supervisor (spec §2 C7, §4.6): spawns and restarts the Router and
//! Worker children for a session, forwards graceful shutdown, and keeps
//! `artifacts/autopilot/pids.txt` current.

pub mod child;
pub mod diagnostics;
pub mod error;
pub mod pidfile;
pub mod supervisor;

pub use child::{spawn_child, ManagedChild};
pub use diagnostics::capture_ps_snapshot;
pub use error::DaemonError;
pub use pidfile::write_pids;
pub use supervisor::{Supervisor, SupervisorOptions};
